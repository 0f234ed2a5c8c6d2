use super::TeleportRecord;
use crate::core::{EntityId, Result};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Live request state shared by every concurrent invocation.
///
/// Holds the in-flight set, the latest record per entity and the archived
/// prior record used for cooldown comparisons. Every operation is atomic
/// on its own; no broader transaction scope exists.
pub trait TeleportStateStore: Send + Sync {
    /// Returns true when the identity was not already in flight.
    fn insert_in_flight(&self, id: EntityId) -> Result<bool>;

    fn remove_in_flight(&self, id: EntityId) -> Result<bool>;

    fn is_in_flight(&self, id: EntityId) -> Result<bool>;

    /// Snapshot of the latest record.
    fn latest(&self, id: EntityId) -> Result<Option<TeleportRecord>>;

    fn prior(&self, id: EntityId) -> Result<Option<TeleportRecord>>;

    /// Stores `record` as the prior record of `id`.
    fn archive(&self, id: EntityId, record: TeleportRecord) -> Result<()>;

    /// Installs `record` as the latest record unless a live one exists.
    ///
    /// Returns false, leaving state untouched, when `id` already has a
    /// non-completed record.
    fn try_begin(&self, id: EntityId, record: TeleportRecord) -> Result<bool>;

    /// Mutates the latest record in place. Returns false when there is none.
    fn update(&self, id: EntityId, f: &mut dyn FnMut(&mut TeleportRecord)) -> Result<bool>;

    fn remove_latest(&self, id: EntityId) -> Result<Option<TeleportRecord>>;

    /// Marks the latest record completed.
    fn complete(&self, id: EntityId) -> Result<bool> {
        self.update(id, &mut |record| record.completed = true)
    }
}

#[derive(Default)]
pub struct InMemoryStateStore {
    in_flight: RwLock<HashSet<EntityId>>,
    latest: RwLock<HashMap<EntityId, TeleportRecord>>,
    prior: RwLock<HashMap<EntityId, TeleportRecord>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight_count(&self) -> Result<usize> {
        Ok(self.in_flight.read()?.len())
    }

    /// Number of records still awaiting completion.
    pub fn live_count(&self) -> Result<usize> {
        Ok(self.latest.read()?.values().filter(|r| r.is_live()).count())
    }
}

impl TeleportStateStore for InMemoryStateStore {
    fn insert_in_flight(&self, id: EntityId) -> Result<bool> {
        Ok(self.in_flight.write()?.insert(id))
    }

    fn remove_in_flight(&self, id: EntityId) -> Result<bool> {
        Ok(self.in_flight.write()?.remove(&id))
    }

    fn is_in_flight(&self, id: EntityId) -> Result<bool> {
        Ok(self.in_flight.read()?.contains(&id))
    }

    fn latest(&self, id: EntityId) -> Result<Option<TeleportRecord>> {
        Ok(self.latest.read()?.get(&id).cloned())
    }

    fn prior(&self, id: EntityId) -> Result<Option<TeleportRecord>> {
        Ok(self.prior.read()?.get(&id).cloned())
    }

    fn archive(&self, id: EntityId, record: TeleportRecord) -> Result<()> {
        self.prior.write()?.insert(id, record);
        Ok(())
    }

    fn try_begin(&self, id: EntityId, record: TeleportRecord) -> Result<bool> {
        let mut latest = self.latest.write()?;
        if latest.get(&id).is_some_and(TeleportRecord::is_live) {
            return Ok(false);
        }
        latest.insert(id, record);
        Ok(true)
    }

    fn update(&self, id: EntityId, f: &mut dyn FnMut(&mut TeleportRecord)) -> Result<bool> {
        let mut latest = self.latest.write()?;
        match latest.get_mut(&id) {
            Some(record) => {
                f(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_latest(&self, id: EntityId) -> Result<Option<TeleportRecord>> {
        Ok(self.latest.write()?.remove(&id))
    }
}

/// Keeps an identity in the in-flight set for the guard's lifetime.
///
/// Removal happens exactly once, on drop, whichever way the holder exits.
pub struct InFlightGuard<'a> {
    store: &'a dyn TeleportStateStore,
    id: EntityId,
}

impl<'a> InFlightGuard<'a> {
    pub fn enter(store: &'a dyn TeleportStateStore, id: EntityId) -> Result<Self> {
        store.insert_in_flight(id)?;
        Ok(Self { store, id })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.store.remove_in_flight(self.id) {
            tracing::warn!(id = %self.id, error = %err, "failed to clear in-flight entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_try_begin_rejects_live_record() {
        let store = InMemoryStateStore::new();
        let id = Uuid::new_v4();

        assert!(store.try_begin(id, TeleportRecord::new(1)).unwrap());
        assert!(!store.try_begin(id, TeleportRecord::new(2)).unwrap());
        assert_eq!(store.latest(id).unwrap().unwrap().started_at, 1);

        assert!(store.complete(id).unwrap());
        assert!(store.try_begin(id, TeleportRecord::new(3)).unwrap());
        assert_eq!(store.latest(id).unwrap().unwrap().started_at, 3);
        assert_eq!(store.live_count().unwrap(), 1);
    }

    #[test]
    fn test_update_missing_record() {
        let store = InMemoryStateStore::new();
        assert!(!store.update(Uuid::new_v4(), &mut |r| r.cost += 1.0).unwrap());
        assert!(!store.complete(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_archive_and_prior() {
        let store = InMemoryStateStore::new();
        let id = Uuid::new_v4();
        assert!(store.prior(id).unwrap().is_none());
        store.archive(id, TeleportRecord::new(42)).unwrap();
        assert_eq!(store.prior(id).unwrap().unwrap().started_at, 42);
    }

    #[test]
    fn test_guard_removes_on_drop() {
        let store = InMemoryStateStore::new();
        let id = Uuid::new_v4();
        {
            let guard = InFlightGuard::enter(&store, id).unwrap();
            assert_eq!(guard.id(), id);
            assert!(store.is_in_flight(id).unwrap());
        }
        assert!(!store.is_in_flight(id).unwrap());
        assert_eq!(store.in_flight_count().unwrap(), 0);
    }

    #[test]
    fn test_guard_removes_on_panic() {
        let store = InMemoryStateStore::new();
        let id = Uuid::new_v4();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = InFlightGuard::enter(&store, id).unwrap();
            panic!("pipeline blew up");
        }));
        assert!(result.is_err());
        assert!(!store.is_in_flight(id).unwrap());
    }
}
