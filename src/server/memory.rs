use super::{Economy, ServerAccessor};
use crate::core::{Actor, EntityId, Permission, Result, RtpError, SYSTEM_ACTOR_ID};
use crate::selection::Shape;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::sync::RwLock as AsyncRwLock;

/// A message delivered through [`InMemoryServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: EntityId,
    pub about: Option<EntityId>,
    pub text: String,
}

/// Server double holding players, permission grants and an outbox.
#[derive(Default)]
pub struct InMemoryServer {
    players: RwLock<HashMap<String, Actor>>,
    permissions: RwLock<HashMap<EntityId, HashSet<Permission>>>,
    borders: RwLock<HashMap<String, Shape>>,
    outbox: Mutex<Vec<SentMessage>>,
    failures: Mutex<Vec<(EntityId, String)>>,
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) an online player.
    pub fn add_player(&self, actor: Actor) {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        players.insert(actor.name().to_ascii_lowercase(), actor);
    }

    pub fn remove_player(&self, name: &str) -> Option<Actor> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        players.remove(&name.to_ascii_lowercase())
    }

    pub fn grant(&self, actor: EntityId, permission: Permission) -> bool {
        let mut grants = self.permissions.write().unwrap_or_else(PoisonError::into_inner);
        grants.entry(actor).or_default().insert(permission)
    }

    pub fn revoke(&self, actor: EntityId, permission: Permission) -> bool {
        let mut grants = self.permissions.write().unwrap_or_else(PoisonError::into_inner);
        grants
            .get_mut(&actor)
            .map(|set| set.remove(&permission))
            .unwrap_or(false)
    }

    pub fn set_world_border(&self, world: &str, shape: Shape) {
        let mut borders = self.borders.write().unwrap_or_else(PoisonError::into_inner);
        borders.insert(world.to_string(), shape);
    }

    /// Every message sent so far, oldest first.
    pub fn messages(&self) -> Vec<SentMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Texts received by one actor.
    pub fn messages_for(&self, actor: EntityId) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.recipient == actor)
            .map(|m| m.text)
            .collect()
    }

    /// Drains the outbox.
    pub fn take_messages(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.outbox.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn fail_events(&self) -> Vec<(EntityId, String)> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, message: SentMessage) {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}

impl ServerAccessor for InMemoryServer {
    fn player(&self, name: &str) -> Option<Actor> {
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        players.get(&name.to_ascii_lowercase()).cloned()
    }

    /// The system actor holds every permission.
    fn has_permission(&self, actor: EntityId, permission: Permission) -> bool {
        if actor == SYSTEM_ACTOR_ID {
            return true;
        }
        let grants = self.permissions.read().unwrap_or_else(PoisonError::into_inner);
        grants
            .get(&actor)
            .map(|set| set.contains(&permission))
            .unwrap_or(false)
    }

    fn send_message(&self, actor: EntityId, text: &str) {
        self.push(SentMessage {
            recipient: actor,
            about: None,
            text: text.to_string(),
        });
    }

    fn send_message_about(&self, actor: EntityId, target: EntityId, text: &str) {
        self.push(SentMessage {
            recipient: actor,
            about: Some(target),
            text: text.to_string(),
        });
    }

    fn world_border_shape(&self, world: &str) -> Option<Shape> {
        let borders = self.borders.read().unwrap_or_else(PoisonError::into_inner);
        borders.get(world).cloned()
    }

    fn fail_event(&self, sender: &Actor, message: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((sender.id(), message.to_string()));
    }
}

/// Balance table. Refuses any debit larger than the current balance.
#[derive(Default)]
pub struct InMemoryLedger {
    balances: AsyncRwLock<HashMap<EntityId, f64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_balance(&self, actor: EntityId, amount: f64) {
        self.balances.write().await.insert(actor, amount);
    }

    pub async fn deposit(&self, actor: EntityId, amount: f64) -> Result<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(RtpError::Economy(format!("Invalid deposit amount {}", amount)));
        }
        let mut balances = self.balances.write().await;
        let balance = balances.entry(actor).or_insert(0.0);
        *balance += amount;
        Ok(*balance)
    }
}

#[async_trait]
impl Economy for InMemoryLedger {
    async fn balance(&self, actor: EntityId) -> Result<f64> {
        Ok(self.balances.read().await.get(&actor).copied().unwrap_or(0.0))
    }

    async fn debit(&self, actor: EntityId, amount: f64) -> Result<bool> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(RtpError::Economy(format!("Invalid debit amount {}", amount)));
        }

        let mut balances = self.balances.write().await;
        let balance = balances.entry(actor).or_insert(0.0);
        if *balance < amount {
            return Ok(false);
        }
        *balance -= amount;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_player_lookup_ignores_case() {
        let server = InMemoryServer::new();
        let alice = Actor::player(Uuid::new_v4(), "Alice", "world");
        server.add_player(alice.clone());

        assert_eq!(server.player("alice"), Some(alice.clone()));
        assert_eq!(server.player("ALICE"), Some(alice));
        assert_eq!(server.player("bob"), None);
    }

    #[test]
    fn test_grant_revoke_permission() {
        let server = InMemoryServer::new();
        let id = Uuid::new_v4();

        assert!(!server.has_permission(id, Permission::Use));
        server.grant(id, Permission::Use);
        assert!(server.has_permission(id, Permission::Use));
        assert!(!server.has_permission(id, Permission::Free));

        assert!(server.revoke(id, Permission::Use));
        assert!(!server.has_permission(id, Permission::Use));
    }

    #[test]
    fn test_outbox() {
        let server = InMemoryServer::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        server.send_message(a, "hello");
        server.send_message_about(a, b, "about b");
        server.send_message(b, "other");

        assert_eq!(server.messages_for(a), vec!["hello", "about b"]);
        assert_eq!(server.take_messages().len(), 3);
        assert!(server.messages().is_empty());
    }

    #[tokio::test]
    async fn test_ledger_debit() {
        let ledger = InMemoryLedger::new();
        let id = Uuid::new_v4();
        ledger.set_balance(id, 20.0).await;

        assert!(ledger.debit(id, 15.0).await.unwrap());
        assert_eq!(ledger.balance(id).await.unwrap(), 5.0);
        assert!(!ledger.debit(id, 6.0).await.unwrap());
        assert_eq!(ledger.balance(id).await.unwrap(), 5.0);
        assert!(ledger.debit(id, -1.0).await.is_err());
    }

    #[test]
    fn test_system_actor_holds_every_permission() {
        let server = InMemoryServer::new();
        assert!(server.has_permission(SYSTEM_ACTOR_ID, Permission::Use));
        assert!(server.has_permission(SYSTEM_ACTOR_ID, Permission::Free));
    }

    #[test]
    fn test_ledger_unknown_actor_is_broke() {
        let ledger = InMemoryLedger::new();
        let id = Uuid::new_v4();
        tokio_test::block_on(async {
            assert_eq!(ledger.balance(id).await.unwrap(), 0.0);
            assert!(!ledger.debit(id, 0.5).await.unwrap());
            assert!(ledger.debit(id, 0.0).await.unwrap());
        });
    }

    #[tokio::test]
    async fn test_ledger_deposit() {
        let ledger = InMemoryLedger::new();
        let id = Uuid::new_v4();
        assert_eq!(ledger.deposit(id, 3.5).await.unwrap(), 3.5);
        assert_eq!(ledger.deposit(id, 1.5).await.unwrap(), 5.0);
        assert!(ledger.deposit(id, f64::NAN).await.is_err());
    }
}
