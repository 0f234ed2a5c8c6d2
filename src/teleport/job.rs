use crate::core::{Actor, Result, RtpError};
use crate::selection::Region;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl JobId {
    pub fn new() -> Self {
        JobId(NEXT_JOB_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job_{}", self.0)
    }
}

/// Searches for a safe landing spot and moves the target there.
///
/// Implementations own marking the target's record completed once the
/// placement succeeds or fails.
pub trait PlacementExecutor: Send + Sync {
    fn place(&self, job: &PlacementJob) -> Result<()>;
}

/// Fully specified placement request, ready to run inline or be queued.
#[derive(Clone)]
pub struct PlacementJob {
    id: JobId,
    invoker: Actor,
    target: Actor,
    region: Region,
    biomes: Option<BTreeSet<String>>,
    delay_ticks: u64,
    executor: Arc<dyn PlacementExecutor>,
}

impl PlacementJob {
    pub fn new(
        invoker: Actor,
        target: Actor,
        region: Region,
        biomes: Option<BTreeSet<String>>,
        executor: Arc<dyn PlacementExecutor>,
    ) -> Self {
        Self {
            id: JobId::new(),
            invoker,
            target,
            region,
            biomes,
            delay_ticks: 0,
            executor,
        }
    }

    pub fn with_delay(mut self, delay_ticks: u64) -> Self {
        self.delay_ticks = delay_ticks;
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn invoker(&self) -> &Actor {
        &self.invoker
    }

    pub fn target(&self) -> &Actor {
        &self.target
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Upper-cased biome names the landing spot must match, if filtered.
    pub fn biomes(&self) -> Option<&BTreeSet<String>> {
        self.biomes.as_ref()
    }

    pub fn delay_ticks(&self) -> u64 {
        self.delay_ticks
    }

    /// Runs the placement on the calling thread.
    pub fn run(&self) -> Result<()> {
        if !self.target.is_placeable() {
            return Err(RtpError::Placement(format!(
                "{} has no location to move",
                self.target.name()
            )));
        }
        tracing::debug!(job = %self.id, target = self.target.name(), region = self.region.name(), "running placement");
        self.executor.place(self)
    }
}

impl fmt::Debug for PlacementJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacementJob")
            .field("id", &self.id)
            .field("invoker", &self.invoker.name())
            .field("target", &self.target.name())
            .field("region", &self.region.name())
            .field("biomes", &self.biomes)
            .field("delay_ticks", &self.delay_ticks)
            .finish()
    }
}
