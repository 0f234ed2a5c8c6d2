pub mod job;
pub mod queue;

pub use job::{JobId, PlacementExecutor, PlacementJob};
pub use queue::{SetupQueue, SetupReceiver};

use crate::core::Result;
use crate::state::TeleportStateStore;
use std::sync::{Arc, Mutex, PoisonError};

/// Executor that performs no search: it records each job and marks the
/// target's record completed. Backs the simulator and the tests.
pub struct CompletingExecutor {
    state: Arc<dyn TeleportStateStore>,
    placed: Mutex<Vec<PlacementJob>>,
}

impl CompletingExecutor {
    pub fn new(state: Arc<dyn TeleportStateStore>) -> Self {
        Self {
            state,
            placed: Mutex::new(Vec::new()),
        }
    }

    pub fn placed(&self) -> Vec<PlacementJob> {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PlacementExecutor for CompletingExecutor {
    fn place(&self, job: &PlacementJob) -> Result<()> {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job.clone());
        self.state.complete(job.target().id())?;
        Ok(())
    }
}
