use crate::core::Actor;
use crate::teleport::PlacementJob;

/// Per-entity teleport state.
///
/// ```text
/// begin ──> live (completed = false) ──complete──> completed
///   │                                                 │
///   └──── early exit: removed             archived as prior on next begin
/// ```
#[derive(Debug, Clone)]
pub struct TeleportRecord {
    /// Who triggered the request, for later messaging
    pub invoker: Option<Actor>,
    /// Creation time in milliseconds, the base of cooldown arithmetic
    pub started_at: i64,
    pub completed: bool,
    /// Accumulated charge for this request
    pub cost: f64,
    /// Pre-teleport delay, informational
    pub delay_ticks: u64,
    pub pending_job: Option<PlacementJob>,
}

impl TeleportRecord {
    pub fn new(started_at: i64) -> Self {
        Self {
            invoker: None,
            started_at,
            completed: false,
            cost: 0.0,
            delay_ticks: 0,
            pending_job: None,
        }
    }

    pub fn with_invoker(mut self, invoker: Actor) -> Self {
        self.invoker = Some(invoker);
        self
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.completed
    }
}
