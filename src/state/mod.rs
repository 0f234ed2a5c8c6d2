// ============================================================================
// Per-Entity Request Lifecycle
// ============================================================================
//
// At most one non-completed record may exist per entity. The in-flight set
// covers entities still inside the resolution pipeline, including those
// that do not have a record yet.
//
// ============================================================================

pub mod record;
pub mod store;

pub use record::TeleportRecord;
pub use store::{InFlightGuard, InMemoryStateStore, TeleportStateStore};
