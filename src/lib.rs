// ============================================================================
// RTP Core Library
// ============================================================================

pub mod command;
pub mod config;
pub mod context;
pub mod core;
pub mod selection;
pub mod server;
pub mod state;
pub mod teleport;

// Re-export main types for convenience
pub use command::{Admission, AdmissionGate, EconomyCheckResult, Rejection, ResolutionPipeline};
pub use config::{EconomyConfig, MessageKey, Messages, RtpConfig};
pub use context::RtpContext;
pub use crate::core::{
    Actor, ActorKind, AttrValue, Clock, CommandArgs, EntityId, Permission, Result, RtpError,
    SYSTEM_ACTOR_ID, pick_one,
};
pub use selection::{Region, SelectionApi, Shape, ShapeFactory, ShapeRegistry};
pub use server::{Economy, InMemoryLedger, InMemoryServer, ServerAccessor};
pub use state::{InMemoryStateStore, TeleportRecord, TeleportStateStore};
pub use teleport::{CompletingExecutor, PlacementExecutor, PlacementJob, SetupQueue, SetupReceiver};
