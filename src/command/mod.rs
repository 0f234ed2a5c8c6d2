// ============================================================================
// RTP Command
// ============================================================================
//
// Request flow:
//
//   caller ──> AdmissionGate (sync) ──> ResolutionPipeline (async)
//                                         │
//                     targets ─> economy ─> per target: region, debit,
//                                           shape merge, placement job
//                                                          │
//                                            run inline  or  SetupQueue
//
// ============================================================================

pub mod economy;
pub mod gate;
pub mod params;
pub mod pipeline;
pub mod region;
pub mod targets;

pub use economy::EconomyCheckResult;
pub use gate::{Admission, AdmissionGate, Rejection};
pub use pipeline::ResolutionPipeline;

pub const COMMAND_NAME: &str = "rtp";
pub const COMMAND_DESCRIPTION: &str = "teleport randomly";

/// Argument keys understood by the command.
pub mod keys {
    pub const PLAYER: &str = "player";
    pub const REGION: &str = "region";
    pub const WORLD: &str = "world";
    pub const SHAPE: &str = "shape";
    pub const VERT: &str = "vert";
    pub const BIOME: &str = "biome";
    pub const WORLD_BORDER_OVERRIDE: &str = "worldBorderOverride";
    pub const TOGGLE_TARGET_PERMS: &str = "toggletargetperms";
}
