// ============================================================================
// Server-side collaborators
// ============================================================================
//
// The command core never touches worlds, players or balances directly. It
// talks to the hosting server through these traits; `memory` provides
// in-process implementations for the simulator and tests.
//
// ============================================================================

pub mod memory;

pub use memory::{InMemoryLedger, InMemoryServer};

use crate::core::{Actor, EntityId, Permission, Result};
use crate::selection::Shape;
use async_trait::async_trait;

/// Entity lookup, permissions and messaging provided by the hosting server.
pub trait ServerAccessor: Send + Sync {
    /// Resolve an online placeable entity by name.
    fn player(&self, name: &str) -> Option<Actor>;

    fn has_permission(&self, actor: EntityId, permission: Permission) -> bool;

    fn send_message(&self, actor: EntityId, text: &str);

    /// Message `actor` about `target`.
    fn send_message_about(&self, actor: EntityId, target: EntityId, text: &str);

    /// Current world-border geometry of a world.
    fn world_border_shape(&self, world: &str) -> Option<Shape>;

    /// Hook fired when a command fails for a reason the sender must see.
    fn fail_event(&self, _sender: &Actor, _message: &str) {}
}

/// Economy ledger. Storage lives outside this crate.
#[async_trait]
pub trait Economy: Send + Sync {
    async fn balance(&self, actor: EntityId) -> Result<f64>;

    /// Withdraw `amount`. Returns false when the ledger refuses for lack of funds.
    async fn debit(&self, actor: EntityId, amount: f64) -> Result<bool>;
}
