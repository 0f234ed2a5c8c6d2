use chrono::Utc;
use uuid::Uuid;

/// Identity of any entity or command sender.
pub type EntityId = Uuid;

/// Identity of the server console. Exempt from de-duplication tracking.
pub const SYSTEM_ACTOR_ID: EntityId = Uuid::nil();

/// Permission nodes consulted by the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Use the command at all
    Use,
    /// Skip every economy charge
    Free,
    /// Targets holding this are not charged for by others
    NotMe,
}

impl Permission {
    pub fn node(&self) -> &'static str {
        match self {
            Self::Use => "rtp.use",
            Self::Free => "rtp.free",
            Self::NotMe => "rtp.notme",
        }
    }

    pub fn from_node(node: &str) -> Option<Self> {
        match node.to_ascii_lowercase().as_str() {
            "rtp.use" => Some(Self::Use),
            "rtp.free" => Some(Self::Free),
            "rtp.notme" => Some(Self::NotMe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorKind {
    /// A placeable entity standing in a world
    Player { world: String },
    /// Console-like sender that cannot itself be teleported
    Console,
}

/// Whoever invokes the command, or is targeted by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: EntityId,
    name: String,
    cooldown_ms: i64,
    delay_ticks: u64,
    kind: ActorKind,
}

impl Actor {
    pub fn player(id: EntityId, name: impl Into<String>, world: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cooldown_ms: 0,
            delay_ticks: 0,
            kind: ActorKind::Player {
                world: world.into(),
            },
        }
    }

    pub fn console(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cooldown_ms: 0,
            delay_ticks: 0,
            kind: ActorKind::Console,
        }
    }

    /// The server console
    pub fn system() -> Self {
        Self::console(SYSTEM_ACTOR_ID, "CONSOLE")
    }

    pub fn with_cooldown(mut self, cooldown_ms: i64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn with_delay(mut self, delay_ticks: u64) -> Self {
        self.delay_ticks = delay_ticks;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown_ms
    }

    pub fn delay_ticks(&self) -> u64 {
        self.delay_ticks
    }

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    /// World the actor currently stands in, if it is placeable.
    pub fn world(&self) -> Option<&str> {
        match &self.kind {
            ActorKind::Player { world } => Some(world),
            ActorKind::Console => None,
        }
    }

    #[inline]
    pub fn is_placeable(&self) -> bool {
        matches!(self.kind, ActorKind::Player { .. })
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_ACTOR_ID
    }
}

/// Millisecond wall clock, injectable for tests.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Elapsed milliseconds since `start`.
///
/// A negative difference means the timestamp wrapped; it is pushed up
/// towards `i64::MAX` so it never reads as a recent request.
pub fn elapsed_millis(now: i64, start: i64) -> i64 {
    let diff = now.wrapping_sub(start);
    if diff < 0 { i64::MAX.wrapping_add(diff) } else { diff }
}
