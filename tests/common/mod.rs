#![allow(dead_code)]

use rtp_core::selection::shape::CircleShape;
use rtp_core::{
    Actor, AdmissionGate, Clock, CompletingExecutor, Economy, InMemoryLedger, InMemoryServer,
    InMemoryStateStore, Permission, PlacementExecutor, Region, RtpConfig, RtpContext,
    SelectionApi, SetupQueue, SetupReceiver, ShapeFactory, ShapeRegistry, TeleportStateStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

pub const WORLD: &str = "world";

/// Clock the tests move by hand.
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub struct Harness {
    pub server: Arc<InMemoryServer>,
    pub ledger: Arc<InMemoryLedger>,
    pub selection: Arc<SelectionApi>,
    pub state: Arc<InMemoryStateStore>,
    pub executor: Arc<CompletingExecutor>,
    pub clock: Arc<FixedClock>,
    pub ctx: Arc<RtpContext>,
    pub gate: AdmissionGate,
    pub receiver: SetupReceiver,
}

/// `world` configured with the `default` circle region.
pub fn base_config() -> RtpConfig {
    RtpConfig::new().world(WORLD, "default")
}

impl Harness {
    pub fn new(config: RtpConfig) -> Self {
        Self::assemble(config, Arc::new(InMemoryLedger::new()), None, Arc::new(InMemoryStateStore::new()), None)
    }

    /// Same as [`Harness::new`] with the in-memory ledger plugged in.
    pub fn with_economy(config: RtpConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let economy: Arc<dyn Economy> = ledger.clone();
        Self::assemble(config, ledger, Some(economy), Arc::new(InMemoryStateStore::new()), None)
    }

    /// Plugs in a custom economy instead of the in-memory ledger.
    pub fn with_ledger(config: RtpConfig, economy: Arc<dyn Economy>) -> Self {
        Self::assemble(
            config,
            Arc::new(InMemoryLedger::new()),
            Some(economy),
            Arc::new(InMemoryStateStore::new()),
            None,
        )
    }

    /// Replaces the completing executor in the context with a custom one.
    pub fn with_executor(
        config: RtpConfig,
        make: impl FnOnce(Arc<InMemoryStateStore>) -> Arc<dyn PlacementExecutor>,
    ) -> Self {
        let state = Arc::new(InMemoryStateStore::new());
        let executor = make(state.clone());
        Self::assemble(config, Arc::new(InMemoryLedger::new()), None, state, Some(executor))
    }

    fn assemble(
        config: RtpConfig,
        ledger: Arc<InMemoryLedger>,
        economy: Option<Arc<dyn Economy>>,
        state: Arc<InMemoryStateStore>,
        executor: Option<Arc<dyn PlacementExecutor>>,
    ) -> Self {
        let server = Arc::new(InMemoryServer::new());
        let selection = Arc::new(SelectionApi::new());
        selection
            .add_region(Region::new("default", WORLD, CircleShape.create()))
            .unwrap();
        let completing = Arc::new(CompletingExecutor::new(state.clone()));
        let clock = Arc::new(FixedClock::new(1_000_000));
        let (queue, receiver) = SetupQueue::channel();

        let placement: Arc<dyn PlacementExecutor> = match executor {
            Some(executor) => executor,
            None => completing.clone(),
        };

        let mut ctx = RtpContext::new(config, server.clone(), state.clone(), queue, placement)
            .with_selection(selection.clone())
            .with_shapes(Arc::new(ShapeRegistry::with_default_shapes()))
            .with_clock(clock.clone());
        if let Some(economy) = economy {
            ctx = ctx.with_economy(economy);
        }
        let ctx = Arc::new(ctx);

        Self {
            server,
            ledger,
            selection,
            state,
            executor: completing,
            clock,
            gate: AdmissionGate::new(ctx.clone()),
            ctx,
            receiver,
        }
    }

    /// Online player in `world` holding `rtp.use`.
    pub fn player(&self, name: &str) -> Actor {
        let actor = self.player_without_perms(name);
        self.server.grant(actor.id(), Permission::Use);
        actor
    }

    pub fn player_without_perms(&self, name: &str) -> Actor {
        self.add(Actor::player(Uuid::new_v4(), name, WORLD))
    }

    /// Registers a prepared actor with the server.
    pub fn add(&self, actor: Actor) -> Actor {
        self.server.add_player(actor.clone());
        actor
    }

    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn is_in_flight(&self, actor: &Actor) -> bool {
        self.state.is_in_flight(actor.id()).unwrap()
    }
}
