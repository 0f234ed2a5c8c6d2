use crate::config::RtpConfig;
use crate::core::{Clock, Result, RtpError, SystemClock};
use crate::selection::{SelectionApi, ShapeRegistry};
use crate::server::{Economy, ServerAccessor};
use crate::state::TeleportStateStore;
use crate::teleport::{PlacementExecutor, SetupQueue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::runtime::Handle;

/// Collaborators and live state shared by the gate and the pipeline.
///
/// Everything is constructor-injected; there is no ambient global state.
pub struct RtpContext {
    config: RwLock<Arc<RtpConfig>>,
    reloading: AtomicBool,
    server: Arc<dyn ServerAccessor>,
    economy: Option<Arc<dyn Economy>>,
    selection: Arc<SelectionApi>,
    shapes: Arc<ShapeRegistry>,
    state: Arc<dyn TeleportStateStore>,
    queue: SetupQueue,
    executor: Arc<dyn PlacementExecutor>,
    clock: Arc<dyn Clock>,
    runtime: Option<Handle>,
}

impl RtpContext {
    pub fn new(
        config: RtpConfig,
        server: Arc<dyn ServerAccessor>,
        state: Arc<dyn TeleportStateStore>,
        queue: SetupQueue,
        executor: Arc<dyn PlacementExecutor>,
    ) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            reloading: AtomicBool::new(false),
            server,
            economy: None,
            selection: Arc::new(SelectionApi::new()),
            shapes: Arc::new(ShapeRegistry::with_default_shapes()),
            state,
            queue,
            executor,
            clock: Arc::new(SystemClock),
            runtime: None,
        }
    }

    /// Enable charging through an economy ledger
    pub fn with_economy(mut self, economy: Arc<dyn Economy>) -> Self {
        self.economy = Some(economy);
        self
    }

    pub fn with_selection(mut self, selection: Arc<SelectionApi>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_shapes(mut self, shapes: Arc<ShapeRegistry>) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runtime the pipeline is spawned on. Defaults to the caller's.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<RtpConfig> {
        match self.config.read() {
            Ok(config) => Arc::clone(&config),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn server(&self) -> &dyn ServerAccessor {
        self.server.as_ref()
    }

    pub fn economy(&self) -> Option<&dyn Economy> {
        self.economy.as_deref()
    }

    pub fn selection(&self) -> &SelectionApi {
        &self.selection
    }

    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    pub fn state(&self) -> &dyn TeleportStateStore {
        self.state.as_ref()
    }

    pub fn queue(&self) -> &SetupQueue {
        &self.queue
    }

    pub fn executor(&self) -> Arc<dyn PlacementExecutor> {
        Arc::clone(&self.executor)
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn runtime(&self) -> Result<Handle> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|e| RtpError::Runtime(e.to_string())),
        }
    }

    /// True while a reload is in progress.
    pub fn is_reloading(&self) -> bool {
        self.reloading.load(Ordering::SeqCst)
    }

    /// Marks the context busy until the returned guard is dropped.
    pub fn begin_reload(&self) -> ReloadGuard<'_> {
        self.reloading.store(true, Ordering::SeqCst);
        ReloadGuard { ctx: self }
    }

    /// Validates and swaps in a new configuration.
    pub fn reload(&self, config: RtpConfig) -> Result<()> {
        let guard = self.begin_reload();
        guard.replace(config)
    }
}

/// Busy marker for a reload in progress.
pub struct ReloadGuard<'a> {
    ctx: &'a RtpContext,
}

impl ReloadGuard<'_> {
    pub fn replace(&self, config: RtpConfig) -> Result<()> {
        config.validate()?;
        let mut current = self.ctx.config.write()?;
        *current = Arc::new(config);
        tracing::info!("configuration reloaded");
        Ok(())
    }
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.ctx.reloading.store(false, Ordering::SeqCst);
    }
}
