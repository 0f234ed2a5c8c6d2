use super::economy::{EconomyCheckResult, charge_target, check_economy};
use super::region::{apply_world_border_override, biome_filter, resolve_region};
use super::{keys, params, targets};
use crate::config::{MessageKey, RtpConfig};
use crate::context::RtpContext;
use crate::core::{Actor, CommandArgs, Result, elapsed_millis};
use crate::state::{InFlightGuard, TeleportRecord};
use crate::teleport::PlacementJob;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

/// Inputs shared by every target of one request.
struct Request<'a> {
    sender: &'a Actor,
    args: &'a CommandArgs,
    config: &'a RtpConfig,
    economy: EconomyCheckResult,
    toggle_target_perms: bool,
    verbose: bool,
}

/// Asynchronous half of the command: targets, economy, regions, jobs.
pub struct ResolutionPipeline {
    ctx: Arc<RtpContext>,
}

impl ResolutionPipeline {
    pub fn new(ctx: Arc<RtpContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<RtpContext> {
        &self.ctx
    }

    /// Spawns [`compute`](Self::compute) on the context's runtime.
    ///
    /// The returned handle resolves to false when the pipeline failed; the
    /// failure is logged and never propagated.
    pub fn dispatch(
        self: &Arc<Self>,
        sender: Actor,
        args: CommandArgs,
        next_command: Option<String>,
    ) -> Result<JoinHandle<bool>> {
        let runtime = self.ctx.runtime()?;
        let pipeline = Arc::clone(self);
        let span = info_span!("rtp", sender = %sender.id(), name = sender.name());

        Ok(runtime.spawn(
            async move {
                match pipeline.compute(&sender, &args, next_command.as_deref()).await {
                    Ok(done) => done,
                    Err(err) => {
                        warn!(error = %err, "rtp command failed");
                        false
                    }
                }
            }
            .instrument(span),
        ))
    }

    /// Runs the whole request for `sender`.
    ///
    /// Targets are processed in order; a failing target does not stop the
    /// ones after it and nothing already charged is rolled back. The sender
    /// stays in the in-flight set until this returns.
    pub async fn compute(
        &self,
        sender: &Actor,
        args: &CommandArgs,
        next_command: Option<&str>,
    ) -> Result<bool> {
        if next_command.is_some() {
            return Ok(true);
        }

        let state = self.ctx.state();
        let _in_flight = if sender.is_system() {
            None
        } else {
            Some(InFlightGuard::enter(state, sender.id())?)
        };

        let config = self.ctx.config();
        let verbose = config.logging.command;
        if verbose {
            info!("RTP command triggered by {}.", sender.name());
        }

        let targets = targets::collect_targets(self.ctx.server(), &config, sender, args);
        if targets.is_empty() {
            return Ok(true);
        }

        let economy = check_economy(&self.ctx, &config, sender, &targets, args).await?;
        if !economy.can_proceed {
            return Ok(true);
        }

        let request = Request {
            sender,
            args,
            config: &config,
            economy,
            toggle_target_perms: args.flag(keys::TOGGLE_TARGET_PERMS),
            verbose,
        };

        let mut scheduled = 0usize;
        for target in &targets {
            match self.setup_target(&request, target).await {
                Ok(true) => scheduled += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(target = target.name(), error = %err, "teleport setup failed");
                }
            }
        }
        debug!(targets = targets.len(), scheduled, "rtp request resolved");

        Ok(true)
    }

    /// Builds and schedules the placement job for one target.
    async fn setup_target(&self, request: &Request<'_>, target: &Actor) -> Result<bool> {
        let ctx = &self.ctx;
        let state = ctx.state();
        let server = ctx.server();
        let config = request.config;
        let sender = request.sender;

        if request.verbose && request.args.contains(keys::PLAYER) {
            info!("RTP processing player:{}", target.name());
        }

        let prior = state.latest(target.id())?;
        if prior.as_ref().is_some_and(TeleportRecord::is_live) {
            self.already_teleporting(request, target);
            return Ok(false);
        }

        if let Some(previous) = &prior {
            if request.toggle_target_perms
                && elapsed_millis(ctx.now_millis(), previous.started_at) < target.cooldown_ms()
            {
                let msg = config.messages.render(MessageKey::CooldownMessage);
                server.send_message_about(sender.id(), target.id(), &msg);
                return Ok(false);
            }
            state.archive(target.id(), previous.clone())?;
        }

        let record = TeleportRecord::new(ctx.now_millis()).with_invoker(sender.clone());
        if !state.try_begin(target.id(), record)? {
            self.already_teleporting(request, target);
            return Ok(false);
        }

        // The new record must not outlive a request that did not schedule a job
        match self.schedule(request, target).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.abandon(target, prior)?;
                Ok(false)
            }
            Err(err) => {
                if let Err(cleanup) = self.abandon(target, prior) {
                    warn!(target = target.name(), error = %cleanup, "could not release teleport record");
                }
                Err(err)
            }
        }
    }

    /// Resolves, charges and hands off the job for a target whose record
    /// has just been created. False when the target was skipped.
    async fn schedule(&self, request: &Request<'_>, target: &Actor) -> Result<bool> {
        let ctx = &self.ctx;
        let state = ctx.state();
        let server = ctx.server();
        let config = request.config;
        let sender = request.sender;

        let Some(region) = resolve_region(ctx.selection(), config, target, request.args) else {
            state.remove_in_flight(target.id())?;
            return Ok(false);
        };

        let (mut region, world_border_override) =
            apply_world_border_override(server, request.args, region);

        let paid = charge_target(
            ctx,
            config,
            sender,
            target,
            request.args,
            &region,
            world_border_override,
            request.toggle_target_perms,
            &request.economy,
        )
        .await?;
        if !paid {
            return Ok(false);
        }

        let biomes = biome_filter(request.args);

        if request.args.contains(keys::SHAPE) {
            region = params::apply_shape_overrides(
                ctx.selection(),
                ctx.shapes(),
                &region,
                request.args,
                sender.id(),
            )?;
        }

        // TODO: apply `vert` overrides once regions carry a vertical adjustor
        let delay = if request.toggle_target_perms {
            target.delay_ticks()
        } else {
            sender.delay_ticks()
        };

        let job = PlacementJob::new(
            sender.clone(),
            target.clone(),
            region,
            biomes,
            ctx.executor(),
        )
        .with_delay(delay);

        state.update(target.id(), &mut |record| {
            record.pending_job = Some(job.clone());
            record.delay_ticks = delay;
        })?;

        if delay > 0 {
            let msg = config
                .messages
                .render_with(MessageKey::DelayMessage, &[("[player]", target.name())]);
            server.send_message_about(sender.id(), target.id(), &msg);
        }

        if self.run_inline(config, &job, delay)? {
            debug!(job = %job.id(), "running placement inline");
            job.run()?;
        } else {
            ctx.queue().push(job)?;
        }

        Ok(true)
    }

    /// Inline when sync loading is forced, or when nothing needs searching:
    /// no biome filter, a known location for the target, and no delay.
    fn run_inline(&self, config: &RtpConfig, job: &PlacementJob, delay: u64) -> Result<bool> {
        if config.performance.sync_loading {
            return Ok(true);
        }
        if job.biomes().is_some() || delay > 0 {
            return Ok(false);
        }
        self.ctx
            .selection()
            .has_location(job.region().name(), job.target().id())
    }

    fn already_teleporting(&self, request: &Request<'_>, target: &Actor) {
        let msg = request
            .config
            .messages
            .render_with(MessageKey::AlreadyTeleporting, &[("[player]", target.name())]);
        let server = self.ctx.server();
        server.send_message_about(request.sender.id(), target.id(), &msg);
        server.fail_event(request.sender, &msg);
    }

    /// Drops the record created for this request and restores the prior one.
    fn abandon(&self, target: &Actor, prior: Option<TeleportRecord>) -> Result<()> {
        let state = self.ctx.state();
        state.remove_latest(target.id())?;
        if let Some(previous) = prior {
            state.try_begin(target.id(), previous)?;
        }
        Ok(())
    }
}
