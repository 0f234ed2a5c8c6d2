use super::ResolutionPipeline;
use crate::config::MessageKey;
use crate::context::RtpContext;
use crate::core::{Actor, CommandArgs, Permission, Result, elapsed_millis};
use crate::state::InFlightGuard;
use futures::FutureExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Why the gate turned a request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A reload is in progress
    Busy,
    NoPermission,
    Cooldown,
    AlreadyTeleporting,
}

impl Rejection {
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::Busy => MessageKey::Busy,
            Self::NoPermission => MessageKey::NoPerms,
            Self::Cooldown => MessageKey::CooldownMessage,
            Self::AlreadyTeleporting => MessageKey::AlreadyTeleporting,
        }
    }
}

/// What the gate did with a request.
#[derive(Debug)]
pub enum Admission {
    Rejected(Rejection),
    /// Forwarded; the handle resolves once the pipeline finishes
    Dispatched(JoinHandle<bool>),
    /// The pipeline could not be started. Already logged.
    Failed,
}

/// Synchronous entry point of the command.
///
/// Applies the busy, permission, cooldown and de-duplication checks, then
/// hands the request to the [`ResolutionPipeline`] without waiting for it.
pub struct AdmissionGate {
    pipeline: Arc<ResolutionPipeline>,
}

impl AdmissionGate {
    pub fn new(ctx: Arc<RtpContext>) -> Self {
        Self {
            pipeline: Arc::new(ResolutionPipeline::new(ctx)),
        }
    }

    pub fn pipeline(&self) -> &Arc<ResolutionPipeline> {
        &self.pipeline
    }

    /// Handles a raw command. Returns the "handled" signal: true for a
    /// rejection, otherwise whatever the pipeline has produced by now,
    /// which is false while it is still running.
    pub fn on_command<S: AsRef<str>>(&self, sender: &Actor, raw: &[S]) -> bool {
        match self.submit(sender, raw) {
            Admission::Rejected(_) => true,
            Admission::Failed => false,
            Admission::Dispatched(mut handle) => (&mut handle)
                .now_or_never()
                .and_then(|joined| joined.ok())
                .unwrap_or(false),
        }
    }

    /// Like [`on_command`](Self::on_command) but hands back the outcome.
    pub fn submit<S: AsRef<str>>(&self, sender: &Actor, raw: &[S]) -> Admission {
        match self.admit(sender, raw) {
            Ok(admission) => admission,
            Err(err) => {
                tracing::warn!(sender = sender.name(), error = %err, "rtp admission failed");
                Admission::Failed
            }
        }
    }

    fn admit<S: AsRef<str>>(&self, sender: &Actor, raw: &[S]) -> Result<Admission> {
        let ctx = self.pipeline.context();
        let state = ctx.state();

        if ctx.is_reloading() {
            return Ok(self.reject(sender, Rejection::Busy));
        }

        let args = CommandArgs::parse(raw);
        if !CommandArgs::has_delimiters(raw) {
            let handle = self.pipeline.dispatch(sender.clone(), args, None)?;
            return Ok(Admission::Dispatched(handle));
        }

        if !ctx.server().has_permission(sender.id(), Permission::Use) {
            return Ok(self.reject(sender, Rejection::NoPermission));
        }

        match state.latest(sender.id())? {
            Some(record) => {
                if record.invoker.is_none() {
                    state.update(sender.id(), &mut |r| {
                        if r.invoker.is_none() {
                            r.invoker = Some(sender.clone());
                        }
                    })?;
                }

                let elapsed = elapsed_millis(ctx.now_millis(), record.started_at);
                if elapsed < sender.cooldown_ms() {
                    return Ok(self.reject(sender, Rejection::Cooldown));
                }
                if record.completed {
                    // stale entry left by an earlier request
                    state.remove_in_flight(sender.id())?;
                }
            }
            None => {
                state.remove_in_flight(sender.id())?;
            }
        }

        if state.is_in_flight(sender.id())? {
            return Ok(self.reject(sender, Rejection::AlreadyTeleporting));
        }

        let _in_flight = if sender.is_system() {
            None
        } else {
            Some(InFlightGuard::enter(state, sender.id())?)
        };

        let handle = self.pipeline.dispatch(sender.clone(), args, None)?;
        Ok(Admission::Dispatched(handle))
    }

    fn reject(&self, sender: &Actor, rejection: Rejection) -> Admission {
        let config = self.pipeline.context().config();
        let msg = config
            .messages
            .render_with(rejection.message_key(), &[("[player]", sender.name())]);
        self.pipeline.context().server().send_message(sender.id(), &msg);
        tracing::debug!(sender = sender.name(), ?rejection, "rtp request rejected");
        Admission::Rejected(rejection)
    }
}
