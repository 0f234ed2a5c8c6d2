use super::PlacementJob;
use crate::core::{Result, RtpError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Append-only queue feeding placement jobs to the external scheduler.
#[derive(Clone)]
pub struct SetupQueue {
    tx: mpsc::UnboundedSender<PlacementJob>,
    pushed: Arc<AtomicUsize>,
}

/// Consuming end of a [`SetupQueue`].
pub struct SetupReceiver {
    rx: mpsc::UnboundedReceiver<PlacementJob>,
}

impl SetupQueue {
    pub fn channel() -> (Self, SetupReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                pushed: Arc::new(AtomicUsize::new(0)),
            },
            SetupReceiver { rx },
        )
    }

    pub fn push(&self, job: PlacementJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|err| RtpError::Runtime(format!("setup queue closed, dropped {}", err.0.id())))?;
        self.pushed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Jobs accepted since creation.
    pub fn pushed(&self) -> usize {
        self.pushed.load(Ordering::SeqCst)
    }
}

impl SetupReceiver {
    pub fn try_next(&mut self) -> Option<PlacementJob> {
        self.rx.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<PlacementJob> {
        self.rx.recv().await
    }

    /// Everything queued right now, without waiting.
    pub fn drain_ready(&mut self) -> Vec<PlacementJob> {
        let mut jobs = Vec::new();
        while let Some(job) = self.try_next() {
            jobs.push(job);
        }
        jobs
    }

    /// Runs queued jobs in order until every queue handle is dropped.
    /// Resolves to the number of jobs run.
    pub fn spawn_worker(mut self, handle: &Handle) -> JoinHandle<usize> {
        handle.spawn(async move {
            let mut ran = 0;
            while let Some(job) = self.next().await {
                if let Err(err) = job.run() {
                    tracing::warn!(job = %job.id(), target = job.target().name(), error = %err, "placement failed");
                }
                ran += 1;
            }
            ran
        })
    }
}
