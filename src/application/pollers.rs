//! Background refresh of the health and annotation panels
//!
//! Each poller ticks on a fixed interval (first tick immediately) and stops
//! on the shared shutdown signal. A slow poll delays the next tick instead of
//! bursting to catch up.

use crate::application::orchestrator::ChartOrchestrator;
use crate::domain::config_types::PollInterval;
use crate::infrastructure::log_messages;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

pub struct Pollers {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl Pollers {
    /// Start the health and annotation pollers on the current runtime
    pub fn spawn(
        orchestrator: Arc<ChartOrchestrator>,
        health_every: PollInterval,
        annotations_every: PollInterval,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let health = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(run_poller(
                "health",
                health_every.as_duration(),
                shutdown_tx.subscribe(),
                move || {
                    let orchestrator = orchestrator.clone();
                    async move {
                        orchestrator.poll_health().await;
                    }
                },
            ))
        };

        let annotations = tokio::spawn(run_poller(
            "annotations",
            annotations_every.as_duration(),
            shutdown_tx.subscribe(),
            move || {
                let orchestrator = orchestrator.clone();
                async move {
                    orchestrator.poll_annotations().await;
                }
            },
        ));

        Self {
            shutdown_tx,
            handles: vec![health, annotations],
        }
    }

    /// Signal both pollers and wait for them to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        for handle in std::mem::take(&mut self.handles) {
            if let Err(error) = handle.await {
                error!(%error, "{}", log_messages::pollers::TASK_FAILED);
            }
        }
    }
}

impl Drop for Pollers {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn run_poller<F, Fut>(
    name: &'static str,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut poll: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(poller = name, every_secs = every.as_secs(), "{}", log_messages::pollers::STARTED);

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = ticker.tick() => poll().await,
        }
    }

    info!(poller = name, "{}", log_messages::pollers::STOPPED);
}
