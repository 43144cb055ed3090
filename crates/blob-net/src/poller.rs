//! Background synchronization of every registered endpoint.
//!
//! The poller runs in its own tokio task. Each tick it snapshots the
//! [`EndpointRegistry`], fetches every endpoint in turn and forwards one
//! [`SinkEvent::Display`] per message over the sink channel. It never touches
//! presentation state itself.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use blob_shared::constants::DEFAULT_POLL_INTERVAL_MS;
use blob_shared::{DisplayEvent, SinkEvent};

use crate::registry::EndpointRegistry;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause between the end of one tick and the start of the next.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// The sink's receiving half was dropped.
#[derive(Debug, Error)]
#[error("sink channel closed")]
pub struct SinkClosed;

/// Handle to a running poller task.
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask the poller to stop. It exits at the next tick boundary, or right
    /// away if it is sleeping; a request in flight is allowed to finish.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the poller and wait for its task to end.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Poller task ended abnormally");
        }
    }
}

/// Spawn the poll loop on the current tokio runtime.
pub fn spawn_poller(
    registry: EndpointRegistry,
    sink: mpsc::Sender<SinkEvent>,
    config: PollerConfig,
) -> PollerHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(poll_loop(registry, sink, config, stop_rx));
    PollerHandle { stop_tx, task }
}

async fn poll_loop(
    registry: EndpointRegistry,
    sink: mpsc::Sender<SinkEvent>,
    config: PollerConfig,
    mut stop_rx: watch::Receiver<bool>,
) {
    info!(interval_ms = config.interval.as_millis() as u64, "Poller started");

    loop {
        if *stop_rx.borrow() {
            break;
        }

        match poll_once(&registry, &sink).await {
            Ok(0) => {}
            Ok(count) => debug!(count, "Poll tick delivered messages"),
            Err(SinkClosed) => {
                warn!("Sink closed, stopping poller");
                break;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            changed = stop_rx.changed() => {
                // Sender dropped: nobody can stop us any more, so stop now.
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Poller stopped");
}

/// Run a single tick over a snapshot of `registry`, returning the number of
/// events sent to `sink`.
pub async fn poll_once(
    registry: &EndpointRegistry,
    sink: &mpsc::Sender<SinkEvent>,
) -> Result<usize, SinkClosed> {
    let endpoints = registry.snapshot();
    let mut emitted = 0;

    for endpoint in endpoints {
        let messages = endpoint.fetch().await;
        for message in &messages {
            let event = DisplayEvent::from_message(endpoint.label(), message);
            sink.send(event.into()).await.map_err(|_| SinkClosed)?;
            emitted += 1;
        }
    }

    Ok(emitted)
}
