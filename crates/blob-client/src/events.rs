use tokio::sync::mpsc;

use blob_shared::SinkEvent;

pub type SinkSender = mpsc::Sender<SinkEvent>;
pub type SinkReceiver = mpsc::Receiver<SinkEvent>;

/// Queue `event` for the presentation sink. A closed sink is logged, never
/// reported to the caller.
pub async fn emit_event(sink: &SinkSender, event: impl Into<SinkEvent>) {
    if let Err(e) = sink.send(event.into()).await {
        tracing::error!(event = %e.0, "Failed to emit event, sink closed");
    }
}
