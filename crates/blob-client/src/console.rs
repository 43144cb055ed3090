//! Terminal front-end: reads intents from stdin and prints sink events.

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::SinkReceiver;

/// Read stdin lines on a dedicated thread.
///
/// A blocking thread (rather than `tokio::io::stdin`) keeps a pending read
/// from holding up runtime shutdown.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
        debug!("Stdin reader finished");
    });

    rx
}

/// Print every sink event to stdout until all senders are gone.
pub async fn run_console_sink(mut rx: SinkReceiver) {
    while let Some(event) = rx.recv().await {
        println!("{event}");
    }
    debug!("Console sink closed");
}
