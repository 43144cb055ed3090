pub mod commands;
pub mod config;
pub mod console;
pub mod events;
pub mod state;

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use blob_net::{spawn_poller, HttpContext};
use blob_shared::constants::APP_NAME;
use blob_shared::SystemEvent;

use crate::commands::{dispatch, Flow, Intent};
use crate::config::ClientConfig;
use crate::state::Session;

/// Install the global tracing subscriber. Logs go to stderr so they never
/// interleave with the chat on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blob_client_lib=info,blob_net=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Run the client until `/quit`, end of input or Ctrl-C.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        display_name = %config.display_name,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Starting {APP_NAME} chat client"
    );

    let http = HttpContext::new(&config.endpoint_config())?;

    let (sink_tx, sink_rx) = mpsc::channel(config.sink_capacity);
    let sink_task = tokio::spawn(console::run_console_sink(sink_rx));

    let mut session = Session::new(config.display_name.clone(), http, sink_tx.clone());

    for server in &config.servers {
        if let Err(e) = session
            .add_endpoint(&server.location, server.label.as_deref())
            .await
        {
            warn!(location = %server.location, error = %e, "Skipping configured server");
            session
                .notify(SystemEvent::error(format!("{} ({})", e, server.location)))
                .await;
        }
    }

    let poller = spawn_poller(session.registry(), sink_tx, config.poller_config());
    let mut input = console::spawn_stdin_reader();

    session
        .notify(SystemEvent::info(format!(
            "Hello {}, type /help for commands",
            session.display_name()
        )))
        .await;

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run_intent_loop(&mut session, &mut input, interrupted).await;

    poller.shutdown().await;
    // Last sender: dropping it lets the sink drain and finish.
    drop(session);
    sink_task.await?;

    info!("Bye");
    Ok(())
}

/// Dispatch input lines until `/quit`, end of input or `shutdown` resolves.
/// `shutdown` is polled across iterations, so a signal that arrives while a
/// command is running still ends the loop.
pub async fn run_intent_loop(
    session: &mut Session,
    input: &mut mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else {
                    info!("Input closed");
                    break;
                };
                let Some(intent) = Intent::parse(&line) else {
                    continue;
                };
                if dispatch(session, intent).await == Flow::Quit {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }
}
