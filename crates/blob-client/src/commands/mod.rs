//! User intents.
//!
//! A line typed at the prompt is parsed into an [`Intent`] and applied to the
//! [`Session`] by [`dispatch`]. Sub-modules group the handlers by domain.
//! Rejected intents are reported on the sink, never returned as errors.

pub mod endpoints;
pub mod messaging;
pub mod profile;

use blob_shared::{SystemEvent, ValidationError};

use crate::state::Session;

pub const HELP: &[&str] = &[
    "/add <url> [label]   add a server (the first one becomes current)",
    "/use <index>         change the current server",
    "/servers             list servers",
    "/remove <index>      remove a server",
    "/nick <name>         change username",
    "/quit                leave",
    "anything else is sent to the current server (start with // to send a leading /)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddEndpoint {
        location: String,
        label: Option<String>,
    },
    SelectEndpoint(usize),
    ListEndpoints,
    RemoveEndpoint(usize),
    SetDisplayName(String),
    Send(String),
    Help,
    Shutdown,
    /// Malformed command, with the message to show.
    Invalid(String),
}

/// Whether the intent loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Intent {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(escaped) = line.strip_prefix("//") {
            return Some(Intent::Send(format!("/{escaped}")));
        }

        let Some(command) = line.strip_prefix('/') else {
            return Some(Intent::Send(line.to_string()));
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        let intent = match name {
            "add" => {
                if rest.is_empty() {
                    return Some(Intent::Invalid("Usage: /add <url> [label]".into()));
                }
                let (location, label) = match rest.split_once(char::is_whitespace) {
                    Some((location, label)) => (location, Some(label.trim().to_string())),
                    None => (rest, None),
                };
                Intent::AddEndpoint {
                    location: location.to_string(),
                    label,
                }
            }
            "use" | "server" => match parse_index(rest) {
                Some(index) => Intent::SelectEndpoint(index),
                None => Intent::Invalid("Usage: /use <index>".into()),
            },
            "remove" => match parse_index(rest) {
                Some(index) => Intent::RemoveEndpoint(index),
                None => Intent::Invalid("Usage: /remove <index>".into()),
            },
            "servers" | "list" => Intent::ListEndpoints,
            "nick" => Intent::SetDisplayName(rest.to_string()),
            "help" => Intent::Help,
            "quit" | "exit" => Intent::Shutdown,
            other => Intent::Invalid(format!("Unknown command /{other}, try /help")),
        };

        Some(intent)
    }
}

fn parse_index(s: &str) -> Option<usize> {
    s.parse().ok()
}

/// Apply `intent` to `session`.
pub async fn dispatch(session: &mut Session, intent: Intent) -> Flow {
    match intent {
        Intent::AddEndpoint { location, label } => {
            endpoints::add_endpoint(session, &location, label.as_deref()).await
        }
        Intent::SelectEndpoint(index) => endpoints::select_endpoint(session, index).await,
        Intent::ListEndpoints => endpoints::list_endpoints(session).await,
        Intent::RemoveEndpoint(index) => endpoints::remove_endpoint(session, index).await,
        Intent::SetDisplayName(name) => profile::set_display_name(session, &name).await,
        Intent::Send(body) => messaging::send_message(session, &body).await,
        Intent::Help => {
            for line in HELP {
                session.notify(SystemEvent::info(*line)).await;
            }
        }
        Intent::Invalid(message) => session.notify(SystemEvent::error(message)).await,
        Intent::Shutdown => {
            tracing::info!("Shutdown requested");
            return Flow::Quit;
        }
    }
    Flow::Continue
}

pub(crate) async fn report(session: &Session, error: ValidationError) {
    tracing::debug!(error = %error, "Intent rejected");
    session.notify(SystemEvent::error(error.to_string())).await;
}
