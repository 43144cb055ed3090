//! Events consumed by the presentation sink, in emission order.

use crate::protocol::Message;
use crate::timestamp::format_timestamp;

/// One remote chat message, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    pub source_label: String,
    pub formatted_timestamp: String,
    pub author: String,
    pub body: String,
}

impl DisplayEvent {
    pub fn from_message(source_label: &str, message: &Message) -> Self {
        Self {
            source_label: source_label.to_string(),
            formatted_timestamp: format_timestamp(&message.timestamp),
            author: message.author.clone(),
            body: message.body.clone(),
        }
    }
}

impl std::fmt::Display for DisplayEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} <{}> {}",
            self.source_label, self.formatted_timestamp, self.author, self.body
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemLevel {
    Info,
    Error,
}

/// A client-side notice (confirmation or error) for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEvent {
    pub level: SystemLevel,
    pub message: String,
}

impl SystemEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: SystemLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: SystemLevel::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SystemEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            SystemLevel::Info => "System",
            SystemLevel::Error => "Error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Display(DisplayEvent),
    System(SystemEvent),
}

impl std::fmt::Display for SinkEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkEvent::Display(e) => write!(f, "{e}"),
            SinkEvent::System(e) => write!(f, "{e}"),
        }
    }
}

impl From<DisplayEvent> for SinkEvent {
    fn from(e: DisplayEvent) -> Self {
        SinkEvent::Display(e)
    }
}

impl From<SystemEvent> for SinkEvent {
    fn from(e: SystemEvent) -> Self {
        SinkEvent::System(e)
    }
}
