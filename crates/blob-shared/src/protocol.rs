//! JSON payloads exchanged with a remote chat endpoint.
//!
//! Remote servers are not trusted to be well-formed: every field of a message
//! is optional on the wire and falls back to a display-safe default.

use serde::Deserialize;
use serde_json::Value;

use crate::constants::ANONYMOUS_AUTHOR;
use crate::types::MessageId;

/// A chat message as listed by the `get_messages` resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawMessage")]
pub struct Message {
    /// Server-assigned id, used only as the next watermark.
    pub id: Option<MessageId>,
    /// `pseudo` on the wire.
    pub author: String,
    /// `message` on the wire.
    pub body: String,
    /// `ts` on the wire: ISO-8601, not validated.
    pub timestamp: String,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    pseudo: Value,
    #[serde(default)]
    message: Value,
    #[serde(default)]
    ts: Value,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        Self {
            id: MessageId::from_json(&raw.id),
            author: display_string(raw.pseudo).unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
            body: display_string(raw.message).unwrap_or_default(),
            timestamp: display_string(raw.ts).unwrap_or_default(),
        }
    }
}

fn display_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Body of a successful `get_messages` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesEnvelope {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body of a `post_message` response. A missing `success` counts as failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostResponse {
    #[serde(default)]
    pub success: bool,
}
