//! # blob-shared
//!
//! Types shared by every Blob crate: the chat message model as served by
//! remote endpoints, the events handed to the presentation sink, the error
//! taxonomy and process-wide constants.

pub mod constants;
pub mod error;
pub mod events;
pub mod protocol;
pub mod timestamp;
pub mod types;

pub use error::{EndpointError, ProtocolError, TransportError, ValidationError};
pub use events::{DisplayEvent, SinkEvent, SystemEvent, SystemLevel};
pub use protocol::{Message, MessagesEnvelope, PostResponse};
pub use types::{EndpointId, MessageId};
