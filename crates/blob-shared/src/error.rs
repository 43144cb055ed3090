use thiserror::Error;

/// The request never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// The remote answered, but not with something we can use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("remote reported failure")]
    Rejected,
}

/// Failure of a single post or fetch against one endpoint. Logged and
/// collapsed to `false` / an empty batch before reaching the poller or the
/// session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Rejected user intents. Reported back to the caller, never fatal, and
/// never leave the session partially updated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Server address is empty")]
    EmptyLocation,

    #[error("Invalid server address: {0}")]
    InvalidLocation(String),

    #[error("Username cannot be empty")]
    EmptyDisplayName,

    #[error("Message is empty")]
    EmptyBody,

    #[error("No servers available")]
    NoEndpoints,

    #[error("No server at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No server has been selected")]
    NoActiveEndpoint,
}
