// HTTP side of the client: remote endpoints and the background poller.

pub mod endpoint;
pub mod poller;
pub mod registry;

pub use endpoint::{normalize_location, Endpoint, EndpointConfig, HttpContext};
pub use poller::{poll_once, spawn_poller, PollerConfig, PollerHandle, SinkClosed};
pub use registry::EndpointRegistry;
