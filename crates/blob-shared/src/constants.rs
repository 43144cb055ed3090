/// Application name
pub const APP_NAME: &str = "Blob";

/// Display name used until the user picks one
pub const DEFAULT_DISPLAY_NAME: &str = "Guest";

/// Author shown when a remote message carries no `pseudo`
pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Interval between two poll ticks, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Hard timeout for a single HTTP request, in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Capacity of the channel feeding the presentation sink
pub const DEFAULT_SINK_CAPACITY: usize = 256;

/// Resource used to publish a message (relative to the endpoint location)
pub const POST_RESOURCE: &str = "post_message";

/// Resource used to list messages (relative to the endpoint location)
pub const FETCH_RESOURCE: &str = "get_messages";

/// Query parameter carrying the watermark
pub const SINCE_PARAM: &str = "since_id";

/// Form fields of the post resource
pub const FIELD_AUTHOR: &str = "pseudo";
pub const FIELD_BODY: &str = "message";
pub const FIELD_LABEL: &str = "server";
