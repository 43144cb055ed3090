//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client starts with zero configuration;
//! servers can then be added interactively.

use std::time::Duration;

use blob_net::{EndpointConfig, PollerConfig};
use blob_shared::constants::{
    DEFAULT_DISPLAY_NAME, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SINK_CAPACITY,
};

/// A server to register at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSpec {
    pub location: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Initial display name.
    /// Env: `BLOB_DISPLAY_NAME`
    /// Default: `Guest`
    pub display_name: String,

    /// Pause between two poll ticks.
    /// Env: `BLOB_POLL_INTERVAL_MS`
    /// Default: `2000`
    pub poll_interval: Duration,

    /// Hard timeout of a single post or fetch.
    /// Env: `BLOB_REQUEST_TIMEOUT_MS`
    /// Default: `5000`
    pub request_timeout: Duration,

    /// Appended to `post_message` / `get_messages`.
    /// Env: `BLOB_RESOURCE_SUFFIX` (e.g. `.php`)
    /// Default: empty
    pub resource_suffix: String,

    /// Servers added before the prompt opens, first one active.
    /// Env: `BLOB_SERVERS`, comma separated `url` or `label=url`
    /// Default: none
    pub servers: Vec<ServerSpec>,

    /// Capacity of the channel feeding the console.
    /// Env: `BLOB_SINK_CAPACITY`
    /// Default: `256`
    pub sink_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            resource_suffix: String::new(),
            servers: Vec::new(),
            sink_capacity: DEFAULT_SINK_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("BLOB_DISPLAY_NAME") {
            if !name.trim().is_empty() {
                config.display_name = name.trim().to_string();
            }
        }

        if let Some(ms) = parse_millis(&lookup, "BLOB_POLL_INTERVAL_MS") {
            config.poll_interval = ms;
        }

        if let Some(ms) = parse_millis(&lookup, "BLOB_REQUEST_TIMEOUT_MS") {
            config.request_timeout = ms;
        }

        if let Some(suffix) = lookup("BLOB_RESOURCE_SUFFIX") {
            config.resource_suffix = suffix.trim().to_string();
        }

        if let Some(list) = lookup("BLOB_SERVERS") {
            config.servers = parse_servers(&list);
        }

        if let Some(val) = lookup("BLOB_SINK_CAPACITY") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.sink_capacity = n,
                _ => tracing::warn!(value = %val, "Invalid BLOB_SINK_CAPACITY, using default"),
            }
        }

        config
    }

    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            request_timeout: self.request_timeout,
            resource_suffix: self.resource_suffix.clone(),
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: self.poll_interval,
        }
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let val = lookup(key)?;
    match val.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            tracing::warn!(key, value = %val, "Invalid duration, using default");
            None
        }
    }
}

/// Parse `label=url,url,...`. A `=` only introduces a label when the part
/// before it is not itself a URL.
pub fn parse_servers(list: &str) -> Vec<ServerSpec> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((label, location)) if !label.contains("://") => ServerSpec {
                location: location.trim().to_string(),
                label: Some(label.trim().to_string()),
            },
            _ => ServerSpec {
                location: entry.to_string(),
                label: None,
            },
        })
        .collect()
}
