//! Session state owned by the interactive intent loop.
//!
//! The [`Session`] is the single source of truth for the display name, the
//! endpoint list and the endpoint messages are sent to. It is owned by value
//! by whoever handles user intents; the poller only ever sees the shared
//! [`EndpointRegistry`].

use std::sync::Arc;

use tracing::info;

use blob_net::{Endpoint, EndpointRegistry, HttpContext};
use blob_shared::{SinkEvent, SystemEvent, ValidationError};

use crate::events::{emit_event, SinkSender};

/// One row of the endpoint listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSummary {
    pub index: usize,
    pub label: String,
    pub location: String,
    pub active: bool,
}

pub struct Session {
    /// Name sent as `pseudo` with every message.
    display_name: String,

    /// Endpoints in the order they were added. Shared with the poller.
    registry: EndpointRegistry,

    /// Index into `registry` of the endpoint messages are posted to.
    active: Option<usize>,

    /// HTTP client and resource naming handed to new endpoints.
    http: HttpContext,

    /// Where confirmations go.
    sink: SinkSender,
}

impl Session {
    pub fn new(display_name: impl Into<String>, http: HttpContext, sink: SinkSender) -> Self {
        Self {
            display_name: display_name.into(),
            registry: EndpointRegistry::new(),
            active: None,
            http,
            sink,
        }
    }

    /// Another handle to the endpoint list, for the poller.
    pub fn registry(&self) -> EndpointRegistry {
        self.registry.clone()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_endpoint(&self) -> Option<Arc<Endpoint>> {
        self.active.and_then(|i| self.registry.get(i))
    }

    pub fn endpoints(&self) -> Vec<EndpointSummary> {
        self.registry
            .snapshot()
            .iter()
            .enumerate()
            .map(|(index, ep)| EndpointSummary {
                index,
                label: ep.label().to_string(),
                location: ep.location().to_string(),
                active: self.active == Some(index),
            })
            .collect()
    }

    pub async fn notify(&self, event: impl Into<SinkEvent>) {
        emit_event(&self.sink, event).await;
    }

    /// Register a new endpoint. The first one added becomes active.
    pub async fn add_endpoint(
        &mut self,
        location: &str,
        label: Option<&str>,
    ) -> Result<Arc<Endpoint>, ValidationError> {
        let endpoint = Arc::new(Endpoint::new(&self.http, location, label)?);
        let index = self.registry.push(endpoint.clone());

        info!(
            id = %endpoint.id().short(),
            endpoint = %endpoint.label(),
            location = %endpoint.location(),
            "Endpoint added"
        );

        if self.active.is_none() {
            self.active = Some(index);
            self.notify(SystemEvent::info(format!(
                "Current server: {}",
                endpoint.label()
            )))
            .await;
        }

        self.notify(SystemEvent::info(format!(
            "Server added: {} ({})",
            endpoint.label(),
            endpoint.location()
        )))
        .await;

        Ok(endpoint)
    }

    pub async fn select_endpoint(&mut self, index: usize) -> Result<(), ValidationError> {
        let len = self.registry.len();
        if len == 0 {
            return Err(ValidationError::NoEndpoints);
        }
        let endpoint = self
            .registry
            .get(index)
            .ok_or(ValidationError::IndexOutOfRange { index, len })?;

        self.active = Some(index);
        info!(index, endpoint = %endpoint.label(), "Active endpoint changed");
        self.notify(SystemEvent::info(format!(
            "Current server: {}",
            endpoint.label()
        )))
        .await;
        Ok(())
    }

    /// Remove an endpoint. If it was the active one, the first remaining
    /// endpoint takes over; otherwise the active endpoint is kept.
    pub async fn remove_endpoint(&mut self, index: usize) -> Result<Arc<Endpoint>, ValidationError> {
        let len = self.registry.len();
        if len == 0 {
            return Err(ValidationError::NoEndpoints);
        }
        let removed = self
            .registry
            .remove(index)
            .ok_or(ValidationError::IndexOutOfRange { index, len })?;

        info!(index, endpoint = %removed.label(), "Endpoint removed");
        self.notify(SystemEvent::info(format!(
            "Server removed: {}",
            removed.label()
        )))
        .await;

        match self.active {
            Some(active) if active == index => {
                self.active = (!self.registry.is_empty()).then_some(0);
                match self.active_endpoint() {
                    Some(ep) => {
                        self.notify(SystemEvent::info(format!("Current server: {}", ep.label())))
                            .await
                    }
                    None => {
                        self.notify(SystemEvent::info("No server selected")).await
                    }
                }
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }

        Ok(removed)
    }

    pub async fn set_display_name(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyDisplayName);
        }

        self.display_name = name.to_string();
        info!(display_name = %self.display_name, "Display name changed");
        self.notify(SystemEvent::info(format!(
            "Username changed to {}",
            self.display_name
        )))
        .await;
        Ok(())
    }

    /// Post `body` to the active endpoint as the current display name.
    ///
    /// `Ok(false)` means the endpoint was reached (or tried) and the message
    /// was not accepted. Validation failures never touch the network.
    pub async fn send_current(&self, body: &str) -> Result<bool, ValidationError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }

        let endpoint = self
            .active_endpoint()
            .ok_or(ValidationError::NoActiveEndpoint)?;

        Ok(endpoint.post(&self.display_name, body).await)
    }
}
