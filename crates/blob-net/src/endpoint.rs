//! A single remote chat endpoint.
//!
//! An [`Endpoint`] knows how to publish a message and how to list the
//! messages newer than its watermark. The `try_*` methods report precise
//! errors; [`Endpoint::post`] and [`Endpoint::fetch`] log them and collapse
//! the outcome to `false` / an empty batch so that callers never see a
//! network failure.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, warn};

use blob_shared::constants::{
    DEFAULT_REQUEST_TIMEOUT_MS, FETCH_RESOURCE, FIELD_AUTHOR, FIELD_BODY, FIELD_LABEL,
    POST_RESOURCE, SINCE_PARAM,
};
use blob_shared::{
    EndpointError, EndpointId, Message, MessageId, MessagesEnvelope, PostResponse, ProtocolError,
    TransportError, ValidationError,
};

/// HTTP settings shared by every endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Hard timeout for one request, connection included.
    pub request_timeout: Duration,
    /// Appended to resource names, e.g. `.php` for `post_message.php`.
    pub resource_suffix: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            resource_suffix: String::new(),
        }
    }
}

/// A configured `reqwest` client plus resource naming, cloned into each
/// endpoint. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpContext {
    client: Client,
    resource_suffix: String,
}

impl HttpContext {
    pub fn new(config: &EndpointConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            resource_suffix: config.resource_suffix.clone(),
        })
    }
}

#[derive(Debug)]
pub struct Endpoint {
    id: EndpointId,
    location: String,
    label: String,
    http: HttpContext,
    watermark: Mutex<Option<MessageId>>,
}

impl Endpoint {
    /// Build an endpoint for `location`. A blank `label` falls back to the
    /// normalized location.
    pub fn new(
        http: &HttpContext,
        location: &str,
        label: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let location = normalize_location(location)?;
        let label = match label.map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => location.clone(),
        };

        Ok(Self {
            id: EndpointId::new(),
            location,
            label,
            http: http.clone(),
            watermark: Mutex::new(None),
        })
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Id of the newest message seen so far, if any.
    pub fn watermark(&self) -> Option<MessageId> {
        self.lock_watermark().clone()
    }

    fn lock_watermark(&self) -> MutexGuard<'_, Option<MessageId>> {
        self.watermark.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}{}{}", self.location, resource, self.http.resource_suffix)
    }

    /// Publish `body` as `author`. Returns `true` only if the remote
    /// acknowledged with `success: true`.
    pub async fn post(&self, author: &str, body: &str) -> bool {
        match self.try_post(author, body).await {
            Ok(()) => {
                debug!(endpoint = %self.label, "Message posted");
                true
            }
            Err(e) => {
                warn!(endpoint = %self.label, error = %e, "Post failed");
                false
            }
        }
    }

    pub async fn try_post(&self, author: &str, body: &str) -> Result<(), EndpointError> {
        let url = self.resource_url(POST_RESOURCE);

        let resp = self
            .http
            .client
            .post(&url)
            .form(&[
                (FIELD_AUTHOR, author),
                (FIELD_BODY, body),
                (FIELD_LABEL, self.label.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProtocolError::Status(status.as_u16()).into());
        }

        let reply: PostResponse = resp.json().await.map_err(body_error)?;
        if reply.success {
            Ok(())
        } else {
            Err(ProtocolError::Rejected.into())
        }
    }

    /// List new messages, oldest first. Any failure yields an empty batch
    /// and leaves the watermark where it was.
    pub async fn fetch(&self) -> Vec<Message> {
        match self.try_fetch().await {
            Ok(messages) => {
                if !messages.is_empty() {
                    debug!(endpoint = %self.label, count = messages.len(), "Fetched messages");
                }
                messages
            }
            Err(EndpointError::Transport(e)) => {
                debug!(endpoint = %self.label, error = %e, "Fetch failed, will retry next tick");
                Vec::new()
            }
            Err(e) => {
                warn!(endpoint = %self.label, error = %e, "Fetch failed, will retry next tick");
                Vec::new()
            }
        }
    }

    /// Fetch messages newer than the watermark and advance it.
    ///
    /// Messages are sorted by their raw `ts` string, which orders correctly
    /// only for zero-padded ISO-8601 timestamps. The sort is stable, so
    /// equal timestamps keep the server's order.
    pub async fn try_fetch(&self) -> Result<Vec<Message>, EndpointError> {
        let url = self.resource_url(FETCH_RESOURCE);

        let mut request = self.http.client.get(&url);
        if let Some(since) = self.watermark() {
            request = request.query(&[(SINCE_PARAM, since.as_str())]);
        }

        let resp = request.send().await.map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProtocolError::Status(status.as_u16()).into());
        }

        let envelope: MessagesEnvelope = resp.json().await.map_err(body_error)?;
        let mut messages = envelope.messages;
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        if let Some(last_id) = messages.last().and_then(|m| m.id.clone()) {
            *self.lock_watermark() = Some(last_id);
        }

        Ok(messages)
    }
}

/// Trim `location`, enforce exactly one trailing `/` and check that the
/// result is an absolute http(s) URL with neither query nor fragment.
pub fn normalize_location(location: &str) -> Result<String, ValidationError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLocation);
    }

    let normalized = format!("{}/", trimmed.trim_end_matches('/'));
    let url = Url::parse(&normalized)
        .map_err(|e| ValidationError::InvalidLocation(format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidLocation(format!(
            "{trimmed}: unsupported scheme {}",
            url.scheme()
        )));
    }

    // Resource names are appended to the location, so anything after the
    // path would swallow them.
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::InvalidLocation(format!(
            "{trimmed}: query and fragment are not allowed"
        )));
    }

    Ok(normalized)
}

fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

fn body_error(e: reqwest::Error) -> EndpointError {
    if e.is_decode() {
        ProtocolError::MalformedBody(e.to_string()).into()
    } else {
        transport_error(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn http() -> HttpContext {
        HttpContext::new(&EndpointConfig::default()).unwrap()
    }

    fn endpoint_for(server: &mockito::Server) -> Endpoint {
        Endpoint::new(&http(), &server.url(), Some("test")).unwrap()
    }

    fn ids(messages: &[Message]) -> Vec<String> {
        messages
            .iter()
            .map(|m| m.id.as_ref().map(|i| i.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(
            normalize_location("  http://chat.example.com/room ").unwrap(),
            "http://chat.example.com/room/"
        );
        assert_eq!(
            normalize_location("http://chat.example.com/room///").unwrap(),
            "http://chat.example.com/room/"
        );
    }

    #[test]
    fn test_normalize_location_rejects_garbage() {
        assert_eq!(normalize_location("   "), Err(ValidationError::EmptyLocation));
        assert!(matches!(
            normalize_location("not a url"),
            Err(ValidationError::InvalidLocation(_))
        ));
        assert!(matches!(
            normalize_location("ftp://example.com"),
            Err(ValidationError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_normalize_location_rejects_query_and_fragment() {
        for location in [
            "http://chat.example.com/?room=1",
            "http://chat.example.com/room?",
            "http://chat.example.com/room#top",
        ] {
            assert!(
                matches!(
                    normalize_location(location),
                    Err(ValidationError::InvalidLocation(_))
                ),
                "{location} should be rejected"
            );
        }
        // `=` in the path is fine.
        assert_eq!(
            normalize_location("http://chat.example.com/room=1").unwrap(),
            "http://chat.example.com/room=1/"
        );
    }

    #[test]
    fn test_label_defaults_to_location() {
        let ep = Endpoint::new(&http(), "http://example.com", None).unwrap();
        assert_eq!(ep.label(), "http://example.com/");

        let ep = Endpoint::new(&http(), "http://example.com", Some("  ")).unwrap();
        assert_eq!(ep.label(), "http://example.com/");

        let ep = Endpoint::new(&http(), "http://example.com", Some("lobby")).unwrap();
        assert_eq!(ep.label(), "lobby");
        assert!(ep.watermark().is_none());
    }

    #[test]
    fn test_resource_suffix() {
        let ctx = HttpContext::new(&EndpointConfig {
            resource_suffix: ".php".into(),
            ..EndpointConfig::default()
        })
        .unwrap();
        let ep = Endpoint::new(&ctx, "http://example.com/chat", None).unwrap();
        assert_eq!(
            ep.resource_url(POST_RESOURCE),
            "http://example.com/chat/post_message.php"
        );
    }

    #[tokio::test]
    async fn test_fetch_sorts_and_sets_watermark() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "messages": [
                        { "id": 1, "pseudo": "a", "message": "late", "ts": "2024-01-01T10:00:00" },
                        { "id": 2, "pseudo": "b", "message": "early", "ts": "2024-01-01T09:00:00" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        let messages = ep.try_fetch().await.unwrap();

        assert_eq!(ids(&messages), vec!["2", "1"]);
        assert_eq!(ep.watermark(), Some(MessageId::from("1")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_sends_since_id_after_first_batch() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "messages": [{ "id": "m5", "ts": "2024-01-01T10:00:00" }] }).to_string())
            .expect(1)
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        assert_eq!(ep.fetch().await.len(), 1);
        first.assert_async().await;
        first.remove_async().await;

        let second = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::UrlEncoded("since_id".into(), "m5".into()))
            .with_status(200)
            .with_body(json!({ "messages": [] }).to_string())
            .expect(1)
            .create_async()
            .await;

        assert!(ep.fetch().await.is_empty());
        second.assert_async().await;
        // An empty batch keeps the previous watermark.
        assert_eq!(ep.watermark(), Some(MessageId::from("m5")));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_watermark() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "messages": [{ "id": 3, "ts": "2024-01-01T10:00:00" }] }).to_string())
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        ep.fetch().await;
        assert_eq!(ep.watermark(), Some(MessageId::from("3")));
        ok.remove_async().await;

        let _err = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        assert_eq!(
            ep.try_fetch().await,
            Err(EndpointError::Protocol(ProtocolError::Status(500)))
        );
        assert!(ep.fetch().await.is_empty());
        assert_eq!(ep.watermark(), Some(MessageId::from("3")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        assert!(matches!(
            ep.try_fetch().await,
            Err(EndpointError::Protocol(ProtocolError::MalformedBody(_)))
        ));
        assert!(ep.watermark().is_none());
    }

    #[tokio::test]
    async fn test_fetch_last_message_without_id_keeps_watermark() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/get_messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "messages": [
                        { "id": 4, "ts": "2024-01-01T08:00:00" },
                        { "ts": "2024-01-01T09:00:00" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        assert_eq!(ep.fetch().await.len(), 2);
        assert!(ep.watermark().is_none());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_transport_error() {
        let ep = Endpoint::new(&http(), "http://127.0.0.1:1/", None).unwrap();
        assert!(matches!(ep.try_fetch().await, Err(EndpointError::Transport(_))));
        assert!(ep.fetch().await.is_empty());
        assert!(ep.watermark().is_none());
    }

    #[tokio::test]
    async fn test_post_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/post_message")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pseudo".into(), "alice".into()),
                Matcher::UrlEncoded("message".into(), "hello world".into()),
                Matcher::UrlEncoded("server".into(), "test".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        assert!(ep.post("alice", "hello world").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_remote_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/post_message")
            .with_status(200)
            .with_body(r#"{"success":false}"#)
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        assert_eq!(
            ep.try_post("alice", "hi").await,
            Err(EndpointError::Protocol(ProtocolError::Rejected))
        );
        assert!(!ep.post("alice", "hi").await);
    }

    #[tokio::test]
    async fn test_post_missing_success_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/post_message")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        assert!(!endpoint_for(&server).post("alice", "hi").await);
    }

    #[tokio::test]
    async fn test_post_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/post_message")
            .with_status(503)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let ep = endpoint_for(&server);
        assert_eq!(
            ep.try_post("alice", "hi").await,
            Err(EndpointError::Protocol(ProtocolError::Status(503)))
        );
        assert!(!ep.post("alice", "hi").await);
    }

    #[tokio::test]
    async fn test_post_unreachable() {
        let ep = Endpoint::new(&http(), "http://127.0.0.1:1/", None).unwrap();
        assert!(!ep.post("alice", "hi").await);
    }
}
