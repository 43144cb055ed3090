use blob_shared::{SystemEvent, ValidationError};
use tracing::debug;

use super::report;
use crate::state::Session;

/// Send `body` to the current server, reporting failures on the sink.
/// Blank input is dropped silently.
pub async fn send_message(session: &Session, body: &str) {
    match session.send_current(body).await {
        Ok(true) => debug!("Message delivered"),
        Ok(false) => session.notify(SystemEvent::error("Can't send.")).await,
        Err(ValidationError::EmptyBody) => {}
        Err(e) => report(session, e).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blob_net::{EndpointConfig, HttpContext};
    use tokio::sync::mpsc;

    use crate::commands::{dispatch, Flow, Intent};

    fn session() -> (Session, mpsc::Receiver<blob_shared::SinkEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let http = HttpContext::new(&EndpointConfig::default()).unwrap();
        (Session::new("Guest", http, tx), rx)
    }

    async fn next_line(rx: &mut mpsc::Receiver<blob_shared::SinkEvent>) -> String {
        rx.recv().await.unwrap().to_string()
    }

    #[tokio::test]
    async fn test_send_without_server_reports_error() {
        let (mut session, mut rx) = session();
        let flow = dispatch(&mut session, Intent::Send("hi".into())).await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(next_line(&mut rx).await, "[Error] No server has been selected");
    }

    #[tokio::test]
    async fn test_failed_post_reports_cant_send() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/post_message")
            .with_status(500)
            .create_async()
            .await;

        let (mut session, mut rx) = session();
        dispatch(
            &mut session,
            Intent::AddEndpoint {
                location: server.url(),
                label: Some("local".into()),
            },
        )
        .await;
        assert_eq!(next_line(&mut rx).await, "[System] Current server: local");
        next_line(&mut rx).await;

        dispatch(&mut session, Intent::Send("hi".into())).await;
        assert_eq!(next_line(&mut rx).await, "[Error] Can't send.");
    }

    #[tokio::test]
    async fn test_list_and_invalid_select() {
        let (mut session, mut rx) = session();
        dispatch(&mut session, Intent::ListEndpoints).await;
        assert_eq!(next_line(&mut rx).await, "[Error] No servers available");

        dispatch(
            &mut session,
            Intent::AddEndpoint {
                location: "http://a.example".into(),
                label: Some("a".into()),
            },
        )
        .await;
        next_line(&mut rx).await;
        next_line(&mut rx).await;

        dispatch(&mut session, Intent::SelectEndpoint(3)).await;
        assert_eq!(
            next_line(&mut rx).await,
            "[Error] No server at index 3 (have 1)"
        );

        dispatch(&mut session, Intent::ListEndpoints).await;
        assert_eq!(next_line(&mut rx).await, "[System] 0) a (http://a.example/) *");
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut session, _rx) = session();
        assert_eq!(dispatch(&mut session, Intent::Shutdown).await, Flow::Quit);
    }
}
