//! Server management intents.

use blob_shared::{SystemEvent, ValidationError};

use super::report;
use crate::state::Session;

pub async fn add_endpoint(session: &mut Session, location: &str, label: Option<&str>) {
    if let Err(e) = session.add_endpoint(location, label).await {
        report(session, e).await;
    }
}

pub async fn select_endpoint(session: &mut Session, index: usize) {
    if let Err(e) = session.select_endpoint(index).await {
        report(session, e).await;
    }
}

pub async fn remove_endpoint(session: &mut Session, index: usize) {
    if let Err(e) = session.remove_endpoint(index).await {
        report(session, e).await;
    }
}

pub async fn list_endpoints(session: &Session) {
    let endpoints = session.endpoints();
    if endpoints.is_empty() {
        report(session, ValidationError::NoEndpoints).await;
        return;
    }

    for ep in endpoints {
        let marker = if ep.active { " *" } else { "" };
        session
            .notify(SystemEvent::info(format!(
                "{}) {} ({}){marker}",
                ep.index, ep.label, ep.location
            )))
            .await;
    }
}
