use super::report;
use crate::state::Session;

pub async fn set_display_name(session: &mut Session, name: &str) {
    if let Err(e) = session.set_display_name(name).await {
        report(session, e).await;
    }
}
