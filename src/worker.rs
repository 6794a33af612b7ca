use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::RequestError;
use crate::session::ChatSession;
use crate::tui::AppEvent;

/// Result of one request, delivered to the UI loop. Carries the session back
/// so the UI can check it in again.
#[derive(Debug)]
pub struct Completion {
    pub session: ChatSession,
    pub outcome: Result<String, RequestError>,
}

/// Run one send on a tokio task and post the outcome to `events`.
///
/// The task never fails: backend errors and panics both become a
/// `RequestError` in the posted `Completion`.
pub fn spawn_request(
    mut session: ChatSession,
    text: String,
    events: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = std::time::Instant::now();
        let outcome = match AssertUnwindSafe(session.send(&text)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(RequestError::Worker(panic_message(panic.as_ref()))),
        };

        match &outcome {
            Ok(reply) => tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                reply_chars = reply.chars().count(),
                "request completed"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "request failed"
            ),
        }

        if events
            .send(AppEvent::Reply(Completion { session, outcome }))
            .is_err()
        {
            tracing::debug!("UI loop gone; dropping reply");
        }
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "request task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::session::testing::{network_down, ScriptedBackend};
    use crate::session::{ChatBackend, Turn};

    async fn next_completion(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Completion {
        match rx.recv().await {
            Some(AppEvent::Reply(completion)) => completion,
            other => panic!("expected a reply event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_posts_reply_and_extended_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = ChatSession::new(ScriptedBackend::new(vec![Ok("Hi!".into())]));

        spawn_request(session, "Hello".into(), tx).await.unwrap();

        let completion = next_completion(&mut rx).await;
        assert_eq!(completion.outcome.unwrap(), "Hi!");
        assert_eq!(completion.session.turn_count(), 2);
    }

    #[tokio::test]
    async fn failure_posts_error_and_unchanged_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = ChatSession::new(ScriptedBackend::new(vec![Err(network_down())]));

        spawn_request(session, "Hello".into(), tx).await.unwrap();

        let completion = next_completion(&mut rx).await;
        assert!(completion.outcome.is_err());
        assert_eq!(completion.session.turn_count(), 0);
    }

    struct PanickingBackend;

    #[async_trait]
    impl ChatBackend for PanickingBackend {
        async fn generate(&self, _contents: &[Turn]) -> Result<String, RequestError> {
            panic!("backend exploded")
        }
    }

    #[tokio::test]
    async fn panic_in_backend_is_reported_not_propagated() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = ChatSession::new(Arc::new(PanickingBackend));

        // the task itself must finish cleanly
        spawn_request(session, "Hello".into(), tx).await.unwrap();

        let completion = next_completion(&mut rx).await;
        let err = completion.outcome.unwrap_err();
        assert!(matches!(err, RequestError::Worker(_)));
        assert!(err.to_string().contains("backend exploded"));
    }
}
