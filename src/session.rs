//! Conversation history and the seam to the remote model.
//!
//! A [`ChatSession`] is owned by exactly one party at a time: the
//! [`SessionHolder`] while the UI is idle, or the request worker while a
//! message is in flight. The worker hands it back together with the reply.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Remote generative model. Given the full conversation, ending with the new
/// user turn, returns the reply text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate(&self, contents: &[Turn]) -> Result<String, RequestError>;
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn turn_count(&self) -> usize {
        self.history().len()
    }

    /// Send one user turn. History grows by the user turn and the reply only
    /// when the call succeeds.
    pub async fn send(&mut self, text: &str) -> Result<String, RequestError> {
        let mut contents = self.history.clone();
        contents.push(Turn::user(text));

        let reply = self.backend.generate(&contents).await?;

        self.history = contents;
        self.history.push(Turn::model(reply.clone()));
        Ok(reply)
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("turns", &self.history.len())
            .finish()
    }
}

pub struct SessionHolder {
    backend: Arc<dyn ChatBackend>,
    live: Option<ChatSession>,
}

impl SessionHolder {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let live = Some(ChatSession::new(backend.clone()));
        Self { backend, live }
    }

    /// Discard the current history and start an empty one.
    pub fn reset(&mut self) {
        self.live = Some(ChatSession::new(self.backend.clone()));
    }

    /// The live session, or `None` while a worker has it checked out.
    pub fn current(&self) -> Option<&ChatSession> {
        self.live.as_ref()
    }

    pub fn checkout(&mut self) -> Option<ChatSession> {
        self.live.take()
    }

    pub fn restore(&mut self, session: ChatSession) {
        if self.live.is_some() {
            tracing::warn!("restoring a session while another is live; keeping the returned one");
        }
        self.live = Some(session);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replies from a script and records every conversation it was sent.
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, RequestError>>>,
        pub seen: Mutex<Vec<Vec<Turn>>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: Vec<Result<String, RequestError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        pub fn last_contents(&self) -> Vec<Turn> {
            self.seen.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn generate(&self, contents: &[Turn]) -> Result<String, RequestError> {
            self.seen.lock().unwrap().push(contents.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    let last = contents.last().map(|t| t.text.as_str()).unwrap_or("");
                    Ok(format!("echo: {}", last))
                })
        }
    }

    pub fn network_down() -> RequestError {
        RequestError::Worker("connection refused".into())
    }
}
