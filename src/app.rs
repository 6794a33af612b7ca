use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::session::SessionHolder;
use crate::transcript::{Message, Transcript};
use crate::tui::AppEvent;
use crate::worker::{self, Completion};

pub const STATUS_READY: &str = "✅ Ready - Type your message and press Enter";
pub const STATUS_THINKING: &str = "🔍 Gemini is thinking";
pub const STATUS_ERROR: &str = "❌ Error occurred";
pub const STATUS_CLEARED: &str = "✅ Chat cleared. Ready for a new conversation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Sending,
    Error,
}

/// The one-line status bar. Last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    text: String,
}

impl StatusLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

pub struct App {
    pub should_quit: bool,
    pub phase: Phase,
    pub status: StatusLine,
    pub transcript: Transcript,
    pub model: String,

    // Input line
    pub input: String,
    pub input_cursor: usize, // cursor position in chars
    pub send_enabled: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_button_area: Option<Rect>,
    pub clear_button_area: Option<Rect>,

    sessions: SessionHolder,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(sessions: SessionHolder, events: UnboundedSender<AppEvent>, model: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            phase: Phase::Ready,
            status: StatusLine::new(STATUS_READY),
            transcript: Transcript::new(),
            model: model.into(),

            input: String::new(),
            input_cursor: 0,
            send_enabled: true,

            animation_frame: 0,

            chat_area: None,
            send_button_area: None,
            clear_button_area: None,

            sessions,
            events,
        }
    }

    /// Send the input line. Inert when the trimmed text is empty or a
    /// request is already in flight.
    pub fn submit(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() || !self.send_enabled {
            return;
        }
        let Some(session) = self.sessions.checkout() else {
            tracing::warn!("send control enabled but session is checked out");
            return;
        };

        self.input.clear();
        self.input_cursor = 0;
        self.transcript.append(Message::user(text.clone()));
        self.send_enabled = false;
        self.phase = Phase::Sending;
        self.animation_frame = 0;
        self.status.set(STATUS_THINKING);

        tracing::info!(chars = text.chars().count(), turns = session.turn_count(), "dispatching request");
        worker::spawn_request(session, text, self.events.clone());
    }

    /// Apply a finished request on the UI loop.
    pub fn complete(&mut self, completion: Completion) {
        let Completion { session, outcome } = completion;
        self.sessions.restore(session);

        match outcome {
            Ok(reply) => {
                self.transcript.append(Message::assistant(reply));
                self.phase = Phase::Ready;
                self.status.set(STATUS_READY);
            }
            Err(e) => {
                self.transcript.append(Message::system_error(format!("Error: {}", e)));
                self.phase = Phase::Error;
                self.status.set(STATUS_ERROR);
            }
        }
        self.send_enabled = true;
        tracing::debug!(messages = self.transcript.len(), phase = ?self.phase, "request applied");
    }

    /// Drop the transcript and start a fresh conversation. Ignored while a
    /// request is in flight.
    pub fn clear(&mut self) {
        if self.phase == Phase::Sending {
            tracing::debug!("clear ignored while a request is in flight");
            return;
        }

        self.transcript.clear();
        self.sessions.reset();
        self.phase = Phase::Ready;
        self.status.set(STATUS_CLEARED);
        tracing::info!("conversation cleared");
    }

    /// Status text as displayed, including the thinking animation.
    pub fn status_text(&self) -> String {
        if self.phase == Phase::Sending {
            // Animated ellipsis: cycles through ".", "..", "..."
            format!("{}{}", self.status.text(), ".".repeat(self.animation_frame as usize + 1))
        } else {
            self.status.text().to_string()
        }
    }

    pub fn tick_animation(&mut self) {
        if self.phase == Phase::Sending {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Turns in the live conversation; `None` while a request holds it.
    pub fn session_turns(&self) -> Option<usize> {
        self.sessions.current().map(|s| s.turn_count())
    }
}
