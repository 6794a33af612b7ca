use thiserror::Error;

/// Failures that stop the client before the terminal UI is started.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to initialize Gemini client: {0}")]
    Initialization(String),
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Configuration(_) => 1,
            StartupError::Initialization(_) => 2,
        }
    }

    /// Heading shown above the message on stderr.
    pub fn title(&self) -> &'static str {
        match self {
            StartupError::Configuration(_) => "API Key Required",
            StartupError::Initialization(_) => "API Error",
        }
    }
}

/// A failed chat request. Always recoverable: it is shown in the transcript
/// and the user may send again.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Gemini returned no text ({0})")]
    EmptyReply(String),

    #[error("request worker failed: {0}")]
    Worker(String),
}
