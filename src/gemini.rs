use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{RequestError, StartupError};
use crate::session::{ChatBackend, Turn, TurnRole};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        if config.model.is_empty() || config.model.contains('/') {
            return Err(StartupError::Initialization(format!(
                "invalid model name {:?}",
                config.model
            )));
        }

        let endpoint = format!("{}/models/{}:generateContent", config.base_url, config.model);
        reqwest::Url::parse(&endpoint).map_err(|e| {
            StartupError::Initialization(format!("invalid endpoint {}: {}", endpoint, e))
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StartupError::Initialization(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn generate(&self, contents: &[Turn]) -> Result<String, RequestError> {
        let body = request_body(contents);
        tracing::debug!(turns = contents.len(), "sending generateContent request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Gemini request failed");
            return Err(api_error(status.as_u16(), &text));
        }

        parse_reply(&text)
    }
}

fn request_body(contents: &[Turn]) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: contents
            .iter()
            .map(|turn| Content {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                },
                parts: [Part { text: &turn.text }],
            })
            .collect(),
    }
}

fn api_error(status: u16, body: &str) -> RequestError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    RequestError::Api { status, message }
}

fn parse_reply(body: &str) -> Result<String, RequestError> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(RequestError::EmptyReply(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason: {}", r))
            .unwrap_or_else(|| "empty candidate".to_string());
        return Err(RequestError::EmptyReply(reason));
    }

    Ok(text)
}
