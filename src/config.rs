use std::path::PathBuf;
use std::time::Duration;

use crate::error::StartupError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const MODEL_VAR: &str = "GEMINI_MODEL";
const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
const TIMEOUT_VAR: &str = "GEMINI_REQUEST_TIMEOUT_SECS";
const LOG_VAR: &str = "GEMINI_CHAT_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// `None` keeps requests unbounded.
    pub request_timeout: Option<Duration>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load settings from the process environment, after merging a `.env`
    /// file from the working directory if one exists. Variables already set
    /// in the environment take precedence over the file.
    pub fn load() -> Result<Self, StartupError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(StartupError::Configuration(format!(
                    "could not read .env file: {}",
                    e
                )))
            }
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = non_empty(API_KEY_VAR).ok_or_else(|| {
            StartupError::Configuration(format!(
                "Please set your {} in the environment or a .env file.",
                API_KEY_VAR
            ))
        })?;

        let request_timeout = match non_empty(TIMEOUT_VAR) {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    StartupError::Configuration(format!(
                        "{} must be a whole number of seconds, got {:?}",
                        TIMEOUT_VAR, raw
                    ))
                })?;
                // zero means "no timeout", same as leaving it unset
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self {
            api_key,
            model: non_empty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty(BASE_URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
            log_file: non_empty(LOG_VAR).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, StartupError::Configuration(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, StartupError::Configuration(_)));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn optional_settings_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta/"),
            ("GEMINI_REQUEST_TIMEOUT_SECS", "30"),
            ("GEMINI_CHAT_LOG", "/tmp/chat.log"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/chat.log")));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GEMINI_REQUEST_TIMEOUT_SECS"));
    }
}
