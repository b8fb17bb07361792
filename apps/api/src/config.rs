use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_LLM_API_URL: &str = "https://api.anthropic.com/v1/messages";

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Whether an LLM provider credential is available.
/// `Unconfigured` is a supported mode: every capability degrades to heuristic-only output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmCredentials {
    Configured { api_key: String },
    Unconfigured,
}

impl LlmCredentials {
    /// Blank or missing keys are treated as `Unconfigured`.
    pub fn from_key(key: Option<String>) -> Self {
        match key {
            Some(api_key) if !api_key.trim().is_empty() => LlmCredentials::Configured {
                api_key: api_key.trim().to_string(),
            },
            _ => LlmCredentials::Unconfigured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Application configuration loaded from environment variables.
/// Nothing here is required: a missing API key only switches the LLM gateway to fallback mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmCredentials,
    pub llm_api_url: String,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
    pub environment: Environment,
    /// Cap for bodies buffered in memory (JSON, urlencoded).
    pub max_body_bytes: usize,
    /// Cap for each uploaded file; multipart bodies may carry a full batch of these.
    pub max_upload_file_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm: LlmCredentials::from_key(std::env::var("ANTHROPIC_API_KEY").ok()),
            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string()),
            llm_timeout: Duration::from_secs(
                parse_env("LLM_TIMEOUT_SECS", 30).context("LLM_TIMEOUT_SECS must be a number")?,
            ),
            port: parse_env("PORT", 5000).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            environment: Environment::parse(
                &std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            ),
            max_body_bytes: parse_env("MAX_BODY_BYTES", DEFAULT_BODY_LIMIT)
                .context("MAX_BODY_BYTES must be a number of bytes")?,
            max_upload_file_bytes: parse_env("MAX_UPLOAD_FILE_BYTES", DEFAULT_BODY_LIMIT)
                .context("MAX_UPLOAD_FILE_BYTES must be a number of bytes")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            llm: LlmCredentials::Unconfigured,
            llm_api_url: DEFAULT_LLM_API_URL.to_string(),
            llm_timeout: Duration::from_secs(30),
            port: 5000,
            rust_log: "info".to_string(),
            environment: Environment::Development,
            max_body_bytes: DEFAULT_BODY_LIMIT,
            max_upload_file_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unconfigured() {
        assert_eq!(LlmCredentials::from_key(None), LlmCredentials::Unconfigured);
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        assert_eq!(
            LlmCredentials::from_key(Some("   ".to_string())),
            LlmCredentials::Unconfigured
        );
    }

    #[test]
    fn test_key_is_trimmed() {
        assert_eq!(
            LlmCredentials::from_key(Some(" sk-test \n".to_string())),
            LlmCredentials::Configured {
                api_key: "sk-test".to_string()
            }
        );
    }

    #[test]
    fn test_environment_parse() {
        assert!(Environment::parse("Production").is_production());
        assert!(!Environment::parse("staging").is_production());
        assert!(!Environment::parse("").is_production());
    }
}
