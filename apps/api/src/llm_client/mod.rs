//! LLM Gateway: the single point of entry for all model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//! All LLM interactions MUST go through `LlmGateway::complete`.
//!
//! The gateway never fails: provider errors, timeouts and a missing API key all
//! turn into `LlmReply::Fallback`, whose text is a schema-shaped JSON object
//! carrying a diagnostic in `summary`. Exactly one attempt is made per call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, LlmCredentials};

pub mod fallback;
pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// What the gateway hands back. Both variants carry text; only the
/// reconciler decides what a fallback means for a given endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmReply {
    Success { text: String },
    Fallback { text: String },
}

impl LlmReply {
    pub fn text(&self) -> &str {
        match self {
            LlmReply::Success { text } | LlmReply::Fallback { text } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LlmReply::Fallback { .. })
    }
}

/// A text-completion backend. Carried by the gateway as `Arc<dyn CompletionProvider>`
/// so tests and alternative vendors can be swapped in without touching handlers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}

#[derive(Clone)]
enum GatewayMode {
    Configured(Arc<dyn CompletionProvider>),
    Unconfigured,
}

#[derive(Clone)]
pub struct LlmGateway {
    mode: GatewayMode,
    timeout: Duration,
}

impl LlmGateway {
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        match &config.llm {
            LlmCredentials::Configured { api_key } => {
                let provider = AnthropicProvider::new(
                    api_key.clone(),
                    config.llm_api_url.clone(),
                    config.llm_timeout,
                )?;
                Ok(Self::with_provider(Arc::new(provider), config.llm_timeout))
            }
            LlmCredentials::Unconfigured => Ok(Self::unconfigured()),
        }
    }

    pub fn with_provider(provider: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self {
            mode: GatewayMode::Configured(provider),
            timeout,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            mode: GatewayMode::Unconfigured,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.mode, GatewayMode::Configured(_))
    }

    /// Sends one prompt. Never returns an error; see the module docs.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> LlmReply {
        let provider = match &self.mode {
            GatewayMode::Configured(provider) => provider,
            GatewayMode::Unconfigured => {
                debug!("LLM gateway unconfigured; returning fallback payload");
                return LlmReply::Fallback {
                    text: fallback::unconfigured_payload(),
                };
            }
        };

        let call = provider.complete(prompt, max_tokens);
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => Err(LlmError::EmptyContent),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LlmError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(text) => {
                debug!(
                    "LLM call succeeded: prompt_chars={}, reply_chars={}",
                    prompt.len(),
                    text.len()
                );
                LlmReply::Success { text }
            }
            Err(e) => {
                warn!("LLM call failed, degrading to fallback: {e}");
                LlmReply::Fallback {
                    text: fallback::provider_failure_payload(&e),
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API provider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    api_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens,
            system: prompts::SYSTEM_PROMPT,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;
        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM usage: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        llm_response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{parse_reply, ParsedReply};
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(reply: Result<&'static str, u16>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(LlmError::Api {
                    status,
                    message: "rate limited".to_string(),
                }),
            }
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl CompletionProvider for SlowProvider {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok("too late".to_string())
        }
    }

    fn summary_of(reply: &LlmReply) -> String {
        match parse_reply(reply.text()) {
            ParsedReply::Valid(map) => map["summary"].as_str().unwrap().to_string(),
            ParsedReply::Invalid { reason } => panic!("fallback was not JSON: {reason}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_returns_fallback() {
        let gateway = LlmGateway::unconfigured();
        assert!(!gateway.is_configured());
        let reply = gateway.complete("prompt", 100).await;
        assert!(reply.is_fallback());
        assert!(summary_of(&reply).contains("not configured"));
    }

    #[tokio::test]
    async fn test_success_passes_text_through() {
        let provider = ScriptedProvider::new(Ok("hello"));
        let gateway = LlmGateway::with_provider(provider.clone(), Duration::from_secs(5));
        let reply = gateway.complete("prompt", 100).await;
        assert_eq!(
            reply,
            LlmReply::Success {
                text: "hello".to_string()
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_error_is_absorbed_without_retry() {
        let provider = ScriptedProvider::new(Err(429));
        let gateway = LlmGateway::with_provider(provider.clone(), Duration::from_secs(5));
        let reply = gateway.complete("prompt", 100).await;
        assert!(reply.is_fallback());
        let summary = summary_of(&reply);
        assert!(summary.contains("429"), "summary was {summary}");
        assert!(summary.contains("rate limited"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_fallback() {
        let gateway =
            LlmGateway::with_provider(ScriptedProvider::new(Ok("  \n")), Duration::from_secs(5));
        let reply = gateway.complete("prompt", 100).await;
        assert!(reply.is_fallback());
        assert!(summary_of(&reply).contains("empty"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_fallback() {
        let gateway = LlmGateway::with_provider(Arc::new(SlowProvider), Duration::from_secs(30));
        let reply = gateway.complete("prompt", 100).await;
        assert!(reply.is_fallback());
        assert!(summary_of(&reply).contains("timed out after 30s"));
    }

    async fn spawn_messages_stub() -> String {
        let app = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("good-key") {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({
                            "type": "error",
                            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
                        })),
                    );
                }
                let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
                (
                    StatusCode::OK,
                    Json(json!({
                        "content": [{"type": "text", "text": format!("echo: {prompt}")}],
                        "usage": {"input_tokens": 3, "output_tokens": 2},
                        "max_tokens_seen": body["max_tokens"]
                    })),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/messages")
    }

    #[tokio::test]
    async fn test_anthropic_provider_success() {
        let url = spawn_messages_stub().await;
        let provider =
            AnthropicProvider::new("good-key".to_string(), url, Duration::from_secs(5)).unwrap();
        let text = provider.complete("hi there", 50).await.unwrap();
        assert_eq!(text, "echo: hi there");
    }

    #[tokio::test]
    async fn test_anthropic_provider_surfaces_api_error_message() {
        let url = spawn_messages_stub().await;
        let provider =
            AnthropicProvider::new("bad-key".to_string(), url, Duration::from_secs(5)).unwrap();
        match provider.complete("hi", 50).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid x-api-key");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gateway_over_http_degrades_on_unauthorized() {
        let url = spawn_messages_stub().await;
        let config = Config {
            llm: LlmCredentials::Configured {
                api_key: "bad-key".to_string(),
            },
            llm_api_url: url,
            ..Config::default()
        };
        let gateway = LlmGateway::from_config(&config).unwrap();
        assert!(gateway.is_configured());
        let reply = gateway.complete("hi", 50).await;
        assert!(reply.is_fallback());
        assert!(summary_of(&reply).contains("status 401"));
    }
}
