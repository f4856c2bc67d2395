//! OpenRouter chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::models::max_tokens_for_model;
use super::prompt::{build_system_prompt, build_user_prompt};
use super::{GenerationError, GenerationInvoker};
use crate::config::UpstreamConfig;
use crate::types::{PromptContext, TelemetrySample};

/// Referer sent with every request, identifying the app to OpenRouter.
const HTTP_REFERER: &str = "https://joggps.app";

/// Longest upstream error body kept for logging.
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

// ============================================================================
// Client
// ============================================================================

/// OpenRouter-backed generation invoker
#[derive(Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    temperature: f64,
    top_p: f64,
    app_title: String,
    timeout: Duration,
}

impl OpenRouterClient {
    /// Build a client from upstream config. A missing API key is allowed;
    /// every `generate` call then fails with `NotConfigured`.
    pub fn new(config: &UpstreamConfig) -> Result<Self, GenerationError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("OPENROUTER_API_KEY not set, coaching will use fallback messages");
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: config.default_model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            app_title: config.app_title.clone(),
            timeout,
        })
    }

    /// Model used for this sample: the runner's selection, else the default.
    fn model_for<'a>(&'a self, sample: &'a TelemetrySample) -> &'a str {
        sample
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model)
    }

    fn build_request<'a>(
        &self,
        model: &'a str,
        system: &'a str,
        user: &'a str,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            max_tokens: max_tokens_for_model(model),
            temperature: self.temperature,
            top_p: self.top_p,
            stream: false,
        }
    }
}

/// First choice's content, trimmed. Blank counts as no content.
fn extract_message(response: ChatCompletionResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(GenerationError::EmptyContent)
}

#[async_trait]
impl GenerationInvoker for OpenRouterClient {
    async fn generate(
        &self,
        sample: &TelemetrySample,
        ctx: &PromptContext,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let model = self.model_for(sample);
        let system = build_system_prompt(ctx.training_goal.as_ref());
        let user = build_user_prompt(sample, ctx);
        let body = self.build_request(model, &system, &user);

        debug!(model = %model, max_tokens = body.max_tokens, "Calling OpenRouter");
        let start = Instant::now();

        let timeout = self.timeout;
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                GenerationError::Timeout(timeout)
            } else {
                GenerationError::Http(e)
            }
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await
            .map_err(map_err)?;

        let status = resp.status();
        if !status.is_success() {
            let mut text = resp.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| text.is_char_boundary(*i))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatCompletionResponse = resp.json().await.map_err(map_err)?;
        let tokens = parsed.usage.as_ref().and_then(|u| u.total_tokens);
        let message = extract_message(parsed)?;

        info!(
            model = %model,
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            tokens = ?tokens,
            "Coaching message generated"
        );
        Ok(message)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn backend_name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> UpstreamConfig {
        UpstreamConfig {
            api_key: api_key.map(str::to_string),
            ..UpstreamConfig::default()
        }
    }

    fn sample(model: Option<&str>) -> TelemetrySample {
        TelemetrySample {
            device_id: "d1".to_string(),
            distance: 1000.0,
            duration_ms: 300_000,
            avg_pace: 300.0,
            avg_heart_rate: None,
            model: model.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = OpenRouterClient::new(&config(None)).unwrap();
        assert!(!client.is_configured());
        let err = client
            .generate(&sample(None), &PromptContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NotConfigured));
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let client = OpenRouterClient::new(&config(Some("  "))).unwrap();
        assert!(!client.is_configured());
        assert_eq!(client.backend_name(), "openrouter");
    }

    #[test]
    fn test_model_selection() {
        let client = OpenRouterClient::new(&config(Some("k"))).unwrap();
        assert_eq!(client.model_for(&sample(None)), "openai/gpt-4.1-nano");
        assert_eq!(client.model_for(&sample(Some(""))), "openai/gpt-4.1-nano");
        assert_eq!(client.model_for(&sample(Some("openai/gpt-5-mini"))), "openai/gpt-5-mini");
    }

    #[test]
    fn test_request_body_shape() {
        let client = OpenRouterClient::new(&config(Some("k"))).unwrap();
        let body = client.build_request("openai/gpt-5-nano", "sys", "usr");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "openai/gpt-5-nano");
        assert_eq!(json["max_tokens"], 2500);
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert!((json["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_extract_message() {
        let ok: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  Keep it steady!  "}}],"usage":{"total_tokens":42}}"#,
        )
        .unwrap();
        assert_eq!(extract_message(ok).unwrap(), "Keep it steady!");

        for raw in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
        ] {
            let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
            assert!(matches!(
                extract_message(parsed),
                Err(GenerationError::EmptyContent)
            ));
        }
    }
}
