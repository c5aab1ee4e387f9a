//! Anthropic Messages API provider.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rehearse_core::traits::{
    GenerateRequest, GenerateResponse, GenerationProvider, ModelInfo, TokenUsage,
    DEFAULT_SYSTEM_PROMPT,
};

use crate::http;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Anthropic API provider.
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: http::client(DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
    model: String,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
}

#[async_trait]
impl GenerationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request
                .system_prompt
                .as_deref()
                .unwrap_or(DEFAULT_SYSTEM_PROMPT),
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| http::transport_failure(e, DEFAULT_TIMEOUT_SECS))?;

        let response = http::check_status(response, &request.model, error_message).await?;
        let api_response: MessagesResponse =
            response.json().await.map_err(http::malformed_body)?;

        // A reply may be split across several text blocks.
        let content: String = api_response
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect();

        let usage = api_response.usage;
        // Claude Sonnet pricing: $3/$15 per 1M tokens
        let estimated_cost =
            (usage.input_tokens as f64 * 3.0 + usage.output_tokens as f64 * 15.0) / 1_000_000.0;

        Ok(GenerateResponse {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                total_tokens: usage.input_tokens + usage.output_tokens,
                estimated_cost_usd: estimated_cost,
            },
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "claude-sonnet-4-20250514".into(),
                name: "Claude Sonnet 4".into(),
                provider: "anthropic".into(),
                max_context: 200_000,
                cost_per_1k_input: 0.003,
                cost_per_1k_output: 0.015,
            },
            ModelInfo {
                id: "claude-haiku-4-5-20251001".into(),
                name: "Claude Haiku 4.5".into(),
                provider: "anthropic".into(),
                max_context: 200_000,
                cost_per_1k_input: 0.0008,
                cost_per_1k_output: 0.004,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehearse_core::error::GenerationFailure;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "claude-sonnet-4-20250514".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [{"type": "text", "text": "Question: What is a stack?\nModel Answer: LIFO."}],
            "model": "claude-sonnet-4-20250514",
            "usage": {"input_tokens": 50, "output_tokens": 20}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(serde_json::json!({
                "system": DEFAULT_SYSTEM_PROMPT,
                "messages": [{"role": "user", "content": "Ask about stacks"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("test-key", Some(server.uri())).unwrap();
        let response = provider.generate(&request("Ask about stacks")).await.unwrap();

        assert!(response.content.starts_with("Question: What is a stack?"));
        assert_eq!(response.token_usage.total_tokens, 70);
        assert!(response.token_usage.estimated_cost_usd > 0.0);
    }

    #[tokio::test]
    async fn text_blocks_are_joined() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [
                {"type": "text", "text": "Question: one\n"},
                {"type": "text", "text": "Model Answer: two"}
            ],
            "model": "claude-sonnet-4-20250514",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("key", Some(server.uri())).unwrap();
        let response = provider.generate(&request("x")).await.unwrap();
        assert_eq!(response.content, "Question: one\nModel Answer: two");
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_hint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "10"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("key", Some(server.uri())).unwrap();
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<GenerationFailure>()
                .and_then(GenerationFailure::retry_after_ms),
            Some(10_000)
        );
    }

    #[tokio::test]
    async fn huge_retry_after_saturates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "99999999999999999"),
            )
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("key", Some(server.uri())).unwrap();
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<GenerationFailure>()
                .and_then(GenerationFailure::retry_after_ms),
            Some(u64::MAX)
        );
    }

    #[tokio::test]
    async fn auth_error_uses_api_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("bad", Some(server.uri())).unwrap();
        let err = provider.generate(&request("x")).await.unwrap_err();
        let failure = err.downcast_ref::<GenerationFailure>().unwrap();
        assert!(failure.is_permanent());
        assert!(failure.to_string().contains("invalid x-api-key"));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("key", Some(server.uri())).unwrap();
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenerationFailure>(),
            Some(GenerationFailure::ApiError { status: 529, .. })
        ));
    }
}
