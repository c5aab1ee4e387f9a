//! Ollama (local model) provider.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rehearse_core::error::GenerationFailure;
use rehearse_core::traits::{
    GenerateRequest, GenerateResponse, GenerationProvider, ModelInfo, TokenUsage,
    DEFAULT_SYSTEM_PROMPT,
};

use crate::http;

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // local models are slower

/// Ollama local LLM provider.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim_end_matches('/')
        };

        Ok(Self {
            base_url: base.to_string(),
            client: http::client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    fn unreachable(&self) -> GenerationFailure {
        GenerationFailure::NetworkError(format!(
            "Ollama not reachable at {}. Is it running? Start with: ollama serve",
            self.base_url
        ))
    }

    /// Fetch the models pulled into the local Ollama instance.
    pub async fn list_models_async(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| self.unreachable())?;
        let response = http::check_status(response, "", |_| None).await?;
        let tags: TagsResponse = response.json().await.map_err(http::malformed_body)?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                provider: "ollama".into(),
                max_context: 0,
                cost_per_1k_input: 0.0,
                cost_per_1k_output: 0.0,
            })
            .collect())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct Options {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request
                        .system_prompt
                        .as_deref()
                        .unwrap_or(DEFAULT_SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            stream: false,
            options: Options {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    self.unreachable()
                } else {
                    http::transport_failure(e, DEFAULT_TIMEOUT_SECS)
                }
            })?;

        let response = match http::check_status(response, &request.model, |_| None).await {
            Ok(response) => response,
            Err(GenerationFailure::ModelNotFound(model)) => {
                return Err(GenerationFailure::ModelNotFound(format!(
                    "'{model}' is not available locally. Pull it with: ollama pull {model}"
                ))
                .into())
            }
            Err(other) => return Err(other.into()),
        };
        let api_response: ChatResponse = response.json().await.map_err(http::malformed_body)?;

        let prompt_tokens = api_response.prompt_eval_count.unwrap_or(0);
        let completion_tokens = api_response.eval_count.unwrap_or(0);

        Ok(GenerateResponse {
            content: api_response.message.content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        // Local models can only be discovered over HTTP; see `list_models_async`.
        vec![]
    }
}
