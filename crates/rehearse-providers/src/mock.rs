//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use rehearse_core::traits::{
    GenerateRequest, GenerateResponse, GenerationProvider, ModelInfo, TokenUsage,
};

/// A provider that answers from a fixed script without any network calls.
///
/// Rules are checked in the order they were added; the first whose
/// substring occurs in the prompt wins. Unmatched prompts get the default
/// response.
pub struct MockProvider {
    rules: Vec<(String, String)>,
    default_response: String,
    call_count: AtomicU32,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock with prompt-substring → response rules.
    pub fn new<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default_response: String::new(),
            call_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new(Vec::<(String, String)>::new()).with_default(response)
    }

    /// Set the response for prompts no rule matches.
    pub fn with_default(mut self, response: &str) -> Self {
        self.default_response = response.to_string();
        self
    }

    /// Add a rule after the existing ones.
    pub fn on(mut self, prompt_contains: &str, response: &str) -> Self {
        self.rules
            .push((prompt_contains.to_string(), response.to_string()));
        self
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests().pop()
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }

        let content = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());

        // Rough estimate: four bytes per token.
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
        }]
    }
}
