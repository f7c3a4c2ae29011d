use crate::config::llm_provider::LlmProvider;

/// Configuration for one LLM model invocation profile.
///
/// - `provider`: which backend serves the model.
/// - `model`: model identifier (`"qwen3:14b"`, `"gpt-4o-mini"`).
/// - `endpoint`: base URL; clients append their API paths.
/// - `api_key`: required by OpenAI, unused by Ollama.
/// - `max_tokens`, `temperature`, `top_p`: generation options, when supported.
/// - `timeout_secs`: HTTP client timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}
