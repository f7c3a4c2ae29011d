//! Shared LLM service with two profiles: `fast` and `slow`.
//!
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches provider clients per distinct config.
//! - If the `slow` profile is not provided, it falls back to `fast`.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{LlmRequest, ollama_service::OllamaService, open_ai_service::OpenAiService},
};

pub struct LlmServiceProfiles {
    fast: LlmModelConfig,
    slow: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// - `fast`: classification profile.
    /// - `slow_opt`: insights profile; `None` reuses `fast`.
    /// - `health_timeout_secs`: timeout of the health prober.
    pub fn new(
        fast: LlmModelConfig,
        slow_opt: Option<LlmModelConfig>,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let slow = slow_opt.unwrap_or_else(|| fast.clone());
        Ok(Self {
            fast,
            slow,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    pub async fn generate_fast(&self, req: LlmRequest<'_>) -> Result<String, AiLlmError> {
        self.generate_with(&self.fast, req).await
    }

    pub async fn generate_slow(&self, req: LlmRequest<'_>) -> Result<String, AiLlmError> {
        self.generate_with(&self.slow, req).await
    }

    /// Health snapshot for each distinct profile.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.fast.clone()];
        if self.slow != self.fast {
            list.push(self.slow.clone());
        }
        self.health.check_many(&list).await
    }

    /// `(fast, slow)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.fast, &self.slow)
    }

    /* --------------------- Internals --------------------- */

    async fn generate_with(
        &self,
        cfg: &LlmModelConfig,
        req: LlmRequest<'_>,
    ) -> Result<String, AiLlmError> {
        match cfg.provider {
            LlmProvider::Ollama => self.ollama_client(cfg).await?.generate(req).await,
            LlmProvider::OpenAI => self.openai_client(cfg).await?.generate(req).await,
        }
    }

    async fn ollama_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        debug!(model = %cfg.model, endpoint = %cfg.endpoint, "creating Ollama client");
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn openai_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        debug!(model = %cfg.model, endpoint = %cfg.endpoint, "creating OpenAI client");
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Cache key identifying one client configuration.
///
/// Covers generation options too: a client sends its own config on every request.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
    max_tokens: Option<u32>,
    temperature_bits: Option<u32>,
    top_p_bits: Option<u32>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
            max_tokens: cfg.max_tokens,
            temperature_bits: cfg.temperature.map(f32::to_bits),
            top_p_bits: cfg.top_p.map(f32::to_bits),
        }
    }
}
