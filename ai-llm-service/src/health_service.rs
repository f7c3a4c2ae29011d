//! Health probes for LLM backends.
//!
//! - Ollama: `GET {endpoint}/api/tags`, model looked up in `models[].name`
//! - OpenAI: `GET {endpoint}/v1/models` with bearer auth, model looked up in `data[].id`
//!
//! [`HealthService::check`] never fails; errors become `ok = false` so the
//! result can go straight into the `/health` answer.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// Serializable health snapshot for one profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: cfg.provider.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Deserialize)]
struct OllamaTag {
    name: String,
}

#[derive(Deserialize)]
struct OpenAiModels {
    #[serde(default)]
    data: Vec<OpenAiModel>,
}

#[derive(Deserialize)]
struct OpenAiModel {
    id: String,
}

/// Health checker reusing one HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthService {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// Probes one config; any failure is reported as `ok = false`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.probe_openai(cfg).await,
        };
        let latency = start.elapsed().as_millis();

        match result {
            Ok((true, msg)) => {
                info!(provider = %cfg.provider, model = %cfg.model, latency_ms = latency, "health probe ok");
                HealthStatus::new(cfg, true, latency, msg)
            }
            Ok((false, msg)) => {
                warn!(provider = %cfg.provider, model = %cfg.model, latency_ms = latency, "{msg}");
                HealthStatus::new(cfg, false, latency, msg)
            }
            Err(err) => {
                warn!(provider = %cfg.provider, model = %cfg.model, latency_ms = latency, error = %err, "health probe failed");
                HealthStatus::new(cfg, false, latency, err.to_string())
            }
        }
    }

    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        let url = probe_url(cfg, "api/tags")?;
        let body = self.get_ok(&url, None).await?;
        Ok(match serde_json::from_str::<OllamaTags>(&body) {
            Ok(tags) if tags.models.iter().any(|m| m.name == cfg.model) => {
                (true, "Ollama is healthy; model is available".into())
            }
            Ok(_) => (false, "Ollama is up, but model not found in /api/tags".into()),
            Err(e) => (true, format!("Ollama is reachable; failed to decode /api/tags: {e}")),
        })
    }

    async fn probe_openai(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        let url = probe_url(cfg, "v1/models")?;
        let key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;
        let body = self.get_ok(&url, Some(key)).await?;
        Ok(match serde_json::from_str::<OpenAiModels>(&body) {
            Ok(models) if models.data.iter().any(|m| m.id == cfg.model) => {
                (true, "OpenAI is healthy; model is available".into())
            }
            Ok(_) => (false, "OpenAI is up, but model not found in /v1/models".into()),
            Err(e) => (true, format!("OpenAI is reachable; failed to decode /v1/models: {e}")),
        })
    }

    /// GET `url` and return the body of a 2xx answer.
    async fn get_ok(&self, url: &str, bearer: Option<&str>) -> Result<String, AiLlmError> {
        debug!("GET {url}");
        let mut req = self.client.get(url).timeout(self.timeout);
        if let Some(key) = bearer {
            let value = header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
            req = req.header(header::AUTHORIZATION, value);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })
            .into());
        }
        Ok(text)
    }
}

fn probe_url(cfg: &LlmModelConfig, path: &str) -> Result<String, AiLlmError> {
    let endpoint = cfg.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
    }
    Ok(format!("{}/{path}", endpoint.trim_end_matches('/')))
}
