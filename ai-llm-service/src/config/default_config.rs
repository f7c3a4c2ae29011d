//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles per provider:
//!
//! - **Fast** → report classification (short JSON answers, low temperature)
//! - **Slow** → analytics insights (longer prose); falls back to fast
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = `ollama`, `openai` (alias `chatgpt`) or `keyword`/unset for no LLM
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL_FAST` = classification model (mandatory)
//! - `OLLAMA_MODEL`      = insights model (optional)
//!
//! OpenAI:
//! - `OPENAI_URL`     = base URL (default `https://api.openai.com`)
//! - `OPENAI_API_KEY` = API key (mandatory)
//! - `OPENAI_MODEL`   = model for both roles (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_u32, must_env, validate_http_endpoint,
    },
};

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";

/// Provider selected by `LLM_KIND`; `None` means the offline keyword collaborator.
pub fn llm_kind_from_env() -> Result<Option<LlmProvider>, AiLlmError> {
    match env_opt("LLM_KIND") {
        None => Ok(None),
        Some(kind) if matches!(kind.to_ascii_lowercase().as_str(), "keyword" | "none") => Ok(None),
        Some(kind) => Ok(Some(kind.parse::<LlmProvider>()?)),
    }
}

/// `(fast, slow)` profiles for `provider`.
pub fn profiles_from_env(
    provider: LlmProvider,
) -> Result<(LlmModelConfig, Option<LlmModelConfig>), AiLlmError> {
    match provider {
        LlmProvider::Ollama => Ok((config_ollama_fast()?, config_ollama_slow()?)),
        LlmProvider::OpenAI => Ok((config_openai()?, None)),
    }
}

fn endpoint_from(url: Option<String>, port: Option<String>) -> Result<String, AiLlmError> {
    if let Some(url) = url {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = port {
        port.parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or(ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

/// Resolves the Ollama endpoint: `OLLAMA_URL`, else `http://localhost:{OLLAMA_PORT}`.
fn ollama_endpoint() -> Result<String, AiLlmError> {
    endpoint_from(env_opt("OLLAMA_URL"), env_opt("OLLAMA_PORT"))
}

/// Classification model on Ollama.
///
/// Low temperature keeps the JSON answers stable between identical reports.
pub fn config_ollama_fast() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("OLLAMA_MODEL_FAST")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.1),
        top_p: Some(0.9),
        timeout_secs: Some(60),
    })
}

/// Insights model on Ollama, if `OLLAMA_MODEL` is set.
pub fn config_ollama_slow() -> Result<Option<LlmModelConfig>, AiLlmError> {
    let Some(model) = env_opt("OLLAMA_MODEL") else {
        return Ok(None);
    };
    Ok(Some(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.4),
        top_p: None,
        timeout_secs: Some(180),
    }))
}

/// OpenAI chat model used for both roles.
pub fn config_openai() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = env_opt("OPENAI_URL").unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());
    validate_http_endpoint("OPENAI_URL", &endpoint)?;
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: must_env("OPENAI_MODEL")?,
        endpoint,
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(60),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_wins_over_port() {
        let ep = endpoint_from(Some("http://gpu-box:11434".into()), Some("1".into())).unwrap();
        assert_eq!(ep, "http://gpu-box:11434");
    }

    #[test]
    fn port_builds_localhost_endpoint() {
        assert_eq!(
            endpoint_from(None, Some("11434".into())).unwrap(),
            "http://localhost:11434"
        );
    }

    #[test]
    fn bad_inputs_are_rejected() {
        assert!(endpoint_from(None, Some("70000".into())).is_err());
        assert!(endpoint_from(None, Some("0".into())).is_err());
        assert!(endpoint_from(Some("gpu-box:11434".into()), None).is_err());
        let missing = endpoint_from(None, None).unwrap_err();
        assert!(missing.to_string().contains("OLLAMA_URL or OLLAMA_PORT"));
    }
}
