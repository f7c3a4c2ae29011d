use std::{path::PathBuf, sync::Arc, time::Duration};

use ai_llm_service::{LlmServiceProfiles, collaborator_from_env};
use report_core::{
    Classifier, DEFAULT_AI_TIMEOUT, LogNotifier, Notifier, OrganizationDirectory, ReportService,
    StaticDirectory, WebhookNotifier,
    notify::DEFAULT_NOTIFY_TIMEOUT,
    store::{MemoryStore, ReportStore, SqliteStore},
};
use thiserror::Error;
use tracing::info;

use crate::error_handler::AppError;

/// Invalid or missing server settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Server settings, resolved once at start.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_address: String,
    /// `sqlite://...`; `None` keeps reports in memory.
    pub database_url: Option<String>,
    /// Bound on each classify/summarize call.
    pub ai_timeout: Duration,
    pub auto_route: bool,
    pub org_directory_file: Option<PathBuf>,
    /// Relay that receives routing notifications; unset means log only.
    pub notify_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_address = get("API_ADDRESS").ok_or(ConfigError::MissingVar("API_ADDRESS"))?;

        let ai_timeout = match get("AI_TIMEOUT_SECS") {
            None => DEFAULT_AI_TIMEOUT,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "AI_TIMEOUT_SECS",
                    reason: format!("expected a positive number of seconds, got `{raw}`"),
                })?,
        };

        let auto_route = match get("AUTO_ROUTE") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "AUTO_ROUTE",
                reason: format!("expected true/false, got `{raw}`"),
            })?,
        };

        let notify_webhook_url = get("NOTIFY_WEBHOOK_URL");
        if let Some(url) = &notify_webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    var: "NOTIFY_WEBHOOK_URL",
                    reason: format!("expected an http(s) URL, got `{url}`"),
                });
            }
        }

        Ok(Self {
            api_address,
            database_url: get("DATABASE_URL"),
            ai_timeout,
            auto_route,
            org_directory_file: get("ORG_DIRECTORY_FILE").map(PathBuf::from),
            notify_webhook_url,
        })
    }

    /// Webhook notifier when a relay is configured, log notifier otherwise.
    pub fn notifier(&self) -> Result<Arc<dyn Notifier>, ConfigError> {
        match &self.notify_webhook_url {
            Some(url) => {
                let webhook = WebhookNotifier::new(url, DEFAULT_NOTIFY_TIMEOUT).map_err(|e| {
                    ConfigError::Invalid {
                        var: "NOTIFY_WEBHOOK_URL",
                        reason: e.to_string(),
                    }
                })?;
                Ok(Arc::new(webhook))
            }
            None => Ok(Arc::new(LogNotifier)),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub config: AppConfig,
    pub service: ReportService,
    /// LLM profiles for health probes; `None` with the keyword collaborator.
    pub llm: Option<Arc<LlmServiceProfiles>>,
    /// `memory` or `sqlite`.
    pub store_backend: &'static str,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        service: ReportService,
        llm: Option<Arc<LlmServiceProfiles>>,
        store_backend: &'static str,
    ) -> Self {
        Self {
            config,
            service,
            llm,
            store_backend,
        }
    }

    /// Opens the store, builds the collaborator and loads the directory.
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let (store, backend): (Arc<dyn ReportStore>, &'static str) = match &config.database_url {
            Some(url) => (Arc::new(SqliteStore::connect(url).await?), "sqlite"),
            None => (Arc::new(MemoryStore::new()), "memory"),
        };

        let setup = collaborator_from_env()?;
        let classifier = Classifier::new(setup.collaborator, config.ai_timeout);

        let notifier = config.notifier()?;

        let directory = match &config.org_directory_file {
            Some(path) => StaticDirectory::from_file(path)?,
            None => StaticDirectory::builtin(),
        };

        info!(
            store = backend,
            collaborator = classifier.collaborator().map(|c| c.name()).unwrap_or("none"),
            organizations = directory.organizations().len(),
            auto_route = config.auto_route,
            notifier = notifier.name(),
            ai_timeout_secs = config.ai_timeout.as_secs(),
            "application state ready"
        );

        let service = ReportService::new(store, classifier)
            .with_directory(Arc::new(directory))
            .with_notifier(notifier)
            .with_auto_route(config.auto_route);

        Ok(Self::new(config, service, setup.profiles, backend))
    }
}
