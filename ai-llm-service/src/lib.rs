//! LLM collaborator for civic report intake.
//!
//! Provider clients (Ollama, OpenAI), fast/slow profiles, health probes and
//! the [`collaborator::LlmCollaborator`] that plugs into `report_core`.

pub mod collaborator;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use collaborator::{CollaboratorSetup, LlmCollaborator, collaborator_from_env};
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
