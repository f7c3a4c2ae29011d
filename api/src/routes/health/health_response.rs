use ai_llm_service::HealthStatus;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when an LLM probe failed.
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    pub collaborator: String,
    /// Provider probes; empty with the keyword collaborator.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub llm: Vec<HealthStatus>,
}
