use serde::Deserialize;

/// Body of `PATCH /reports/{id}/status`, e.g. `{"status": "in-progress"}`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}
