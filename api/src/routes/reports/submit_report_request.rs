use report_core::NewReport;
use serde::Deserialize;

/// Citizen submission.
///
/// `title` and `description` are optional at the wire level so that a
/// missing field is answered with a `ValidationError` from the intake
/// pipeline rather than a decoding failure.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional contact name; absent for anonymous reports.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Base64 image (bare or `data:` URL).
    #[serde(default)]
    pub image: Option<String>,
}

impl From<SubmitReportRequest> for NewReport {
    fn from(req: SubmitReportRequest) -> Self {
        NewReport {
            title: req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            name: req.name,
            email: req.email,
            image: req.image.filter(|i| !i.trim().is_empty()),
        }
    }
}
