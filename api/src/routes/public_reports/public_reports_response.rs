use report_core::PublicReport;
use serde::Serialize;

/// One page of the public transparency listing.
#[derive(Debug, Serialize)]
pub struct PublicReportsResponse {
    pub reports: Vec<PublicReport>,
    pub offset: usize,
    pub page_size: usize,
    /// Offset of the next page; `None` on the last page.
    pub next_offset: Option<usize>,
}
