//! Report status state machine.
//!
//! ```text
//! submitted -> classified -> routed -> in-progress -> resolved
//!                            routed ----------------> resolved
//! ```
//! `resolved` is terminal.

use crate::errors::{ReportError, ReportResult};
use crate::model::ReportStatus;

/// Statuses reachable from `from` in one step.
pub fn next_statuses(from: ReportStatus) -> &'static [ReportStatus] {
    use ReportStatus::*;
    match from {
        Submitted => &[Classified],
        Classified => &[Routed],
        Routed => &[InProgress, Resolved],
        InProgress => &[Resolved],
        Resolved => &[],
    }
}

pub fn can_transition(from: ReportStatus, to: ReportStatus) -> bool {
    next_statuses(from).contains(&to)
}

pub fn check_transition(from: ReportStatus, to: ReportStatus) -> ReportResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(ReportError::InvalidTransition { from, to })
    }
}

/// `routed` needs an organization attached.
pub fn requires_organization(to: ReportStatus) -> bool {
    to == ReportStatus::Routed
}

/// Entering `resolved` stamps `resolved_at`.
pub fn stamps_resolution(to: ReportStatus) -> bool {
    to == ReportStatus::Resolved
}
