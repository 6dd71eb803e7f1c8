//! Domain service for report moderation and the status state machine.

use thiserror::Error;

use crate::db::{NewReport, ReportUpdate};
use crate::entities::{reports, users};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report not found")]
    NotFound,

    #[error("Report is already {0}")]
    NoopTransition(String),

    #[error("Account must be verified to submit reports")]
    NotVerified,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ReportError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Moderation decision applied to one or many reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Approve,
    Disapprove,
}

impl StatusAction {
    #[must_use]
    pub const fn target_status(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Disapprove => "disapproved",
        }
    }

    pub fn parse(action: &str) -> Result<Self, ReportError> {
        match action {
            "approve" => Ok(Self::Approve),
            "disapprove" => Ok(Self::Disapprove),
            other => Err(ReportError::Validation(format!(
                "Unknown status action: {other}"
            ))),
        }
    }
}

/// The state machine check: moving a report to the status it already has is
/// a rejected no-op; any other transition (including re-moderation) is
/// allowed.
pub fn check_transition(current: &str, action: StatusAction) -> Result<&'static str, ReportError> {
    let target = action.target_status();
    if current == target {
        return Err(ReportError::NoopTransition(target.to_string()));
    }
    Ok(target)
}

/// Domain service trait for report operations.
#[async_trait::async_trait]
pub trait ReportService: Send + Sync {
    /// Submit a report. Only verified accounts may submit.
    async fn create(
        &self,
        author: &users::Model,
        new: NewReport,
    ) -> Result<reports::Model, ReportError>;

    /// Apply a single moderation decision, rejecting no-op transitions.
    async fn moderate(
        &self,
        report_id: &str,
        action: StatusAction,
        comment: Option<String>,
    ) -> Result<reports::Model, ReportError>;

    /// Apply one decision uniformly to many reports; returns rows touched.
    async fn moderate_bulk(
        &self,
        report_ids: &[String],
        action: StatusAction,
    ) -> Result<u64, ReportError>;

    async fn update(
        &self,
        report_id: &str,
        update: ReportUpdate,
    ) -> Result<reports::Model, ReportError>;

    async fn delete(&self, report_id: &str) -> Result<(), ReportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_move_either_way() {
        assert_eq!(
            check_transition("pending", StatusAction::Approve).unwrap(),
            "approved"
        );
        assert_eq!(
            check_transition("pending", StatusAction::Disapprove).unwrap(),
            "disapproved"
        );
    }

    #[test]
    fn test_noop_transition_rejected() {
        assert!(matches!(
            check_transition("approved", StatusAction::Approve),
            Err(ReportError::NoopTransition(_))
        ));
        assert!(matches!(
            check_transition("disapproved", StatusAction::Disapprove),
            Err(ReportError::NoopTransition(_))
        ));
    }

    #[test]
    fn test_re_moderation_allowed() {
        assert_eq!(
            check_transition("approved", StatusAction::Disapprove).unwrap(),
            "disapproved"
        );
        assert_eq!(
            check_transition("disapproved", StatusAction::Approve).unwrap(),
            "approved"
        );
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(
            StatusAction::parse("approve").unwrap(),
            StatusAction::Approve
        );
        assert_eq!(
            StatusAction::parse("disapprove").unwrap(),
            StatusAction::Disapprove
        );
        assert!(StatusAction::parse("archive").is_err());
    }
}
