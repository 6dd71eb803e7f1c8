//! `SeaORM` implementation of the `ReportService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{NewReport, ReportUpdate, Store};
use crate::entities::{reports, users};
use crate::services::report_service::{
    ReportError, ReportService, StatusAction, check_transition,
};

pub struct SeaOrmReportService {
    store: Store,
}

impl SeaOrmReportService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReportService for SeaOrmReportService {
    async fn create(
        &self,
        author: &users::Model,
        new: NewReport,
    ) -> Result<reports::Model, ReportError> {
        if !author.is_account_verified {
            return Err(ReportError::NotVerified);
        }

        if new.school_name.trim().is_empty() {
            return Err(ReportError::Validation(
                "School name is required".to_string(),
            ));
        }
        if new.description.trim().is_empty() {
            return Err(ReportError::Validation(
                "Description is required".to_string(),
            ));
        }

        let report = self.store.create_report(new).await?;
        info!("Report {} submitted by {}", report.id, author.id);
        Ok(report)
    }

    async fn moderate(
        &self,
        report_id: &str,
        action: StatusAction,
        comment: Option<String>,
    ) -> Result<reports::Model, ReportError> {
        let report = self
            .store
            .get_report(report_id)
            .await?
            .ok_or(ReportError::NotFound)?;

        let target = check_transition(&report.status, action)?;

        let report = self
            .store
            .set_report_status(report, target, comment.as_deref())
            .await?;

        info!("Report {} moved to {}", report.id, report.status);
        Ok(report)
    }

    async fn moderate_bulk(
        &self,
        report_ids: &[String],
        action: StatusAction,
    ) -> Result<u64, ReportError> {
        if report_ids.is_empty() {
            return Err(ReportError::Validation(
                "At least one report ID is required".to_string(),
            ));
        }

        let touched = self
            .store
            .set_report_status_bulk(report_ids, action.target_status())
            .await?;

        info!(
            "Bulk status update: {} of {} reports moved to {}",
            touched,
            report_ids.len(),
            action.target_status()
        );
        Ok(touched)
    }

    async fn update(
        &self,
        report_id: &str,
        update: ReportUpdate,
    ) -> Result<reports::Model, ReportError> {
        let report = self
            .store
            .get_report(report_id)
            .await?
            .ok_or(ReportError::NotFound)?;

        let report = self.store.update_report(report, update).await?;
        Ok(report)
    }

    async fn delete(&self, report_id: &str) -> Result<(), ReportError> {
        let deleted = self.store.delete_report(report_id).await?;
        if !deleted {
            return Err(ReportError::NotFound);
        }

        info!("Report {} deleted", report_id);
        Ok(())
    }
}
