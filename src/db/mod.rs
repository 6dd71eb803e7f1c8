use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::report::{NewReport, ReportFilter, ReportUpdate};
pub use repositories::user::NewAccount;

use crate::entities::{reports, uploads, users};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn report_repo(&self) -> repositories::report::ReportRepository {
        repositories::report::ReportRepository::new(self.conn.clone())
    }

    fn upload_repo(&self) -> repositories::upload::UploadRepository {
        repositories::upload::UploadRepository::new(self.conn.clone())
    }

    // --- users ---

    pub async fn create_user(&self, new: NewAccount) -> Result<users::Model> {
        self.user_repo().create(new).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn get_user_by_slug(&self, slug: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_slug(slug).await
    }

    pub async fn list_users(&self) -> Result<Vec<users::Model>> {
        self.user_repo().list().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn users_created_since(&self, since: &str) -> Result<Vec<users::Model>> {
        self.user_repo().created_since(since).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn set_user_blocked(&self, user: users::Model, blocked: bool) -> Result<users::Model> {
        self.user_repo().set_blocked(user, blocked).await
    }

    pub async fn set_verification_otp(
        &self,
        user: users::Model,
        otp: &str,
        expires: &str,
    ) -> Result<users::Model> {
        self.user_repo().set_verification_otp(user, otp, expires).await
    }

    pub async fn find_user_by_valid_otp(&self, otp: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_valid_otp(otp).await
    }

    pub async fn mark_user_verified(&self, user: users::Model) -> Result<users::Model> {
        self.user_repo().mark_verified(user).await
    }

    pub async fn set_reset_token(
        &self,
        user: users::Model,
        token_hash: &str,
        expires: &str,
    ) -> Result<users::Model> {
        self.user_repo().set_reset_token(user, token_hash, expires).await
    }

    pub async fn find_user_by_valid_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<users::Model>> {
        self.user_repo().find_by_valid_reset_token(token).await
    }

    pub async fn complete_password_reset(
        &self,
        user: users::Model,
        new_password_hash: &str,
    ) -> Result<users::Model> {
        self.user_repo()
            .complete_password_reset(user, new_password_hash)
            .await
    }

    // --- reports ---

    pub async fn create_report(&self, new: NewReport) -> Result<reports::Model> {
        self.report_repo().create(new).await
    }

    pub async fn get_report(&self, id: &str) -> Result<Option<reports::Model>> {
        self.report_repo().find_by_id(id).await
    }

    pub async fn get_report_by_slug(&self, slug: &str) -> Result<Option<reports::Model>> {
        self.report_repo().find_by_slug(slug).await
    }

    pub async fn latest_reports(&self, limit: u64) -> Result<Vec<reports::Model>> {
        self.report_repo().latest(limit).await
    }

    pub async fn filtered_reports(
        &self,
        filter: ReportFilter,
    ) -> Result<(Vec<reports::Model>, u64)> {
        self.report_repo().filtered(filter).await
    }

    pub async fn list_all_reports(&self) -> Result<Vec<reports::Model>> {
        self.report_repo().list_all().await
    }

    pub async fn update_report(
        &self,
        report: reports::Model,
        update: ReportUpdate,
    ) -> Result<reports::Model> {
        self.report_repo().update_fields(report, update).await
    }

    pub async fn set_report_status(
        &self,
        report: reports::Model,
        status: &str,
        comment: Option<&str>,
    ) -> Result<reports::Model> {
        self.report_repo().set_status(report, status, comment).await
    }

    pub async fn set_report_status_bulk(&self, ids: &[String], status: &str) -> Result<u64> {
        self.report_repo().set_status_bulk(ids, status).await
    }

    pub async fn delete_report(&self, id: &str) -> Result<bool> {
        self.report_repo().delete(id).await
    }

    pub async fn count_reports(&self) -> Result<u64> {
        self.report_repo().count().await
    }

    pub async fn count_reports_by_status(&self, status: &str) -> Result<u64> {
        self.report_repo().count_by_status(status).await
    }

    pub async fn reports_created_since(&self, since: &str) -> Result<Vec<reports::Model>> {
        self.report_repo().created_since(since).await
    }

    // --- uploads ---

    pub async fn record_upload(
        &self,
        file_url: &str,
        file_type: &str,
    ) -> Result<uploads::Model> {
        self.upload_repo().record(file_url, file_type).await
    }

    pub async fn list_uploads(&self) -> Result<Vec<uploads::Model>> {
        self.upload_repo().list().await
    }
}
