use std::sync::Arc;

use crate::clients::media_host::MediaHostClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, Mailer, ReportService, SeaOrmAccountService, SeaOrmReportService,
    TokenService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenService,

    pub mailer: Arc<Mailer>,

    pub media: Arc<MediaHostClient>,

    pub accounts: Arc<dyn AccountService>,

    pub reports: Arc<dyn ReportService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Build the state around an already-initialized store. Used by tests
    /// to run against an in-memory database.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let secret = config.jwt_secret()?;
        let tokens = TokenService::new(
            secret,
            config.auth.admin_token_ttl_hours,
            config.auth.user_token_ttl_hours,
        );

        let mailer = Arc::new(Mailer::new(&config.mail, config.auth.otp_ttl_minutes)?);
        let media = Arc::new(MediaHostClient::new(&config.media)?);

        let accounts = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            tokens.clone(),
            mailer.clone(),
            config.security.clone(),
            config.auth.clone(),
        )) as Arc<dyn AccountService + Send + Sync + 'static>;

        let reports = Arc::new(SeaOrmReportService::new(store.clone()))
            as Arc<dyn ReportService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            mailer,
            media,
            accounts,
            reports,
        })
    }
}
