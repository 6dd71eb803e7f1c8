use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub mail: MailConfig,

    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/edreport.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5100,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Must be set (here or via JWT_SECRET); startup
    /// fails without it.
    pub jwt_secret: Option<String>,

    /// Session lifetime for admin accounts (default: 2)
    pub admin_token_ttl_hours: i64,

    /// Session lifetime for everyone else (default: 24)
    pub user_token_ttl_hours: i64,

    /// Verification code lifetime (default: 10)
    pub otp_ttl_minutes: i64,

    /// Password-reset token lifetime (default: 60)
    pub reset_token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            admin_token_ttl_hours: 2,
            user_token_ttl_hours: 24,
            otp_ttl_minutes: 10,
            reset_token_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When false, outgoing mail is logged instead of sent. Used in tests
    /// and local development.
    pub enabled: bool,

    pub smtp_host: String,

    pub smtp_port: u16,

    pub smtp_username: String,

    pub smtp_password: String,

    /// From address, e.g. "EdReport <no-reply@edreport.example>"
    pub sender: String,

    /// Base URL used in reset-password links.
    pub frontend_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            sender: "EdReport <no-reply@localhost>".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// When false, the upload relay endpoint reports the media host as
    /// unavailable.
    pub enabled: bool,

    pub upload_url: String,

    pub api_key: String,

    /// Relay timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            upload_url: "https://media.example.com/upload".to_string(),
            api_key: String::new(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            mail: MailConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets come from the environment in deployments; env always wins
    /// over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Ok(password) = std::env::var("SMTP_PASSWORD") {
            self.mail.smtp_password = password;
        }
        if let Ok(api_key) = std::env::var("MEDIA_API_KEY") {
            self.media.api_key = api_key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("edreport").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".edreport").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        match &self.auth.jwt_secret {
            None => anyhow::bail!(
                "JWT secret is not configured; set [auth] jwt_secret or the JWT_SECRET env var"
            ),
            Some(secret) if secret.is_empty() => {
                anyhow::bail!("JWT secret must not be empty");
            }
            Some(_) => {}
        }

        if self.auth.admin_token_ttl_hours <= 0 || self.auth.user_token_ttl_hours <= 0 {
            anyhow::bail!("Token lifetimes must be positive");
        }

        if self.mail.enabled && self.mail.smtp_host.is_empty() {
            anyhow::bail!("SMTP host cannot be empty when mail is enabled");
        }

        if self.media.enabled && self.media.upload_url.is_empty() {
            anyhow::bail!("Media host upload URL cannot be empty when enabled");
        }

        Ok(())
    }

    /// The validated signing secret. Call only after `validate()`.
    pub fn jwt_secret(&self) -> Result<&str> {
        self.auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT secret is not configured"))
    }
}
