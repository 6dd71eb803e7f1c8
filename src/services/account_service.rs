//! Domain service for account lifecycle: signup, sign-in, verification,
//! and password reset.

use thiserror::Error;

use crate::entities::users;
use crate::services::mailer::MailError;
use crate::services::token::TokenError;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is blocked")]
    Blocked,

    #[error("Account is not verified")]
    NotVerified,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Account not found")]
    NotFound,

    #[error("Invalid or expired verification code")]
    InvalidOtp,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("New password must be different from the current password")]
    PasswordReused,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Mail delivery failed: {0}")]
    Mail(#[from] MailError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Signup input. `as_admin` is set by the admin-signup route; the very first
/// account becomes admin regardless.
#[derive(Debug, Clone)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
    pub as_admin: bool,
}

/// Admin-created account with an explicit role ("user", "teacher",
/// "student").
#[derive(Debug, Clone)]
pub struct AddUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Successful sign-in: the fresh account record plus a session token.
#[derive(Debug, Clone)]
pub struct Signin {
    pub user: users::Model,
    pub token: String,
}

/// Domain service trait for account operations.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and email its verification code.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::EmailTaken`] for a duplicate email.
    async fn signup(&self, input: Signup) -> Result<users::Model, AccountError>;

    /// Verify credentials and issue a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Blocked`] for blocked accounts,
    /// [`AccountError::NotVerified`] for unverified ones, and
    /// [`AccountError::InvalidCredentials`] otherwise. With `require_admin`,
    /// non-admin accounts also get [`AccountError::InvalidCredentials`].
    async fn signin(
        &self,
        email: &str,
        password: &str,
        require_admin: bool,
    ) -> Result<Signin, AccountError>;

    /// Admin flow: create an account with an explicit role and email its
    /// verification code.
    async fn add_user(&self, input: AddUser) -> Result<users::Model, AccountError>;

    /// Issue (or re-issue) a verification code for the account, overwriting
    /// any outstanding one, and email it.
    async fn request_otp(&self, email: &str) -> Result<(), AccountError>;

    /// Consume a verification code: marks the account verified and clears
    /// the code so it cannot be used twice.
    async fn verify_otp(&self, otp: &str) -> Result<users::Model, AccountError>;

    /// Issue a password-reset token, store only its sha256, and email the
    /// plaintext link.
    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError>;

    /// Complete a reset: the token must resolve, belong to `user_id`, and
    /// the new password must differ from the current one.
    async fn reset_password(
        &self,
        user_id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;
}
