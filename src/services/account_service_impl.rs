//! `SeaORM` implementation of the `AccountService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{AuthConfig, SecurityConfig};
use crate::db::repositories::user as user_repo;
use crate::db::{NewAccount, Store};
use crate::entities::users;
use crate::services::account_service::{
    AccountError, AccountService, AddUser, Signin, Signup,
};
use crate::services::mailer::Mailer;
use crate::services::token::TokenService;

pub struct SeaOrmAccountService {
    store: Store,
    tokens: TokenService,
    mailer: Arc<Mailer>,
    security: SecurityConfig,
    auth: AuthConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(
        store: Store,
        tokens: TokenService,
        mailer: Arc<Mailer>,
        security: SecurityConfig,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            mailer,
            security,
            auth,
        }
    }

    async fn create_account(
        &self,
        first_name: String,
        last_name: String,
        email: String,
        password: String,
        image: Option<String>,
        role: String,
        is_admin: bool,
    ) -> Result<users::Model, AccountError> {
        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        // The very first account on the platform is always an admin.
        let (role, is_admin) = if self.store.count_users().await? == 0 {
            ("admin".to_string(), true)
        } else {
            (role, is_admin)
        };

        let password_hash =
            user_repo::hash_password_async(password, self.security.clone()).await?;

        let user = self
            .store
            .create_user(NewAccount {
                first_name,
                last_name,
                email,
                password_hash,
                image,
                role,
                is_admin,
            })
            .await?;

        info!("Created account {} ({})", user.id, user.email);
        Ok(user)
    }

    async fn issue_and_send_otp(&self, user: users::Model) -> Result<users::Model, AccountError> {
        let otp = user_repo::generate_otp();
        let expires = (chrono::Utc::now() + chrono::Duration::minutes(self.auth.otp_ttl_minutes))
            .to_rfc3339();

        let user = self.store.set_verification_otp(user, &otp, &expires).await?;

        self.mailer
            .send_verification_otp(&user.email, &user.first_name, &otp)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn signup(&self, input: Signup) -> Result<users::Model, AccountError> {
        let role = if input.as_admin { "admin" } else { "user" };
        let user = self
            .create_account(
                input.first_name,
                input.last_name,
                input.email,
                input.password,
                input.image,
                role.to_string(),
                input.as_admin,
            )
            .await?;

        self.issue_and_send_otp(user).await
    }

    async fn signin(
        &self,
        email: &str,
        password: &str,
        require_admin: bool,
    ) -> Result<Signin, AccountError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let is_valid =
            user_repo::verify_password_hash(user.password_hash.clone(), password.to_string())
                .await?;
        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        if require_admin && !user.is_admin {
            return Err(AccountError::InvalidCredentials);
        }

        if user.is_blocked {
            return Err(AccountError::Blocked);
        }

        if !user.is_account_verified {
            return Err(AccountError::NotVerified);
        }

        let token = self.tokens.issue(&user)?;

        Ok(Signin { user, token })
    }

    async fn add_user(&self, input: AddUser) -> Result<users::Model, AccountError> {
        let user = self
            .create_account(
                input.first_name,
                input.last_name,
                input.email,
                input.password,
                None,
                input.role,
                false,
            )
            .await?;

        self.issue_and_send_otp(user).await
    }

    async fn request_otp(&self, email: &str) -> Result<(), AccountError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        if user.is_account_verified {
            return Err(AccountError::Validation(
                "Account is already verified".to_string(),
            ));
        }

        self.issue_and_send_otp(user).await?;
        Ok(())
    }

    async fn verify_otp(&self, otp: &str) -> Result<users::Model, AccountError> {
        let user = self
            .store
            .find_user_by_valid_otp(otp)
            .await?
            .ok_or(AccountError::InvalidOtp)?;

        let user = self.store.mark_user_verified(user).await?;

        self.mailer
            .send_welcome(&user.email, &user.first_name)
            .await?;

        info!("Account {} verified", user.id);
        Ok(user)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        // Only the sha256 is persisted; the plaintext goes into the mail
        // link and is then discarded.
        let token = user_repo::generate_reset_token();
        let token_hash = user_repo::sha256_hex(&token);
        let expires = (chrono::Utc::now()
            + chrono::Duration::minutes(self.auth.reset_token_ttl_minutes))
        .to_rfc3339();

        let user = self.store.set_reset_token(user, &token_hash, &expires).await?;

        self.mailer
            .send_reset_link(&user.email, &user.first_name, &token)
            .await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let user = self
            .store
            .find_user_by_valid_reset_token(token)
            .await?
            .ok_or(AccountError::InvalidResetToken)?;

        if user.id != user_id {
            return Err(AccountError::InvalidResetToken);
        }

        let same_as_old = user_repo::verify_password_hash(
            user.password_hash.clone(),
            new_password.to_string(),
        )
        .await?;
        if same_as_old {
            return Err(AccountError::PasswordReused);
        }

        let new_hash =
            user_repo::hash_password_async(new_password.to_string(), self.security.clone())
                .await?;

        let user = self.store.complete_password_reset(user, &new_hash).await?;

        self.mailer
            .send_reset_confirmation(&user.email, &user.first_name)
            .await?;

        info!("Password reset completed for account {}", user.id);
        Ok(())
    }
}
