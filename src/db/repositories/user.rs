use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use sha2::{Digest, Sha256};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::slug;

/// Input for account creation. The password arrives already hashed so the
/// repository never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub role: String,
    pub is_admin: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new account and assign its unique slug.
    ///
    /// Returns the stored record directly; callers never need a follow-up
    /// lookup. The unique index on email is the backstop for concurrent
    /// signups with the same address.
    pub async fn create(&self, new: NewAccount) -> Result<users::Model> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            id: Set(id.clone()),
            first_name: Set(new.first_name.clone()),
            last_name: Set(new.last_name.clone()),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            image: Set(new.image),
            role: Set(new.role),
            is_admin: Set(new.is_admin),
            is_blocked: Set(false),
            is_account_verified: Set(false),
            slug: Set(None),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            account_verification_otp: Set(None),
            account_verification_otp_expires: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        let base = format!("{} {}", new.first_name, new.last_name);
        self.assign_slug(model, &base).await
    }

    /// Assign the first free slug derived from `base_text` to the row.
    ///
    /// Probes `base`, `base-1`, `base-2`, ... against the table. Runs after
    /// the insert rather than inside it; the unique index on slug catches
    /// the rare concurrent probe of the same candidate.
    async fn assign_slug(&self, model: users::Model, base_text: &str) -> Result<users::Model> {
        let normalized = slug::slugify(base_text);
        let base = if normalized.is_empty() {
            model.id.clone()
        } else {
            normalized
        };

        let mut attempt = 0;
        let chosen = loop {
            let candidate = slug::candidate(&base, attempt);
            let taken = users::Entity::find()
                .filter(users::Column::Slug.eq(candidate.as_str()))
                .count(&self.conn)
                .await
                .context("Failed to probe user slug")?;
            if taken == 0 {
                break candidate;
            }
            attempt += 1;
        };

        let mut active: users::ActiveModel = model.into();
        active.slug = Set(Some(chosen));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to store user slug")?;

        Ok(updated)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query user by slug")
    }

    /// Newest accounts first.
    pub async fn list(&self) -> Result<Vec<users::Model>> {
        users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list users")
    }

    pub async fn count(&self) -> Result<u64> {
        users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    /// Accounts created at or after the given RFC3339 instant.
    pub async fn created_since(&self, since: &str) -> Result<Vec<users::Model>> {
        users::Entity::find()
            .filter(users::Column::CreatedAt.gte(since))
            .all(&self.conn)
            .await
            .context("Failed to query recent users")
    }

    /// Returns false when no row matched.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    /// Store a fresh verification OTP, overwriting any outstanding one.
    pub async fn set_verification_otp(
        &self,
        user: users::Model,
        otp: &str,
        expires: &str,
    ) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.account_verification_otp = Set(Some(otp.to_string()));
        active.account_verification_otp_expires = Set(Some(expires.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to store verification OTP")
    }

    /// Look up an account by a still-valid OTP (expiry strictly in the
    /// future). A consumed or expired code matches nothing.
    pub async fn find_by_valid_otp(&self, otp: &str) -> Result<Option<users::Model>> {
        let now = chrono::Utc::now().to_rfc3339();
        users::Entity::find()
            .filter(users::Column::AccountVerificationOtp.eq(otp))
            .filter(users::Column::AccountVerificationOtpExpires.gt(now))
            .one(&self.conn)
            .await
            .context("Failed to query user by OTP")
    }

    /// Mark the account verified and clear both OTP fields in one update.
    pub async fn mark_verified(&self, user: users::Model) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.is_account_verified = Set(true);
        active.account_verification_otp = Set(None);
        active.account_verification_otp_expires = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to mark account verified")
    }

    /// Store the sha256 of a reset token, overwriting any outstanding one.
    pub async fn set_reset_token(
        &self,
        user: users::Model,
        token_hash: &str,
        expires: &str,
    ) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.reset_password_token = Set(Some(token_hash.to_string()));
        active.reset_password_expires = Set(Some(expires.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to store reset token")
    }

    /// Look up an account by the sha256 of a plaintext reset token, requiring
    /// a still-future expiry.
    pub async fn find_by_valid_reset_token(&self, token: &str) -> Result<Option<users::Model>> {
        let hash = sha256_hex(token);
        let now = chrono::Utc::now().to_rfc3339();
        users::Entity::find()
            .filter(users::Column::ResetPasswordToken.eq(hash))
            .filter(users::Column::ResetPasswordExpires.gt(now))
            .one(&self.conn)
            .await
            .context("Failed to query user by reset token")
    }

    /// Overwrite the password hash and clear both reset fields in one update.
    pub async fn complete_password_reset(
        &self,
        user: users::Model,
        new_password_hash: &str,
    ) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_password_hash.to_string());
        active.reset_password_token = Set(None);
        active.reset_password_expires = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to complete password reset")
    }

    pub async fn set_blocked(&self, user: users::Model, blocked: bool) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();
        active.is_blocked = Set(blocked);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update blocked flag")
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Hash a password on the blocking pool.
pub async fn hash_password_async(password: String, config: SecurityConfig) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, Some(&config)))
        .await
        .context("Password hashing task panicked")?
}

/// Verify a password against a PHC hash on the blocking pool.
pub async fn verify_password_hash(password_hash: String, password: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Generate a 6-digit verification code (100000-999999).
#[must_use]
pub fn generate_otp() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    rng.random_range(100_000..=999_999u32).to_string()
}

/// Generate a random reset token (64 character hex string).
/// Only its sha256 is ever persisted.
#[must_use]
pub fn generate_reset_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Sha256 digest as lowercase hex.
#[must_use]
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter22", None).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"hunter22", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"hunter23", &parsed)
                .is_err()
        );
    }

    #[test]
    fn test_generate_otp_shape() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let value: u32 = otp.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_generate_reset_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
