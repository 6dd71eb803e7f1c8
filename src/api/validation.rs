use std::sync::OnceLock;

use regex::Regex;

use super::ApiError;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if !email_regex().is_match(trimmed) {
        return Err(ApiError::validation(format!(
            "'{}' is not a valid email address",
            trimmed
        )));
    }
    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    const MIN_LENGTH: usize = 8;

    if password.len() < MIN_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_LENGTH
        )));
    }
    Ok(password)
}

pub fn validate_name(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    if trimmed.len() > 100 {
        return Err(ApiError::validation(format!(
            "{} must be 100 characters or less",
            field
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_otp(otp: &str) -> Result<&str, ApiError> {
    let trimmed = otp.trim();
    if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(
            "Verification code must be exactly 6 digits",
        ));
    }
    Ok(trimmed)
}

pub fn validate_role(role: &str) -> Result<&str, ApiError> {
    const ALLOWED: [&str; 3] = ["user", "teacher", "student"];

    if !ALLOWED.contains(&role) {
        return Err(ApiError::validation(format!(
            "Invalid role: '{}'. Role must be one of: {}",
            role,
            ALLOWED.join(", ")
        )));
    }
    Ok(role)
}

pub fn validate_privacy_preference(preference: &str) -> Result<&str, ApiError> {
    const ALLOWED: [&str; 2] = ["public", "anonymous"];

    if !ALLOWED.contains(&preference) {
        return Err(ApiError::validation(format!(
            "Invalid privacy preference: '{}'. Must be one of: {}",
            preference,
            ALLOWED.join(", ")
        )));
    }
    Ok(preference)
}
