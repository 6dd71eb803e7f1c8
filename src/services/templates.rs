//! Outbound HTML email bodies.

/// Verification code mail sent on signup, re-issue, and admin add-user.
#[must_use]
pub fn verification_otp(first_name: &str, otp: &str, ttl_minutes: i64) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 480px;\">\
         <h2>Verify your account</h2>\
         <p>Hi {first_name},</p>\
         <p>Your verification code is:</p>\
         <p style=\"font-size: 28px; letter-spacing: 6px; font-weight: bold;\">{otp}</p>\
         <p>The code expires in {ttl_minutes} minutes. If you did not request it, you can ignore this message.</p>\
         </div>"
    )
}

/// Password-reset mail carrying the one-hour link.
#[must_use]
pub fn reset_link(first_name: &str, reset_url: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 480px;\">\
         <h2>Reset your password</h2>\
         <p>Hi {first_name},</p>\
         <p>We received a request to reset your password. The link below is valid for one hour:</p>\
         <p><a href=\"{reset_url}\">Reset password</a></p>\
         <p>If you did not request a reset, no action is needed.</p>\
         </div>"
    )
}

/// Confirmation mail sent after a successful password reset.
#[must_use]
pub fn reset_confirmation(first_name: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 480px;\">\
         <h2>Password changed</h2>\
         <p>Hi {first_name},</p>\
         <p>Your password was just changed. If this was not you, request a new reset immediately.</p>\
         </div>"
    )
}

/// Newsletter broadcast body. The message is admin-authored HTML and is
/// embedded as-is.
#[must_use]
pub fn newsletter(message: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 600px;\">\
         <div>{message}</div>\
         <hr style=\"border: none; border-top: 1px solid #a5a5a5;\"/>\
         <p style=\"color: #434343; font-size: 13px;\">EdReport</p>\
         </div>"
    )
}

/// Welcome mail sent once the account is verified.
#[must_use]
pub fn welcome(first_name: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 480px;\">\
         <h2>Welcome aboard</h2>\
         <p>Hi {first_name},</p>\
         <p>Your account is verified. You can now sign in and submit reports.</p>\
         </div>"
    )
}
