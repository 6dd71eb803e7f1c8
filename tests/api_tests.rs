use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use edreport::config::Config;
use edreport::db::Store;
use edreport::db::repositories::user::sha256_hex;
use edreport::state::AppState;

/// Router plus direct store access. The store is used to read the
/// verification code that would normally arrive by mail (the test config
/// leaves mail disabled, so nothing is actually sent).
async fn spawn_app() -> (Router, Store) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.jwt_secret = Some("integration_test_secret_0123456789".to_string());

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to create store");

    let state = AppState::with_store(config, store.clone()).expect("Failed to create app state");
    let app = edreport::api::router(Arc::new(state)).await;

    (app, store)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(
            builder
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

async fn send_get(
    app: &Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

fn signup_body(first: &str, last: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": first,
        "last_name": last,
        "email": email,
        "password": "hunter2hunter2",
    })
}

async fn stored_otp(store: &Store, email: &str) -> String {
    store
        .get_user_by_email(email)
        .await
        .unwrap()
        .expect("account should exist")
        .account_verification_otp
        .expect("account should have a pending verification code")
}

/// Sign up, verify via the stored code, and sign in. Returns the token.
async fn signed_in_user(app: &Router, store: &Store, first: &str, email: &str) -> String {
    let (status, _) = send_json(
        app,
        "POST",
        "/api/users/signup",
        None,
        signup_body(first, "Tester", email),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let otp = stored_otp(store, email).await;
    let (status, _) = send_json(
        app,
        "PUT",
        "/api/users/verify-otp",
        None,
        serde_json::json!({ "otp": otp }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": email, "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["data"]["token"].as_str().unwrap().to_string()
}

/// Store the hash of a known reset token with the given expiry, as if the
/// mail flow had issued it.
async fn plant_reset_token(store: &Store, email: &str, token_plain: &str, expires: &str) -> String {
    let user = store.get_user_by_email(email).await.unwrap().unwrap();
    let id = user.id.clone();
    store
        .set_reset_token(user, &sha256_hex(token_plain), expires)
        .await
        .unwrap();
    id
}

fn report_body(school: &str) -> serde_json::Value {
    serde_json::json!({
        "school_name": school,
        "school_location": "Lagos",
        "issue_type": ["infrastructure"],
        "description": "The roof of the science block leaks when it rains.",
    })
}

#[tokio::test]
async fn test_first_account_becomes_admin() {
    let (app, _store) = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Ada", "Obi", "ada@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["is_admin"], true);
    assert_eq!(body["data"]["is_account_verified"], false);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Ben", "Okafor", "ben@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["is_admin"], false);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let (app, _store) = spawn_app().await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Ada", "Obi", "ada@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Other", "Person", "ada@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_signup_validation() {
    let (app, _store) = spawn_app().await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        serde_json::json!({
            "first_name": "Ada",
            "last_name": "Obi",
            "email": "not-an-email",
            "password": "hunter2hunter2",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        serde_json::json!({
            "first_name": "Ada",
            "last_name": "Obi",
            "email": "ada@example.com",
            "password": "short",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_otp_verification_flow() {
    let (app, store) = spawn_app().await;

    let email = "ada@example.com";
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Ada", "Obi", email),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Unverified accounts cannot sign in.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": email, "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A wrong (but well-formed) code does not verify anything.
    let otp = stored_otp(&store, email).await;
    let wrong = if otp == "111111" { "222222" } else { "111111" };
    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/users/verify-otp",
        None,
        serde_json::json!({ "otp": wrong }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/users/verify-otp",
        None,
        serde_json::json!({ "otp": otp }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_account_verified"], true);

    // The code is consumed on use.
    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/users/verify-otp",
        None,
        serde_json::json!({ "otp": otp }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Verified accounts sign in and get a token.
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": email, "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], email);
}

#[tokio::test]
async fn test_admin_signin_rejects_regular_users() {
    let (app, store) = spawn_app().await;

    // First account is the admin; the second is a plain user.
    signed_in_user(&app, &store, "Ada", "ada@example.com").await;
    signed_in_user(&app, &store, "Ben", "ben@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/admin/signin",
        None,
        serde_json::json!({ "email": "ben@example.com", "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users/admin/signin",
        None,
        serde_json::json!({ "email": "ada@example.com", "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["is_admin"], true);
}

#[tokio::test]
async fn test_same_name_users_get_distinct_slugs() {
    let (app, _store) = spawn_app().await;

    for email in ["jane1@example.com", "jane2@example.com"] {
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/users/signup",
            None,
            signup_body("Jane", "Doe", email),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_get(&app, "/api/users/slug/jane-doe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "jane1@example.com");

    let (status, body) = send_get(&app, "/api/users/slug/jane-doe-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "jane2@example.com");
}

#[tokio::test]
async fn test_password_reset_with_bad_token() {
    let (app, store) = spawn_app().await;

    let email = "ada@example.com";
    signed_in_user(&app, &store, "Ada", email).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/password-token",
        None,
        serde_json::json!({ "email": email }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Only the hash is stored, so a made-up token never resolves.
    let user = store.get_user_by_email(email).await.unwrap().unwrap();
    assert!(user.reset_password_token.is_some());

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{}/reset-password", user.id),
        None,
        serde_json::json!({ "token": "0000000000000000", "password": "newpassword123" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_lifecycle() {
    let (app, store) = spawn_app().await;

    let token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    // Submitting needs a token.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/reports",
        None,
        report_body("Government College"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/reports",
        Some(&token),
        report_body("Government College"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["slug"], "government-college");
    let report_id = body["data"]["id"].as_str().unwrap().to_string();

    // Approve, then reject the no-op re-approval.
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/reports/{report_id}/approve"),
        Some(&token),
        serde_json::json!({ "comment": "Confirmed with the school" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["comment"], "Confirmed with the school");

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/reports/{report_id}/approve"),
        Some(&token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Re-moderation in the other direction is allowed.
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/reports/{report_id}/disapprove"),
        Some(&token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "disapproved");

    // Reports are publicly readable.
    let (status, body) = send_get(&app, &format!("/api/reports/{report_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["school_name"], "Government College");

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/api/reports/{report_id}"),
        Some(&token),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_get(&app, &format!("/api/reports/{report_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unverified_users_cannot_submit_reports() {
    let (app, store) = spawn_app().await;

    // Burn the first-is-admin slot, then create an unverified second user.
    signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Ben", "Okafor", "ben@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Without a verified signin there is no way to get a token at all.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": "ben@example.com", "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bulk_status_update() {
    let (app, store) = spawn_app().await;

    let token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    let mut ids = Vec::new();
    for school in ["Alpha Academy", "Beta College"] {
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/reports",
            Some(&token),
            report_body(school),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/reports/update-status",
        Some(&token),
        serde_json::json!({ "report_ids": ids, "action": "approve" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 2);

    let (status, body) = send_get(&app, "/api/reports/filters?status=approved", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reports"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_report_filters() {
    let (app, store) = spawn_app().await;

    let token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    for school in ["Riverside Primary", "Hilltop Secondary"] {
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/reports",
            Some(&token),
            report_body(school),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_get(&app, "/api/reports/filters?search=Riverside", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"]["reports"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["school_name"], "Riverside Primary");

    let (status, _) = send_get(&app, "/api/reports/filters?status=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_listing_is_role_gated() {
    let (app, store) = spawn_app().await;

    let admin_token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;
    let user_token = signed_in_user(&app, &store, "Ben", "ben@example.com").await;

    let (status, _) = send_get(&app, "/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_get(&app, "/api/users", Some(&user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_get(&app, "/api/users", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    // The password hash must never appear in API responses.
    assert!(body["data"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let (app, store) = spawn_app().await;

    signed_in_user(&app, &store, "Ada", "ada@example.com").await;
    let user_token = signed_in_user(&app, &store, "Ben", "ben@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/add-user",
        Some(&user_token),
        serde_json::json!({
            "first_name": "Carol",
            "last_name": "Eze",
            "email": "carol@example.com",
            "password": "hunter2hunter2",
            "role": "teacher",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_get(&app, "/api/reports/export", Some(&user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_user_assigns_role() {
    let (app, store) = spawn_app().await;

    let admin_token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/users/add-user",
        Some(&admin_token),
        serde_json::json!({
            "first_name": "Carol",
            "last_name": "Eze",
            "email": "carol@example.com",
            "password": "hunter2hunter2",
            "role": "teacher",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "teacher");
    assert_eq!(body["data"]["is_admin"], false);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/add-user",
        Some(&admin_token),
        serde_json::json!({
            "first_name": "Dan",
            "last_name": "Ade",
            "email": "dan@example.com",
            "password": "hunter2hunter2",
            "role": "superuser",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_counts() {
    let (app, store) = spawn_app().await;

    let token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/reports",
        Some(&token),
        report_body("Summary School"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_get(&app, "/api/general/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_users"], 1);
    assert_eq!(body["data"]["total_reports"], 1);
    assert_eq!(body["data"]["pending_reports"], 1);
    assert_eq!(body["data"]["approved_reports"], 0);

    let daily = body["data"]["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 10);
    // Today is the last entry and carries the activity.
    let today = daily.last().unwrap();
    assert_eq!(today["users"], 1);
    assert_eq!(today["reports"], 1);
}

#[tokio::test]
async fn test_upload_requires_configured_media_host() {
    let (app, store) = spawn_app().await;

    let token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    let boundary = "X-INTEGRATION-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fakebytes\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/uploads")
                .header("Authorization", format!("Bearer {token}"))
                .header(
                    "Content-Type",
                    format!("{}; boundary={boundary}", mime::MULTIPART_FORM_DATA),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    // The default config leaves the media host disabled.
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_expired_otp_is_rejected() {
    let (app, store) = spawn_app().await;

    let email = "ada@example.com";
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signup",
        None,
        signup_body("Ada", "Obi", email),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Backdate the expiry; the code itself stays correct.
    let user = store.get_user_by_email(email).await.unwrap().unwrap();
    let otp = user.account_verification_otp.clone().unwrap();
    let past = (chrono::Utc::now() - chrono::Duration::minutes(1)).to_rfc3339();
    store.set_verification_otp(user, &otp, &past).await.unwrap();

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/users/verify-otp",
        None,
        serde_json::json!({ "otp": otp }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Re-issuing overwrites the stale code with a usable one.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/otp-verification",
        None,
        serde_json::json!({ "email": email }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fresh = stored_otp(&store, email).await;
    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/users/verify-otp",
        None,
        serde_json::json!({ "otp": fresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_account_verified"], true);
}

#[tokio::test]
async fn test_expired_reset_token_is_rejected() {
    let (app, store) = spawn_app().await;

    let email = "ada@example.com";
    signed_in_user(&app, &store, "Ada", email).await;

    let past = (chrono::Utc::now() - chrono::Duration::minutes(1)).to_rfc3339();
    let user_id = plant_reset_token(&store, email, "stale-reset-token", &past).await;

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user_id}/reset-password"),
        None,
        serde_json::json!({ "token": "stale-reset-token", "password": "newpassword123" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_rejects_reused_password() {
    let (app, store) = spawn_app().await;

    let email = "ada@example.com";
    signed_in_user(&app, &store, "Ada", email).await;

    let future = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
    let user_id = plant_reset_token(&store, email, "live-reset-token", &future).await;

    // Same password as before is a conflict and leaves the token usable.
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user_id}/reset-password"),
        None,
        serde_json::json!({ "token": "live-reset-token", "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{user_id}/reset-password"),
        None,
        serde_json::json!({ "token": "live-reset-token", "password": "brandnewpassword1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Only the new password signs in.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": email, "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": email, "password": "brandnewpassword1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_newsletter_broadcast() {
    let (app, store) = spawn_app().await;

    let admin_token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;
    let user_token = signed_in_user(&app, &store, "Ben", "ben@example.com").await;

    let newsletter = serde_json::json!({
        "subject": "Term update",
        "message": "<p>Repairs at Government College start next week.</p>",
    });

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/messages/send",
        Some(&user_token),
        newsletter.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/messages/send",
        Some(&admin_token),
        serde_json::json!({ "subject": "  ", "message": "body" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/messages/send",
        Some(&admin_token),
        newsletter,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Newsletter sent to 2 subscribers");
}

#[tokio::test]
async fn test_blocked_accounts_are_locked_out() {
    let (app, store) = spawn_app().await;

    let admin_token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;
    let user_token = signed_in_user(&app, &store, "Ben", "ben@example.com").await;

    let admin = store
        .get_user_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    let user = store
        .get_user_by_email("ben@example.com")
        .await
        .unwrap()
        .unwrap();

    // Admins cannot block themselves.
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{}/block", admin.id),
        Some(&admin_token),
        serde_json::json!({ "blocked": true }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{}/block", user.id),
        Some(&admin_token),
        serde_json::json!({ "blocked": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_blocked"], true);

    // Existing tokens stop working and sign-in is refused.
    let (status, _) = send_get(&app, "/api/users/profile", Some(&user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/users/signin",
        None,
        serde_json::json!({ "email": "ben@example.com", "password": "hunter2hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unblocking restores access.
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/users/{}/block", user.id),
        Some(&admin_token),
        serde_json::json!({ "blocked": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_blocked"], false);

    let (status, _) = send_get(&app, "/api/users/profile", Some(&user_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _store) = spawn_app().await;

    let (status, body) = send_get(&app, "/api/general/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_upload_listing_is_admin_only() {
    let (app, store) = spawn_app().await;

    let admin_token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;
    let user_token = signed_in_user(&app, &store, "Ben", "ben@example.com").await;

    let (status, _) = send_get(&app, "/api/uploads", Some(&user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_get(&app, "/api/uploads", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_profile_and_garbage_token() {
    let (app, store) = spawn_app().await;

    let token = signed_in_user(&app, &store, "Ada", "ada@example.com").await;

    let (status, body) = send_get(&app, "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");

    let (status, _) = send_get(&app, "/api/users/profile", Some("garbage.token.here")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
