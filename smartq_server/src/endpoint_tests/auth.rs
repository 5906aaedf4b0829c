use actix_web::{http::StatusCode, web, web::ServiceConfig};
use smartq_engine::AuthApi;

use super::{
    helpers::{get_request, issue_token, post_request, seeded_user, user_claims},
    mocks::MockBackend,
};
use crate::routes::{LoginRoute, ProfileRoute, RegisterRoute};

#[actix_web::test]
async fn register_creates_account_and_logs_in() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({
        "email": "user-1@campus.test",
        "password": "hunter2",
        "name": "Priya Sharma",
        "phone": "+91-98765-43210"
    });
    let (status, body) = post_request("", "/auth/register", body, configure_register).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains("\"token\":"), "No access token in {body}");
    assert!(body.contains("user-1@campus.test"));
    assert!(!body.contains("passwordHash"), "Password hash leaked: {body}");
}

#[actix_web::test]
async fn login_with_correct_password() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "email": "user-1@campus.test", "password": "hunter2" });
    let (status, body) = post_request("", "/auth/login", body, configure_login).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"token\":"), "No access token in {body}");
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "email": "user-1@campus.test", "password": "letmein" });
    let (status, body) = post_request("", "/auth/login", body, configure_login).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("The email or password presented is incorrect."), "Unexpected body: {body}");
}

#[actix_web::test]
async fn profile_without_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/auth/profile", configure_profile).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided."), "Unexpected body: {body}");
}

#[actix_web::test]
async fn profile_with_tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(user_claims("user-1"));
    let len = token.len();
    token.replace_range(len - 10..len - 5, "AAAAA");
    let (status, body) = get_request(&token, "/auth/profile", configure_profile).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Access token is invalid."), "Unexpected body: {body}");
}

#[actix_web::test]
async fn profile_returns_the_callers_account() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(user_claims("user-1"));
    let (status, body) = get_request(&token, "/auth/profile", configure_profile).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("user-1@campus.test"));
    assert!(!body.contains("passwordHash"), "Password hash leaked: {body}");
}

fn configure_register(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_create_user().returning(|new_user| {
        let mut user = seeded_user("user-1", "hunter2");
        user.email = new_user.email;
        user.name = new_user.name;
        user.phone = new_user.phone;
        user.password_hash = new_user.password_hash;
        Ok(user)
    });
    let api = AuthApi::new(backend);
    cfg.service(RegisterRoute::<MockBackend>::new()).app_data(web::Data::new(api));
}

fn configure_login(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_email().returning(|_| Ok(Some(seeded_user("user-1", "hunter2"))));
    let api = AuthApi::new(backend);
    cfg.service(LoginRoute::<MockBackend>::new()).app_data(web::Data::new(api));
}

fn configure_profile(cfg: &mut ServiceConfig) {
    let mut backend = MockBackend::new();
    backend.expect_fetch_user_by_id().returning(|user_id| Ok(Some(seeded_user(user_id, "hunter2"))));
    let api = AuthApi::new(backend);
    cfg.service(ProfileRoute::<MockBackend>::new()).app_data(web::Data::new(api));
}
