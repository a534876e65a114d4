//! Tests for account handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{FixtureTokenAuthority, UserRepository};
use crate::inbound::http::test_utils::TestContext;
use crate::test_support::sample_user_draft;

#[fixture]
fn registration_body() -> Value {
    json!({
        "email": "Ada@Campus.edu",
        "password": "correct horse",
        "fullName": "Ada Lovelace",
        "registerNumber": "21CS001",
        "department": "CSE",
        "year": 2,
        "semester": 3
    })
}

async fn post_json(context: &TestContext, uri: &str, body: &Value) -> (StatusCode, Value) {
    let app = actix_test::init_service(context.app()).await;
    let request = actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&bytes).expect("JSON body"))
}

#[rstest]
#[actix_web::test]
async fn register_returns_created_user_and_token(registration_body: Value) {
    let context = TestContext::new();
    let (status, body) = post_json(&context, "/api/v1/auth/register", &registration_body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token"], FixtureTokenAuthority::TOKEN);
    assert_eq!(body["user"]["email"], "ada@campus.edu");
    assert_eq!(body["user"]["theme"], "system");
    assert_eq!(body["user"]["notificationPrefs"]["morningBriefing"], true);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_conflicts(registration_body: Value) {
    let context = TestContext::new();
    post_json(&context, "/api/v1/auth/register", &registration_body).await;
    let (status, body) = post_json(&context, "/api/v1/auth/register", &registration_body).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "user with this email already exists");
}

#[rstest]
#[case::year("year", json!(7), "year")]
#[case::password("password", json!("short"), "password")]
#[case::name("fullName", json!("  "), "fullName")]
#[actix_web::test]
async fn invalid_registration_names_the_field(
    mut registration_body: Value,
    #[case] key: &str,
    #[case] value: Value,
    #[case] field: &str,
) {
    registration_body[key] = value;
    let context = TestContext::new();
    let (status, body) = post_json(&context, "/api/v1/auth/register", &registration_body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn missing_fields_are_reported_by_name() {
    let context = TestContext::new();
    let (status, body) = post_json(
        &context,
        "/api/v1/auth/register",
        &json!({"email": "ada@campus.edu", "password": "correct horse"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "fullName");
}

#[rstest]
#[actix_web::test]
async fn login_after_registration_succeeds(registration_body: Value) {
    let context = TestContext::new();
    post_json(&context, "/api/v1/auth/register", &registration_body).await;

    let (status, body) = post_json(
        &context,
        "/api/v1/auth/login",
        &json!({"email": "ada@campus.edu", "password": "correct horse"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["registerNumber"], "21CS001");
    assert!(body["token"].is_string());
}

#[rstest]
#[case::wrong_password("ada@campus.edu", "battery staple")]
#[case::unknown_email("grace@campus.edu", "correct horse")]
#[actix_web::test]
async fn bad_credentials_are_unauthorised(
    registration_body: Value,
    #[case] email: &str,
    #[case] password: &str,
) {
    let context = TestContext::new();
    post_json(&context, "/api/v1/auth/register", &registration_body).await;

    let (status, body) = post_json(
        &context,
        "/api/v1/auth/login",
        &json!({"email": email, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let context = TestContext::new();
    let app = actix_test::init_service(context.app()).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn me_returns_the_token_owner() {
    let context = TestContext::new();
    let mut draft = sample_user_draft("ada@campus.edu", "correct horse");
    draft.id = context.owner();
    context
        .backend
        .users
        .create(&User::from(draft))
        .await
        .expect("seed user");

    let app = actix_test::init_service(context.app()).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(context.bearer())
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["id"], context.owner().to_string());
    assert_eq!(body["email"], "ada@campus.edu");
}

#[rstest]
#[actix_web::test]
async fn me_without_token_is_unauthorised() {
    let context = TestContext::new();
    let app = actix_test::init_service(context.app()).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
