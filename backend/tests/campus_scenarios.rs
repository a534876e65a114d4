//! End-to-end scenarios over the assembled `/api/v1` router.
//!
//! Requests travel through the trace middleware, the bearer-token gate and
//! the real services, backed by in-memory stores and an HMAC token authority
//! whose clock is frozen.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::http::{Method, StatusCode};
use actix_web::test as actix_test;
use actix_web::{App, web};
use campus_backend::Trace;
use campus_backend::domain::ports::TokenAuthority;
use campus_backend::domain::{AuthError, TRACE_ID_HEADER, UserId};
use campus_backend::inbound::http::configure;
use campus_backend::outbound::token::JwtTokenAuthority;
use campus_backend::test_support::{
    FixtureClock, InMemoryBackend, PlainTextHasher, fixture_timestamp,
};
use chrono::Duration;
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const SECRET: &str = "scenario-signing-secret";

/// Shared stores plus a way to build the app at any instant.
struct Campus {
    backend: InMemoryBackend,
}

impl Campus {
    fn clock_at(offset: Duration) -> Arc<dyn Clock> {
        Arc::new(FixtureClock::at(fixture_timestamp() + offset))
    }

    fn authority(offset: Duration) -> JwtTokenAuthority {
        JwtTokenAuthority::new(SECRET, Self::clock_at(offset))
    }

    async fn app_at(
        &self,
        offset: Duration,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
    {
        let clock = Self::clock_at(offset);
        let state = self.backend.http_state(
            Arc::new(PlainTextHasher),
            Arc::new(JwtTokenAuthority::new(SECRET, clock.clone())),
            clock,
        );
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(Trace)
                .configure(configure),
        )
        .await
    }
}

#[fixture]
fn campus() -> Campus {
    Campus {
        backend: InMemoryBackend::default(),
    }
}

async fn call<S>(
    app: &S,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = actix_test::TestRequest::default()
        .method(method)
        .uri(uri);
    if let Some(token) = token {
        request = request.insert_header((AUTHORIZATION, format!("Bearer {token}")));
    }
    if let Some(body) = body {
        request = request.set_json(body);
    }
    actix_test::call_service(app, request.to_request()).await
}

async fn json_of(response: ServiceResponse) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn register<S>(app: &S, email: &str) -> (String, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let body = json!({
        "email": email,
        "password": "correct horse",
        "fullName": "Scenario Student",
        "registerNumber": "21CS042",
        "department": "CSE",
        "year": 3,
        "semester": 5
    });
    let (status, body) = json_of(
        call(app, Method::POST, "/api/v1/auth/register", None, Some(body)).await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["user"]["id"].as_str().expect("user id").to_owned();
    let token = body["token"].as_str().expect("token").to_owned();
    (id, token)
}

#[rstest]
#[actix_web::test]
async fn login_token_names_the_registered_user(campus: Campus) {
    let app = campus.app_at(Duration::zero()).await;
    let (user_id, _) = register(&app, "ada@campus.edu").await;

    let (status, body) = json_of(
        call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ADA@campus.edu", "password": "correct horse"})),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token");
    let subject = Campus::authority(Duration::zero())
        .validate_token(token)
        .expect("valid token");
    assert_eq!(subject.to_string(), user_id);

    let (status, me) = json_of(call(&app, Method::GET, "/api/v1/auth/me", Some(token), None).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());
}

#[rstest]
#[actix_web::test]
async fn weekday_view_lists_only_matching_recurring_slots(campus: Campus) {
    let app = campus.app_at(Duration::zero()).await;
    let (_, token) = register(&app, "ada@campus.edu").await;
    let slot = json!({"dayOfWeek": 1, "startTime": "09:00", "endTime": "10:00", "isRecurring": true});
    let (status, created) = json_of(
        call(&app, Method::POST, "/api/v1/timetable/slots", Some(&token), Some(slot)).await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let (_, monday) =
        json_of(call(&app, Method::GET, "/api/v1/timetable/day/1", Some(&token), None).await).await;
    let (_, tuesday) =
        json_of(call(&app, Method::GET, "/api/v1/timetable/day/2", Some(&token), None).await).await;

    assert_eq!(monday.as_array().map(Vec::len), Some(1));
    assert_eq!(monday[0]["id"], created["id"]);
    assert_eq!(tuesday, json!([]));
}

#[rstest]
#[case::covering_range("2024-03-10", "2024-03-20", 1)]
#[case::range_after_the_date("2024-03-16", "2024-03-20", 0)]
#[actix_web::test]
async fn range_view_matches_one_off_slots_by_date(
    campus: Campus,
    #[case] start: &str,
    #[case] end: &str,
    #[case] expected: usize,
) {
    let app = campus.app_at(Duration::zero()).await;
    let (_, token) = register(&app, "ada@campus.edu").await;
    let slot = json!({
        "startTime": "14:00",
        "endTime": "16:00",
        "isRecurring": false,
        "specificDate": "2024-03-15"
    });
    call(&app, Method::POST, "/api/v1/timetable/slots", Some(&token), Some(slot)).await;

    let uri = format!("/api/v1/timetable/range?start={start}&end={end}");
    let (status, body) = json_of(call(&app, Method::GET, &uri, Some(&token), None).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(expected));
}

#[rstest]
#[actix_web::test]
async fn export_places_a_monday_slot_after_a_wednesday_start(campus: Campus) {
    let app = campus.app_at(Duration::zero()).await;
    let (_, token) = register(&app, "ada@campus.edu").await;
    let subject = json!({"code": "CS301", "name": "Operating Systems"});
    let (_, subject) = json_of(
        call(&app, Method::POST, "/api/v1/subjects", Some(&token), Some(subject)).await,
    )
    .await;
    let slot = json!({
        "subjectId": subject["id"],
        "dayOfWeek": 1,
        "startTime": "09:00",
        "endTime": "10:00"
    });
    call(&app, Method::POST, "/api/v1/timetable/slots", Some(&token), Some(slot)).await;

    let response = call(
        &app,
        Method::GET,
        "/api/v1/timetable/export.ics?start=2024-03-13&end=2024-03-19",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/calendar"))
    );
    let body = String::from_utf8(actix_test::read_body(response).await.to_vec()).expect("utf-8");

    assert!(body.contains("DTSTART:20240318T090000\r\n"), "{body}");
    assert!(!body.contains("DTSTART:20240311"));
    assert!(body.contains("SUMMARY:Operating Systems - lecture\r\n"));
    assert!(body.contains("LOCATION:N/A\r\n"));
}

#[rstest]
#[actix_web::test]
async fn strangers_get_forbidden_rather_than_not_found(campus: Campus) {
    let app = campus.app_at(Duration::zero()).await;
    let (_, owner) = register(&app, "ada@campus.edu").await;
    let (_, stranger) = register(&app, "grace@campus.edu").await;
    let (_, assignment) = json_of(
        call(
            &app,
            Method::POST,
            "/api/v1/assignments",
            Some(&owner),
            Some(json!({"title": "Scheduler essay", "dueDate": "2024-03-14T17:00:00Z"})),
        )
        .await,
    )
    .await;
    let uri = format!(
        "/api/v1/assignments/{}",
        assignment["id"].as_str().expect("assignment id")
    );

    let (status, body) = json_of(call(&app, Method::GET, &uri, Some(&stranger), None).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Assignment does not belong to user");

    let (status, _) = json_of(call(&app, Method::DELETE, &uri, Some(&stranger), None).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = json_of(call(&app, Method::GET, &uri, Some(&owner), None).await).await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn expired_tokens_are_refused(campus: Campus) {
    let today = campus.app_at(Duration::zero()).await;
    let (_, token) = register(&today, "ada@campus.edu").await;
    let next_week = campus.app_at(Duration::days(8)).await;

    let response = call(&next_week, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let (status, body) = json_of(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token expired");
    assert_eq!(
        Campus::authority(Duration::days(8)).validate_token(&token),
        Err(AuthError::Expired)
    );
}

#[rstest]
#[case::wrong_password("ada@campus.edu", "not the password")]
#[case::unknown_user("nobody@campus.edu", "correct horse")]
#[actix_web::test]
async fn failed_logins_share_one_message(
    campus: Campus,
    #[case] email: &str,
    #[case] password: &str,
) {
    let app = campus.app_at(Duration::zero()).await;
    register(&app, "ada@campus.edu").await;

    let (status, body) = json_of(
        call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
}

#[rstest]
fn tokens_round_trip_until_expiry() {
    let user = UserId::random();
    let token = Campus::authority(Duration::zero())
        .issue_token(&user)
        .expect("token issued");

    assert_eq!(
        Campus::authority(Duration::days(6)).validate_token(&token),
        Ok(user)
    );
    assert_eq!(
        Campus::authority(Duration::days(7)).validate_token(&token),
        Err(AuthError::Expired)
    );
}
