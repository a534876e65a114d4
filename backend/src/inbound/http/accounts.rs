//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"ada@campus.edu","password":"...",...}
//! POST /api/v1/auth/login    {"email":"ada@campus.edu","password":"..."}
//! GET  /api/v1/auth/me       Authorization: Bearer <token>
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::AuthSession;
use crate::domain::{
    Error, LoginCredentials, LoginValidationError, NotificationPreferences, Registration,
    RegistrationInput, RegistrationValidationError, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_field_error;

/// Registration body. Absent fields are reported by name rather than as a
/// generic parse failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub register_number: String,
    pub department: String,
    pub year: i32,
    pub semester: i32,
    pub section: Option<String>,
    pub phone: Option<String>,
}

impl From<RegisterRequest> for RegistrationInput {
    fn from(value: RegisterRequest) -> Self {
        Self {
            email: value.email,
            password: value.password,
            full_name: value.full_name,
            register_number: value.register_number,
            department: value.department,
            year: value.year,
            semester: value.semester,
            section: value.section,
            phone: value.phone,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferencesBody {
    pub push: bool,
    pub email: bool,
    pub morning_briefing: bool,
}

impl From<NotificationPreferences> for NotificationPreferencesBody {
    fn from(value: NotificationPreferences) -> Self {
        Self {
            push: value.push,
            email: value.email,
            morning_briefing: value.morning_briefing,
        }
    }
}

/// Public view of an account. The password digest is never exposed.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub register_number: String,
    pub department: String,
    pub year: i32,
    pub semester: i32,
    pub section: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: String,
    pub timezone: String,
    pub notification_prefs: NotificationPreferencesBody,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let profile = user.profile();
        Self {
            id: *user.id().as_uuid(),
            email: user.email().to_string(),
            full_name: profile.full_name.clone(),
            register_number: profile.register_number.clone(),
            department: profile.department.clone(),
            year: profile.year,
            semester: profile.semester,
            section: profile.section.clone(),
            phone: profile.phone.clone(),
            avatar_url: profile.avatar_url.clone(),
            theme: profile.theme.clone(),
            timezone: profile.timezone.clone(),
            notification_prefs: profile.notification_prefs.into(),
            is_active: user.is_active(),
            is_verified: user.is_verified(),
            last_login_at: user.last_login_at(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: UserResponse::from(&session.user),
            token: session.token,
        }
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    invalid_field_error(err.field(), err.to_string())
}

fn map_login_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    invalid_field_error(field, err.to_string())
}

/// Create an account and return it with a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(RegistrationInput::from(payload.into_inner()))
        .map_err(map_registration_error)?;
    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_error)?;
    let session = state.accounts.login(&credentials).await?;
    Ok(web::Json(AuthResponse::from(session)))
}

/// The authenticated caller's account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let account = state.profiles.fetch_profile(user.user_id()).await?;
    Ok(web::Json(UserResponse::from(&account)))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
