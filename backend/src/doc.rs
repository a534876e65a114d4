//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every REST endpoint, the request/response schemas
//! they reference and the bearer-token security scheme. Swagger UI serves it
//! at `/docs` in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::inbound::http::assignments::{AssignmentRequest, AssignmentResponse, StatusRequest};
use crate::inbound::http::catalog::{
    StaffRequest, StaffResponse, SubjectRequest, SubjectResponse, VenueRequest, VenueResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::timetable::{SlotRequest, SlotResponse};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by /api/v1/auth/register or /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus backend API",
        description = "Student accounts, timetables, calendar export and assignments."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::me,
        crate::inbound::http::catalog::create_subject,
        crate::inbound::http::catalog::list_subjects,
        crate::inbound::http::catalog::create_staff,
        crate::inbound::http::catalog::list_staff,
        crate::inbound::http::catalog::create_venue,
        crate::inbound::http::catalog::list_venues,
        crate::inbound::http::timetable::create_slot,
        crate::inbound::http::timetable::get_slot,
        crate::inbound::http::timetable::slots_for_day,
        crate::inbound::http::timetable::slots_in_range,
        crate::inbound::http::timetable::export_calendar,
        crate::inbound::http::assignments::list_assignments,
        crate::inbound::http::assignments::create_assignment,
        crate::inbound::http::assignments::get_assignment,
        crate::inbound::http::assignments::update_assignment,
        crate::inbound::http::assignments::update_status,
        crate::inbound::http::assignments::delete_assignment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        UserResponse,
        AuthResponse,
        SubjectRequest,
        SubjectResponse,
        StaffRequest,
        StaffResponse,
        VenueRequest,
        VenueResponse,
        SlotRequest,
        SlotResponse,
        AssignmentRequest,
        AssignmentResponse,
        StatusRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login and the current account"),
        (name = "catalog", description = "Subjects, staff and venues"),
        (name = "timetable", description = "Timetable slots and calendar export"),
        (name = "assignments", description = "Per-user coursework tracking"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
