//! Timetable catalog handlers: subjects, staff and venues.
//!
//! Listing is public so timetable clients can label slots before login.
//! Creation requires a bearer token.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{NewStaff, NewSubject, NewVenue, Staff, Subject, Venue};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectRequest {
    pub code: String,
    pub name: String,
    pub short_name: Option<String>,
    /// Defaults to `theory`.
    pub subject_type: Option<String>,
    pub credits: Option<i32>,
    pub department: Option<String>,
    pub semester: Option<i32>,
    pub color: Option<String>,
}

impl From<SubjectRequest> for NewSubject {
    fn from(value: SubjectRequest) -> Self {
        Self {
            code: value.code,
            name: value.name,
            short_name: value.short_name,
            subject_type: value.subject_type,
            credits: value.credits,
            department: value.department,
            semester: value.semester,
            color: value.color,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub short_name: Option<String>,
    pub subject_type: String,
    pub credits: Option<i32>,
    pub department: Option<String>,
    pub semester: Option<i32>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Subject> for SubjectResponse {
    fn from(value: Subject) -> Self {
        Self {
            id: value.id,
            code: value.code,
            name: value.name,
            short_name: value.short_name,
            subject_type: value.subject_type,
            credits: value.credits,
            department: value.department,
            semester: value.semester,
            color: value.color,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StaffRequest {
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub cabin: Option<String>,
}

impl From<StaffRequest> for NewStaff {
    fn from(value: StaffRequest) -> Self {
        Self {
            name: value.name,
            title: value.title,
            email: value.email,
            phone: value.phone,
            department: value.department,
            designation: value.designation,
            cabin: value.cabin,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffResponse {
    pub id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub cabin: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Staff> for StaffResponse {
    fn from(value: Staff) -> Self {
        Self {
            id: value.id,
            name: value.name,
            title: value.title,
            email: value.email,
            phone: value.phone,
            department: value.department,
            designation: value.designation,
            cabin: value.cabin,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VenueRequest {
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    /// Defaults to `classroom`.
    pub venue_type: Option<String>,
    pub facilities: Vec<String>,
}

impl From<VenueRequest> for NewVenue {
    fn from(value: VenueRequest) -> Self {
        Self {
            name: value.name,
            building: value.building,
            floor: value.floor,
            capacity: value.capacity,
            venue_type: value.venue_type,
            facilities: value.facilities,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub id: Uuid,
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub venue_type: String,
    pub facilities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Venue> for VenueResponse {
    fn from(value: Venue) -> Self {
        Self {
            id: value.id,
            name: value.name,
            building: value.building,
            floor: value.floor,
            capacity: value.capacity,
            venue_type: value.venue_type,
            facilities: value.facilities,
            created_at: value.created_at,
        }
    }
}

fn collect<T, R: From<T>>(items: Vec<T>) -> Vec<R> {
    items.into_iter().map(R::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/v1/subjects",
    request_body = SubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "createSubject"
)]
#[post("/subjects")]
pub async fn create_subject(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<SubjectRequest>,
) -> ApiResult<HttpResponse> {
    let subject = state
        .catalog
        .create_subject(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(SubjectResponse::from(subject)))
}

/// All subjects ordered by code.
#[utoipa::path(
    get,
    path = "/api/v1/subjects",
    responses((status = 200, description = "Subjects", body = [SubjectResponse])),
    tags = ["catalog"],
    operation_id = "listSubjects",
    security([])
)]
#[get("/subjects")]
pub async fn list_subjects(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SubjectResponse>>> {
    Ok(web::Json(collect(state.catalog.list_subjects().await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff",
    request_body = StaffRequest,
    responses(
        (status = 201, description = "Staff member created", body = StaffResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "createStaff"
)]
#[post("/staff")]
pub async fn create_staff(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<StaffRequest>,
) -> ApiResult<HttpResponse> {
    let staff = state.catalog.create_staff(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(StaffResponse::from(staff)))
}

/// All staff ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/staff",
    responses((status = 200, description = "Staff", body = [StaffResponse])),
    tags = ["catalog"],
    operation_id = "listStaff",
    security([])
)]
#[get("/staff")]
pub async fn list_staff(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<StaffResponse>>> {
    Ok(web::Json(collect(state.catalog.list_staff().await?)))
}

#[utoipa::path(
    post,
    path = "/api/v1/venues",
    request_body = VenueRequest,
    responses(
        (status = 201, description = "Venue created", body = VenueResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "createVenue"
)]
#[post("/venues")]
pub async fn create_venue(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<VenueRequest>,
) -> ApiResult<HttpResponse> {
    let venue = state.catalog.create_venue(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(VenueResponse::from(venue)))
}

/// All venues ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/venues",
    responses((status = 200, description = "Venues", body = [VenueResponse])),
    tags = ["catalog"],
    operation_id = "listVenues",
    security([])
)]
#[get("/venues")]
pub async fn list_venues(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<VenueResponse>>> {
    Ok(web::Json(collect(state.catalog.list_venues().await?)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::TestContext;
    use crate::test_support::{sample_staff, sample_subject, sample_venue};

    #[rstest]
    #[actix_web::test]
    async fn listing_is_public_and_ordered() {
        let context = TestContext::new();
        context.backend.catalog.insert_subject(sample_subject("CS302", "Networks"));
        context.backend.catalog.insert_subject(sample_subject("CS301", "Compilers"));
        context.backend.catalog.insert_staff(sample_staff("Dr. Turing"));
        context.backend.catalog.insert_venue(sample_venue("LH-1"));
        let app = actix_test::init_service(context.app()).await;

        let subjects: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/subjects").to_request(),
        )
        .await;
        let codes: Vec<&str> = subjects
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|subject| subject["code"].as_str())
            .collect();
        assert_eq!(codes, ["CS301", "CS302"]);

        for uri in ["/api/v1/staff", "/api/v1/venues"] {
            let listed: Value = actix_test::call_and_read_body_json(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert_eq!(listed.as_array().map(Vec::len), Some(1), "{uri}");
        }
    }

    #[rstest]
    #[case::subject("/api/v1/subjects", json!({"code": "CS301", "name": "Compilers"}))]
    #[case::staff("/api/v1/staff", json!({"name": "Dr. Turing"}))]
    #[case::venue("/api/v1/venues", json!({"name": "LH-1"}))]
    #[actix_web::test]
    async fn creation_requires_a_token(#[case] uri: &str, #[case] body: Value) {
        let context = TestContext::new();
        let app = actix_test::init_service(context.app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case::subject(
        "/api/v1/subjects",
        json!({"code": "CS301", "name": "Compilers"}),
        "subjectType",
        "theory"
    )]
    #[case::venue("/api/v1/venues", json!({"name": "LH-1"}), "venueType", "classroom")]
    #[actix_web::test]
    async fn creation_applies_type_defaults(
        #[case] uri: &str,
        #[case] body: Value,
        #[case] key: &str,
        #[case] expected: &str,
    ) {
        let context = TestContext::new();
        let app = actix_test::init_service(context.app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .insert_header(context.bearer())
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(response).await;
        assert_eq!(created[key], expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn subject_without_code_is_rejected() {
        let context = TestContext::new();
        let app = actix_test::init_service(context.app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/subjects")
                .insert_header(context.bearer())
                .set_json(json!({"name": "Compilers"}))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "code");
    }
}
