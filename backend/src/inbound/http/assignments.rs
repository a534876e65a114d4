//! Assignment handlers. Every route acts on the authenticated user's own
//! assignments; touching someone else's yields 403.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    Assignment, AssignmentDetails, AssignmentFields, AssignmentFilter, AssignmentRevision,
    AssignmentStatus, AssignmentValidationError, DEFAULT_ASSIGNMENT_TYPE,
    DEFAULT_REMINDER_BEFORE_HOURS, Error, Priority,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_optional_date, parse_optional_rfc3339_timestamp,
    parse_optional_uuid, parse_uuid,
};

/// Assignment body for create and full update.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignmentRequest {
    pub subject_id: Option<String>,
    pub staff_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Defaults to `homework`.
    pub assignment_type: Option<String>,
    #[schema(example = "2024-03-11")]
    pub assigned_date: Option<String>,
    /// RFC 3339. Required on create; omitted on update keeps the stored value.
    #[schema(example = "2024-03-18T17:00:00Z")]
    pub due_date: Option<String>,
    /// Defaults to `pending`.
    pub status: Option<String>,
    pub max_marks: Option<f64>,
    pub obtained_marks: Option<f64>,
    pub feedback: Option<String>,
    /// Defaults to `medium`.
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    /// Defaults to `true`.
    pub reminder_enabled: Option<bool>,
    /// Defaults to 24.
    pub reminder_before_hours: Option<i32>,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
}

fn map_validation(err: AssignmentValidationError) -> Error {
    invalid_field_error(err.field(), err.to_string())
}

impl AssignmentRequest {
    fn into_revision(self) -> Result<AssignmentRevision, Error> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<AssignmentStatus>)
            .transpose()
            .map_err(map_validation)?
            .unwrap_or_default();
        let priority = self
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()
            .map_err(map_validation)?
            .unwrap_or_default();

        Ok(AssignmentFields {
            subject_id: parse_optional_uuid(
                self.subject_id.as_deref(),
                FieldName::new("subjectId"),
            )?,
            staff_id: parse_optional_uuid(self.staff_id.as_deref(), FieldName::new("staffId"))?,
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            assignment_type: self
                .assignment_type
                .unwrap_or_else(|| DEFAULT_ASSIGNMENT_TYPE.to_owned()),
            assigned_date: parse_optional_date(
                self.assigned_date.as_deref(),
                FieldName::new("assignedDate"),
            )?,
            due_date: parse_optional_rfc3339_timestamp(
                self.due_date.as_deref(),
                FieldName::new("dueDate"),
            )?,
            status,
            max_marks: self.max_marks,
            obtained_marks: self.obtained_marks,
            feedback: self.feedback,
            priority,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            reminder_enabled: self.reminder_enabled.unwrap_or(true),
            reminder_before_hours: self
                .reminder_before_hours
                .unwrap_or(DEFAULT_REMINDER_BEFORE_HOURS),
            tags: self.tags,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
        })
    }

    fn into_details(self) -> Result<AssignmentDetails, Error> {
        let revision = self.into_revision()?;
        let due = revision
            .due_date
            .ok_or_else(|| invalid_field_error("dueDate", "dueDate is required"))?;
        Ok(revision.map_due(|_| due))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StatusRequest {
    #[schema(example = "submitted")]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignmentListQuery {
    /// `pending` or `overdue`; omitted lists everything.
    pub filter: Option<String>,
}

fn parse_filter(raw: Option<&str>) -> Result<AssignmentFilter, Error> {
    match raw {
        None => Ok(AssignmentFilter::All),
        Some("pending") => Ok(AssignmentFilter::Pending),
        Some("overdue") => Ok(AssignmentFilter::Overdue),
        Some(_) => Err(invalid_field_error(
            "filter",
            "filter must be pending or overdue",
        )),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: String,
    pub assigned_date: Option<NaiveDate>,
    pub due_date: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: String,
    pub max_marks: Option<f64>,
    pub obtained_marks: Option<f64>,
    pub feedback: Option<String>,
    pub priority: String,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub reminder_enabled: bool,
    pub reminder_before_hours: i32,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(assignment: Assignment) -> Self {
        let id = assignment.id();
        let user_id = *assignment.user_id().as_uuid();
        let submitted_at = assignment.submitted_at();
        let created_at = assignment.created_at();
        let updated_at = assignment.updated_at();
        let details = assignment.details().clone();
        Self {
            id,
            user_id,
            subject_id: details.subject_id,
            staff_id: details.staff_id,
            title: details.title,
            description: details.description,
            instructions: details.instructions,
            assignment_type: details.assignment_type,
            assigned_date: details.assigned_date,
            due_date: details.due_date,
            submitted_at,
            status: details.status.to_string(),
            max_marks: details.max_marks,
            obtained_marks: details.obtained_marks,
            feedback: details.feedback,
            priority: details.priority.to_string(),
            estimated_hours: details.estimated_hours,
            actual_hours: details.actual_hours,
            reminder_enabled: details.reminder_enabled,
            reminder_before_hours: details.reminder_before_hours,
            tags: details.tags,
            is_recurring: details.is_recurring,
            recurrence_pattern: details.recurrence_pattern,
            created_at,
            updated_at,
        }
    }
}

fn assignment_id(path: web::Path<String>) -> Result<Uuid, Error> {
    parse_uuid(&path.into_inner(), FieldName::new("id"))
}

/// The caller's assignments ordered by due date.
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    params(AssignmentListQuery),
    responses(
        (status = 200, description = "Assignments", body = [AssignmentResponse]),
        (status = 400, description = "Unknown filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "listAssignments"
)]
#[get("/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<AssignmentListQuery>,
) -> ApiResult<web::Json<Vec<AssignmentResponse>>> {
    let filter = parse_filter(query.filter.as_deref())?;
    let assignments = state
        .assignments_query
        .list_assignments(user.user_id(), filter)
        .await?;
    Ok(web::Json(
        assignments
            .into_iter()
            .map(AssignmentResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "createAssignment"
)]
#[post("/assignments")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AssignmentRequest>,
) -> ApiResult<HttpResponse> {
    let details = payload.into_inner().into_details()?;
    let created = state
        .assignments
        .create_assignment(user.user_id(), details)
        .await?;
    Ok(HttpResponse::Created().json(AssignmentResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    params(("id" = String, Path, description = "Assignment identifier")),
    responses(
        (status = 200, description = "Assignment", body = AssignmentResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Assignment belongs to another user", body = ErrorSchema),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "getAssignment"
)]
#[get("/assignments/{id}")]
pub async fn get_assignment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let id = assignment_id(path)?;
    let assignment = state
        .assignments_query
        .assignment(user.user_id(), id)
        .await?;
    Ok(web::Json(assignment.into()))
}

/// Replace an assignment's content.
#[utoipa::path(
    put,
    path = "/api/v1/assignments/{id}",
    params(("id" = String, Path, description = "Assignment identifier")),
    request_body = AssignmentRequest,
    responses(
        (status = 200, description = "Updated assignment", body = AssignmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Assignment belongs to another user", body = ErrorSchema),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "updateAssignment"
)]
#[put("/assignments/{id}")]
pub async fn update_assignment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<AssignmentRequest>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let id = assignment_id(path)?;
    let revision = payload.into_inner().into_revision()?;
    let updated = state
        .assignments
        .update_assignment(user.user_id(), id, revision)
        .await?;
    Ok(web::Json(updated.into()))
}

/// Change only the status. Moving to `submitted` records the submission time.
#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}/status",
    params(("id" = String, Path, description = "Assignment identifier")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated assignment", body = AssignmentResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Assignment belongs to another user", body = ErrorSchema),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "updateAssignmentStatus"
)]
#[patch("/assignments/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let id = assignment_id(path)?;
    let status = payload
        .status
        .parse::<AssignmentStatus>()
        .map_err(map_validation)?;
    let updated = state
        .assignments
        .update_status(user.user_id(), id, status)
        .await?;
    Ok(web::Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    params(("id" = String, Path, description = "Assignment identifier")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Assignment belongs to another user", body = ErrorSchema),
        (status = 404, description = "Assignment not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "deleteAssignment"
)]
#[delete("/assignments/{id}")]
pub async fn delete_assignment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = assignment_id(path)?;
    state
        .assignments
        .delete_assignment(user.user_id(), id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "assignments_tests.rs"]
mod tests;
