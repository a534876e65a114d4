//! Timetable handlers: slot creation, schedule views and calendar export.
//!
//! ```text
//! POST /api/v1/timetable/slots
//! GET  /api/v1/timetable/slots/{id}
//! GET  /api/v1/timetable/day/{dayOfWeek}
//! GET  /api/v1/timetable/range?start=2024-03-11&end=2024-03-15
//! GET  /api/v1/timetable/export.ics?start=2024-03-11
//! ```

use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::ExportRange;
use crate::domain::{DayOfWeek, Error, NewSlot, NewSlotInput, SlotWindow, TimetableSlot};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_date, parse_optional_date, parse_optional_uuid,
    parse_time, parse_uuid,
};

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
const CALENDAR_DISPOSITION: &str = "attachment; filename=timetable.ics";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Slot creation body. Identifiers, dates and times arrive as strings and
/// are parsed with field-tagged errors.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotRequest {
    pub subject_id: Option<String>,
    pub staff_id: Option<String>,
    pub venue_id: Option<String>,
    /// 0 = Sunday .. 6 = Saturday. Optional for one-off slots.
    pub day_of_week: Option<i32>,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "10:00")]
    pub end_time: String,
    pub period_number: Option<i32>,
    /// Defaults to `lecture`.
    pub slot_type: Option<String>,
    /// Defaults to `true`.
    pub is_recurring: Option<bool>,
    #[schema(example = "2024-03-15")]
    pub specific_date: Option<String>,
    pub notes: Option<String>,
    pub batch_filter: Option<String>,
}

impl SlotRequest {
    fn into_new_slot(self) -> Result<NewSlot, Error> {
        let input = NewSlotInput {
            subject_id: parse_optional_uuid(
                self.subject_id.as_deref(),
                FieldName::new("subjectId"),
            )?,
            staff_id: parse_optional_uuid(self.staff_id.as_deref(), FieldName::new("staffId"))?,
            venue_id: parse_optional_uuid(self.venue_id.as_deref(), FieldName::new("venueId"))?,
            day_of_week: self.day_of_week,
            start_time: parse_time(&self.start_time, FieldName::new("startTime"))?,
            end_time: parse_time(&self.end_time, FieldName::new("endTime"))?,
            period_number: self.period_number,
            slot_type: self.slot_type,
            is_recurring: self.is_recurring.unwrap_or(true),
            specific_date: parse_optional_date(
                self.specific_date.as_deref(),
                FieldName::new("specificDate"),
            )?,
            notes: self.notes,
            batch_filter: self.batch_filter,
        };
        NewSlot::try_from(input).map_err(|err| invalid_field_error(err.field(), err.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
    pub day_of_week: u8,
    #[schema(example = "09:00:00")]
    pub start_time: String,
    #[schema(example = "10:00:00")]
    pub end_time: String,
    pub period_number: Option<i32>,
    pub slot_type: String,
    pub is_recurring: bool,
    pub specific_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub batch_filter: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn wire_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

impl From<&TimetableSlot> for SlotResponse {
    fn from(slot: &TimetableSlot) -> Self {
        Self {
            id: slot.id(),
            user_id: *slot.user_id().as_uuid(),
            subject_id: slot.subject_id(),
            staff_id: slot.staff_id(),
            venue_id: slot.venue_id(),
            day_of_week: slot.day_of_week().number(),
            start_time: wire_time(slot.start_time()),
            end_time: wire_time(slot.end_time()),
            period_number: slot.period_number(),
            slot_type: slot.slot_type().to_owned(),
            is_recurring: slot.is_recurring(),
            specific_date: slot.specific_date(),
            notes: slot.notes().map(str::to_owned),
            batch_filter: slot.batch_filter().map(str::to_owned),
            is_active: slot.is_active(),
            created_at: slot.created_at(),
            updated_at: slot.updated_at(),
        }
    }
}

fn slot_list(slots: &[TimetableSlot]) -> Vec<SlotResponse> {
    slots.iter().map(SlotResponse::from).collect()
}

/// Inclusive date bounds as query parameters.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// First day, `YYYY-MM-DD`.
    pub start: Option<String>,
    /// Last day, `YYYY-MM-DD`.
    pub end: Option<String>,
}

fn window_error(message: String) -> Error {
    invalid_field_error("end", message)
}

fn required_date(value: Option<&str>, field: &'static str) -> Result<NaiveDate, Error> {
    let raw = value.ok_or_else(|| invalid_field_error(field, format!("{field} is required")))?;
    parse_date(raw, FieldName::new(field))
}

#[utoipa::path(
    post,
    path = "/api/v1/timetable/slots",
    request_body = SlotRequest,
    responses(
        (status = 201, description = "Slot created", body = SlotResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["timetable"],
    operation_id = "createSlot"
)]
#[post("/timetable/slots")]
pub async fn create_slot(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<SlotRequest>,
) -> ApiResult<HttpResponse> {
    let slot = payload.into_inner().into_new_slot()?;
    let created = state.slots.create_slot(user.user_id(), slot).await?;
    Ok(HttpResponse::Created().json(SlotResponse::from(&created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/timetable/slots/{id}",
    params(("id" = String, Path, description = "Slot identifier")),
    responses(
        (status = 200, description = "Slot", body = SlotResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Slot belongs to another user", body = ErrorSchema),
        (status = 404, description = "Slot not found", body = ErrorSchema)
    ),
    tags = ["timetable"],
    operation_id = "getSlot"
)]
#[get("/timetable/slots/{id}")]
pub async fn get_slot(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<SlotResponse>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let slot = state.schedule.slot(user.user_id(), id).await?;
    Ok(web::Json(SlotResponse::from(&slot)))
}

/// Recurring slots on a weekday, ordered by start time.
#[utoipa::path(
    get,
    path = "/api/v1/timetable/day/{dayOfWeek}",
    params(("dayOfWeek" = i32, Path, description = "0 = Sunday .. 6 = Saturday")),
    responses(
        (status = 200, description = "Slots for the day", body = [SlotResponse]),
        (status = 400, description = "Day out of range", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["timetable"],
    operation_id = "slotsForDay"
)]
#[get("/timetable/day/{day}")]
pub async fn slots_for_day(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<SlotResponse>>> {
    let day = DayOfWeek::new(path.into_inner())
        .map_err(|err| invalid_field_error(err.field(), err.to_string()))?;
    let slots = state.schedule.slots_for_weekday(user.user_id(), day).await?;
    Ok(web::Json(slot_list(&slots)))
}

/// Slots that apply within an inclusive date range.
#[utoipa::path(
    get,
    path = "/api/v1/timetable/range",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Slots in range", body = [SlotResponse]),
        (status = 400, description = "Missing or invalid dates", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["timetable"],
    operation_id = "slotsInRange"
)]
#[get("/timetable/range")]
pub async fn slots_in_range(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> ApiResult<web::Json<Vec<SlotResponse>>> {
    let DateRangeQuery { start, end } = query.into_inner();
    let start = required_date(start.as_deref(), "start")?;
    let end = required_date(end.as_deref(), "end")?;
    let window = SlotWindow::new(start, end).map_err(|err| window_error(err.to_string()))?;
    let slots = state
        .schedule
        .slots_in_window(user.user_id(), &window)
        .await?;
    Ok(web::Json(slot_list(&slots)))
}

/// The timetable as an iCalendar attachment. Without bounds the export
/// covers today and the following six days.
#[utoipa::path(
    get,
    path = "/api/v1/timetable/export.ics",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "iCalendar document", body = String, content_type = "text/calendar"),
        (status = 400, description = "Invalid dates", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["timetable"],
    operation_id = "exportCalendar"
)]
#[get("/timetable/export.ics")]
pub async fn export_calendar(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> ApiResult<HttpResponse> {
    let DateRangeQuery { start, end } = query.into_inner();
    let range = ExportRange {
        start: parse_optional_date(start.as_deref(), FieldName::new("start"))?,
        end: parse_optional_date(end.as_deref(), FieldName::new("end"))?,
    };
    let calendar = state.calendar.export_calendar(user.user_id(), range).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, CALENDAR_CONTENT_TYPE))
        .insert_header((CONTENT_DISPOSITION, CALENDAR_DISPOSITION))
        .body(calendar))
}

#[cfg(test)]
#[path = "timetable_tests.rs"]
mod tests;
