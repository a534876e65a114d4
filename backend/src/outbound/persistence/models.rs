//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{assignments, staff, subjects, timetable_slots, users, venues};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
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
    pub notification_prefs: serde_json::Value,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub register_number: &'a str,
    pub department: &'a str,
    pub year: i32,
    pub semester: i32,
    pub section: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub theme: &'a str,
    pub timezone: &'a str,
    pub notification_prefs: serde_json::Value,
    pub oauth_provider: Option<&'a str>,
    pub oauth_id: Option<&'a str>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubjectRow {
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

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = staff)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StaffRow {
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

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = venues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VenueRow {
    pub id: Uuid,
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub venue_type: String,
    pub facilities: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Timetable slots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = timetable_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TimetableSlotRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
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

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
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

/// Full overwrite of the mutable assignment columns. `None` clears a column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssignmentUpdate {
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
    pub updated_at: DateTime<Utc>,
}
