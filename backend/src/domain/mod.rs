//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP and persistence
//! adapters, and the services that implement the driving ports in
//! [`ports`]. Services depend only on port traits so adapters can be swapped
//! for in-memory doubles in tests.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Email, UserId: registered accounts.
//! - TimetableSlot, SlotWindow, DayOfWeek: schedule resolution.
//! - Assignment: owned coursework items.

pub mod account_service;
pub mod assignment;
pub mod assignment_service;
pub mod auth;
pub mod calendar_export;
pub mod catalog_service;
pub mod error;
pub mod ics;
pub mod ownership;
pub mod ports;
pub mod schedule;
pub mod timetable;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::assignment::{
    Assignment, AssignmentDetails, AssignmentDraft, AssignmentFields, AssignmentFilter,
    AssignmentRevision, AssignmentStatus, AssignmentValidationError, DEFAULT_ASSIGNMENT_TYPE,
    DEFAULT_REMINDER_BEFORE_HOURS, Priority,
};
pub use self::assignment_service::AssignmentService;
pub use self::auth::{
    AuthError, LoginCredentials, LoginValidationError, PASSWORD_MIN_LENGTH, Registration,
    RegistrationInput, RegistrationValidationError, TOKEN_TTL_DAYS,
};
pub use self::calendar_export::CalendarExportService;
pub use self::catalog_service::{CatalogRepositories, TimetableCatalogService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ownership::{OwnedResource, ensure_owned_by};
pub use self::schedule::{ScheduleService, SlotWindow, WindowOrderError, recurs_on};
pub use self::timetable::{
    DEFAULT_SLOT_TYPE, DEFAULT_SUBJECT_TYPE, DEFAULT_VENUE_TYPE, DayOfWeek, NewSlot,
    NewSlotInput, NewStaff, NewSubject, NewVenue, SlotRecurrence, Staff, Subject,
    TimetableSlot, TimetableSlotDraft, TimetableValidationError, Venue,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DEFAULT_THEME, DEFAULT_TIMEZONE, Email, NotificationPreferences, PasswordDigest, User,
    UserDraft, UserId, UserProfile, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
