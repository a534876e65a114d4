//! Timetable model: shared catalog entries and per-user slots.
//!
//! Subjects, staff and venues are global reference data. A slot points at
//! them through weak references (bare identifiers): the target may be absent
//! and readers must cope with that.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::{OwnedResource, UserId};

/// Slot type recorded when a request does not name one.
pub const DEFAULT_SLOT_TYPE: &str = "lecture";
/// Subject type recorded when a request does not name one.
pub const DEFAULT_SUBJECT_TYPE: &str = "theory";
/// Venue type recorded when a request does not name one.
pub const DEFAULT_VENUE_TYPE: &str = "classroom";

/// Validation failures for timetable input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableValidationError {
    #[error("Invalid day of week. Must be 0-6.")]
    DayOfWeekOutOfRange,
    #[error("dayOfWeek is required for recurring slots")]
    MissingDayOfWeek,
    #[error("endTime must be after startTime")]
    EndNotAfterStart,
    #[error("specificDate is required for one-off slots")]
    MissingSpecificDate,
    #[error("specificDate is only allowed on one-off slots")]
    UnexpectedSpecificDate,
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

impl TimetableValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::DayOfWeekOutOfRange | Self::MissingDayOfWeek => "dayOfWeek",
            Self::EndNotAfterStart => "endTime",
            Self::MissingSpecificDate | Self::UnexpectedSpecificDate => "specificDate",
            Self::MissingField { field } => *field,
        }
    }
}

/// Day of the week numbered 0 (Sunday) to 6 (Saturday).
///
/// # Examples
/// ```
/// use campus_backend::domain::DayOfWeek;
/// use chrono::NaiveDate;
///
/// let friday = NaiveDate::from_ymd_opt(2024, 3, 15).expect("date");
/// assert_eq!(DayOfWeek::of(friday).number(), 5);
/// assert!(DayOfWeek::new(7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    /// Validate a caller-supplied day number.
    pub fn new(day: i32) -> Result<Self, TimetableValidationError> {
        u8::try_from(day)
            .ok()
            .filter(|day| *day <= 6)
            .map(Self)
            .ok_or(TimetableValidationError::DayOfWeekOutOfRange)
    }

    /// Weekday of a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        let day = date.weekday().num_days_from_sunday();
        Self(u8::try_from(day).unwrap_or(0))
    }

    /// Numeric value, 0..=6.
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Course taught on campus.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
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

/// Teaching staff member.
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
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

/// Room or lab where slots take place.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub venue_type: String,
    pub facilities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Whether a slot repeats weekly or happens on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRecurrence {
    /// Repeats every week on the slot's day of week.
    Weekly,
    /// Happens once, on the given date.
    OnDate(NaiveDate),
}

impl SlotRecurrence {
    /// Rebuild from the stored `is_recurring` flag and `specific_date`.
    ///
    /// A recurring row ignores any stray date; a one-off row must carry one.
    pub fn from_columns(
        is_recurring: bool,
        specific_date: Option<NaiveDate>,
    ) -> Result<Self, TimetableValidationError> {
        match (is_recurring, specific_date) {
            (true, _) => Ok(Self::Weekly),
            (false, Some(date)) => Ok(Self::OnDate(date)),
            (false, None) => Err(TimetableValidationError::MissingSpecificDate),
        }
    }

    pub fn is_recurring(self) -> bool {
        matches!(self, Self::Weekly)
    }

    pub fn specific_date(self) -> Option<NaiveDate> {
        match self {
            Self::Weekly => None,
            Self::OnDate(date) => Some(date),
        }
    }
}

/// Field bundle used to build a [`TimetableSlot`].
#[derive(Debug, Clone)]
pub struct TimetableSlotDraft {
    pub id: Uuid,
    pub user_id: UserId,
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub period_number: Option<i32>,
    pub slot_type: String,
    pub recurrence: SlotRecurrence,
    pub notes: Option<String>,
    pub batch_filter: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A block in one user's timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableSlot {
    id: Uuid,
    user_id: UserId,
    subject_id: Option<Uuid>,
    staff_id: Option<Uuid>,
    venue_id: Option<Uuid>,
    day_of_week: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    period_number: Option<i32>,
    slot_type: String,
    recurrence: SlotRecurrence,
    notes: Option<String>,
    batch_filter: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TimetableSlotDraft> for TimetableSlot {
    fn from(draft: TimetableSlotDraft) -> Self {
        Self {
            id: draft.id,
            user_id: draft.user_id,
            subject_id: draft.subject_id,
            staff_id: draft.staff_id,
            venue_id: draft.venue_id,
            day_of_week: draft.day_of_week,
            start_time: draft.start_time,
            end_time: draft.end_time,
            period_number: draft.period_number,
            slot_type: draft.slot_type,
            recurrence: draft.recurrence,
            notes: draft.notes,
            batch_filter: draft.batch_filter,
            is_active: draft.is_active,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }
}

impl TimetableSlot {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn subject_id(&self) -> Option<Uuid> {
        self.subject_id
    }

    pub fn staff_id(&self) -> Option<Uuid> {
        self.staff_id
    }

    pub fn venue_id(&self) -> Option<Uuid> {
        self.venue_id
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn period_number(&self) -> Option<i32> {
        self.period_number
    }

    pub fn slot_type(&self) -> &str {
        &self.slot_type
    }

    pub fn recurrence(&self) -> SlotRecurrence {
        self.recurrence
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    pub fn specific_date(&self) -> Option<NaiveDate> {
        self.recurrence.specific_date()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn batch_filter(&self) -> Option<&str> {
        self.batch_filter.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl OwnedResource for TimetableSlot {
    fn owner(&self) -> &UserId {
        &self.user_id
    }
}

/// Raw slot creation request.
#[derive(Debug, Clone)]
pub struct NewSlotInput {
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
    pub day_of_week: Option<i32>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub period_number: Option<i32>,
    pub slot_type: Option<String>,
    pub is_recurring: bool,
    pub specific_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub batch_filter: Option<String>,
}

/// Validated slot creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlot {
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub venue_id: Option<Uuid>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub period_number: Option<i32>,
    pub slot_type: String,
    pub recurrence: SlotRecurrence,
    pub notes: Option<String>,
    pub batch_filter: Option<String>,
}

impl TryFrom<NewSlotInput> for NewSlot {
    type Error = TimetableValidationError;

    fn try_from(input: NewSlotInput) -> Result<Self, Self::Error> {
        if input.end_time <= input.start_time {
            return Err(TimetableValidationError::EndNotAfterStart);
        }

        let day = input.day_of_week.map(DayOfWeek::new).transpose()?;
        let (recurrence, day_of_week) = match (input.is_recurring, input.specific_date) {
            (true, Some(_)) => return Err(TimetableValidationError::UnexpectedSpecificDate),
            (true, None) => (
                SlotRecurrence::Weekly,
                day.ok_or(TimetableValidationError::MissingDayOfWeek)?,
            ),
            (false, None) => return Err(TimetableValidationError::MissingSpecificDate),
            (false, Some(date)) => (
                SlotRecurrence::OnDate(date),
                day.unwrap_or_else(|| DayOfWeek::of(date)),
            ),
        };

        let slot_type = input
            .slot_type
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_SLOT_TYPE.to_owned());

        Ok(Self {
            subject_id: input.subject_id,
            staff_id: input.staff_id,
            venue_id: input.venue_id,
            day_of_week,
            start_time: input.start_time,
            end_time: input.end_time,
            period_number: input.period_number,
            slot_type,
            recurrence,
            notes: input.notes,
            batch_filter: input.batch_filter,
        })
    }
}

/// New subject request.
#[derive(Debug, Clone, Default)]
pub struct NewSubject {
    pub code: String,
    pub name: String,
    pub short_name: Option<String>,
    pub subject_type: Option<String>,
    pub credits: Option<i32>,
    pub department: Option<String>,
    pub semester: Option<i32>,
    pub color: Option<String>,
}

/// New staff request.
#[derive(Debug, Clone, Default)]
pub struct NewStaff {
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub cabin: Option<String>,
}

/// New venue request.
#[derive(Debug, Clone, Default)]
pub struct NewVenue {
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub venue_type: Option<String>,
    pub facilities: Vec<String>,
}

fn require(value: &str, field: &'static str) -> Result<(), TimetableValidationError> {
    if value.trim().is_empty() {
        return Err(TimetableValidationError::MissingField { field });
    }
    Ok(())
}

impl NewSubject {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), TimetableValidationError> {
        require(&self.code, "code")?;
        require(&self.name, "name")
    }
}

impl NewStaff {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), TimetableValidationError> {
        require(&self.name, "name")
    }
}

impl NewVenue {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), TimetableValidationError> {
        require(&self.name, "name")
    }
}
