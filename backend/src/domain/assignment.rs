//! Assignment model: coursework items owned by a single student.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{OwnedResource, UserId};

/// Assignment type recorded when a request does not name one.
pub const DEFAULT_ASSIGNMENT_TYPE: &str = "homework";
/// Reminder lead time recorded when a request does not name one.
pub const DEFAULT_REMINDER_BEFORE_HOURS: i32 = 24;

/// Validation failures for assignment input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("status must be one of pending, in_progress, completed, submitted, graded, overdue")]
    UnknownStatus,
    #[error("priority must be one of low, medium, high, urgent")]
    UnknownPriority,
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("obtainedMarks must not exceed maxMarks")]
    MarksExceedMaximum,
}

impl AssignmentValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::Negative { field } => *field,
            Self::UnknownStatus => "status",
            Self::UnknownPriority => "priority",
            Self::MarksExceedMaximum => "obtainedMarks",
        }
    }
}

/// Progress of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssignmentStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Submitted,
    Graded,
    Overdue,
}

impl AssignmentStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Submitted => "submitted",
            Self::Graded => "graded",
            Self::Overdue => "overdue",
        }
    }

    /// Work still outstanding: pending or in progress.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl FromStr for AssignmentStatus {
    type Err = AssignmentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "submitted" => Ok(Self::Submitted),
            "graded" => Ok(Self::Graded),
            "overdue" => Ok(Self::Overdue),
            _ => Err(AssignmentValidationError::UnknownStatus),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency chosen by the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = AssignmentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(AssignmentValidationError::UnknownPriority),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of a user's assignments to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentFilter {
    #[default]
    All,
    /// Open and due now or later.
    Pending,
    /// Open and already past due.
    Overdue,
}

impl AssignmentFilter {
    /// Whether an assignment with `status` due at `due` passes at `now`.
    pub fn admits(self, status: AssignmentStatus, due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status.is_open() && due >= now,
            Self::Overdue => status.is_open() && due < now,
        }
    }
}

/// Editable assignment content, generic over how the due date is carried.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentFields<D> {
    pub subject_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: String,
    pub assigned_date: Option<NaiveDate>,
    pub due_date: D,
    pub status: AssignmentStatus,
    pub max_marks: Option<f64>,
    pub obtained_marks: Option<f64>,
    pub feedback: Option<String>,
    pub priority: Priority,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub reminder_enabled: bool,
    pub reminder_before_hours: i32,
    pub tags: Vec<String>,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
}

fn non_negative(value: Option<f64>, field: &'static str) -> Result<(), AssignmentValidationError> {
    match value {
        Some(v) if v < 0.0 => Err(AssignmentValidationError::Negative { field }),
        _ => Ok(()),
    }
}

/// Content of a stored assignment; the due date is always known.
pub type AssignmentDetails = AssignmentFields<DateTime<Utc>>;

/// Content submitted on update; a missing due date keeps the stored one.
pub type AssignmentRevision = AssignmentFields<Option<DateTime<Utc>>>;

impl AssignmentRevision {
    /// Fill in the due date from `current` when the revision omits it.
    pub fn resolve(self, current: DateTime<Utc>) -> AssignmentDetails {
        self.map_due(|due| due.unwrap_or(current))
    }
}

impl<D> AssignmentFields<D> {
    /// Rebuild with the due date transformed by `f`.
    pub fn map_due<E>(self, f: impl FnOnce(D) -> E) -> AssignmentFields<E> {
        AssignmentFields {
            subject_id: self.subject_id,
            staff_id: self.staff_id,
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            assignment_type: self.assignment_type,
            assigned_date: self.assigned_date,
            due_date: f(self.due_date),
            status: self.status,
            max_marks: self.max_marks,
            obtained_marks: self.obtained_marks,
            feedback: self.feedback,
            priority: self.priority,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            reminder_enabled: self.reminder_enabled,
            reminder_before_hours: self.reminder_before_hours,
            tags: self.tags,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
        }
    }

    /// Check field-level invariants.
    pub fn validate(&self) -> Result<(), AssignmentValidationError> {
        if self.title.trim().is_empty() {
            return Err(AssignmentValidationError::MissingField { field: "title" });
        }
        if self.assignment_type.trim().is_empty() {
            return Err(AssignmentValidationError::MissingField {
                field: "assignmentType",
            });
        }
        non_negative(self.max_marks, "maxMarks")?;
        non_negative(self.obtained_marks, "obtainedMarks")?;
        non_negative(self.estimated_hours, "estimatedHours")?;
        non_negative(self.actual_hours, "actualHours")?;
        if self.reminder_before_hours < 0 {
            return Err(AssignmentValidationError::Negative {
                field: "reminderBeforeHours",
            });
        }
        if let (Some(max), Some(obtained)) = (self.max_marks, self.obtained_marks)
            && obtained > max
        {
            return Err(AssignmentValidationError::MarksExceedMaximum);
        }
        Ok(())
    }
}

/// Field bundle used to build an [`Assignment`].
#[derive(Debug, Clone)]
pub struct AssignmentDraft {
    pub id: Uuid,
    pub user_id: UserId,
    pub details: AssignmentDetails,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A piece of coursework tracked by its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    id: Uuid,
    user_id: UserId,
    details: AssignmentDetails,
    submitted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AssignmentDraft> for Assignment {
    fn from(draft: AssignmentDraft) -> Self {
        Self {
            id: draft.id,
            user_id: draft.user_id,
            details: draft.details,
            submitted_at: draft.submitted_at,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }
}

impl Assignment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn details(&self) -> &AssignmentDetails {
        &self.details
    }

    pub fn status(&self) -> AssignmentStatus {
        self.details.status
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the editable content, keeping identity and timestamps.
    pub fn revise(&mut self, details: AssignmentDetails, now: DateTime<Utc>) {
        self.details = details;
        self.updated_at = now;
    }

    /// Move to `status`; entering `submitted` stamps the submission time.
    pub fn transition(&mut self, status: AssignmentStatus, now: DateTime<Utc>) {
        if status == AssignmentStatus::Submitted {
            self.submitted_at = Some(now);
        }
        self.details.status = status;
        self.updated_at = now;
    }
}

impl OwnedResource for Assignment {
    fn owner(&self) -> &UserId {
        &self.user_id
    }
}
