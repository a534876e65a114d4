//! Driving port for rendering a user's timetable as an iCalendar document.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Error, UserId};

/// Optional bounds supplied by the caller; absent values fall back to the
/// current week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[async_trait]
pub trait CalendarExport: Send + Sync {
    /// Render the slots in `range` as RFC 5545 text.
    async fn export_calendar(&self, user_id: &UserId, range: ExportRange)
    -> Result<String, Error>;
}
