//! Calendar export: turn the slots in a date window into an iCalendar file.
//!
//! Each slot produces exactly one event. Recurring slots are placed on the
//! first matching weekday on or after the window start; no `RRULE` is
//! emitted. Catalog lookups that fail or find nothing fall back to
//! placeholder names so the export always covers every slot.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::catalog_service::CatalogRepositories;
use crate::domain::ics::{CalendarEvent, render_calendar};
use crate::domain::ports::{CalendarExport, ExportRange, ScheduleQuery};
use crate::domain::{DayOfWeek, Error, SlotWindow, TimetableSlot, UserId};

pub const UNKNOWN_SUBJECT: &str = "Unknown Subject";
pub const NOT_AVAILABLE: &str = "N/A";
/// Days added to the start date when the caller omits an end date.
pub const DEFAULT_EXPORT_SPAN_DAYS: u64 = 6;

/// Date on which `slot` is placed in an export starting at `range_start`.
///
/// Returns `None` when the matching weekday falls past the last
/// representable date.
pub fn occurrence_date(slot: &TimetableSlot, range_start: NaiveDate) -> Option<NaiveDate> {
    match slot.specific_date() {
        Some(date) if !slot.is_recurring() => Some(date),
        _ => {
            let offset = weekday_offset(
                DayOfWeek::of(range_start).number(),
                slot.day_of_week().number(),
            );
            range_start.checked_add_days(Days::new(offset))
        }
    }
}

fn date_out_of_range(field: &str) -> Error {
    Error::invalid_request(format!("{field} is too close to the end of the calendar"))
        .with_details(serde_json::json!({
            "field": field,
            "code": "date_out_of_range",
        }))
}

/// Days from weekday `from` forward to weekday `to`, both numbered 0..=6.
///
/// # Examples
/// ```
/// use campus_backend::domain::calendar_export::weekday_offset;
///
/// // Slot on Monday (1), window starting Friday (5): three days later.
/// assert_eq!(weekday_offset(5, 1), 3);
/// assert_eq!(weekday_offset(2, 2), 0);
/// ```
pub fn weekday_offset(from: u8, to: u8) -> u64 {
    (u64::from(to) + 7 - u64::from(from)) % 7
}

/// Human-readable names resolved for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotLabels {
    subject_name: String,
    subject_code: String,
    staff_name: String,
    venue_name: String,
}

/// Calendar export service implementing [`CalendarExport`].
#[derive(Clone)]
pub struct CalendarExportService<Q> {
    schedule: Arc<Q>,
    catalog: CatalogRepositories,
    clock: Arc<dyn Clock>,
}

impl<Q> CalendarExportService<Q> {
    pub fn new(schedule: Arc<Q>, catalog: CatalogRepositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            schedule,
            catalog,
            clock,
        }
    }

    fn resolve_window(&self, range: ExportRange) -> Result<SlotWindow, Error> {
        let start = range
            .start
            .unwrap_or_else(|| self.clock.utc().date_naive());
        let end = match range.end {
            Some(end) => end,
            None => start
                .checked_add_days(Days::new(DEFAULT_EXPORT_SPAN_DAYS))
                .ok_or_else(|| date_out_of_range("start"))?,
        };
        SlotWindow::new(start, end).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(serde_json::json!({
                "field": "end",
                "code": "window_order",
            }))
        })
    }

    async fn labels(&self, slot: &TimetableSlot) -> SlotLabels {
        let mut labels = SlotLabels {
            subject_name: UNKNOWN_SUBJECT.to_owned(),
            subject_code: String::new(),
            staff_name: NOT_AVAILABLE.to_owned(),
            venue_name: NOT_AVAILABLE.to_owned(),
        };

        if let Some(id) = slot.subject_id() {
            match self.catalog.subjects.find_by_id(&id).await {
                Ok(Some(subject)) => {
                    labels.subject_name = subject.name;
                    labels.subject_code = subject.code;
                }
                Ok(None) => tracing::warn!(slot_id = %slot.id(), subject_id = %id, "subject missing"),
                Err(error) => {
                    tracing::warn!(slot_id = %slot.id(), subject_id = %id, %error, "subject lookup failed");
                }
            }
        }
        if let Some(id) = slot.staff_id() {
            match self.catalog.staff.find_by_id(&id).await {
                Ok(Some(staff)) => labels.staff_name = staff.name,
                Ok(None) => tracing::warn!(slot_id = %slot.id(), staff_id = %id, "staff missing"),
                Err(error) => {
                    tracing::warn!(slot_id = %slot.id(), staff_id = %id, %error, "staff lookup failed");
                }
            }
        }
        if let Some(id) = slot.venue_id() {
            match self.catalog.venues.find_by_id(&id).await {
                Ok(Some(venue)) => labels.venue_name = venue.name,
                Ok(None) => tracing::warn!(slot_id = %slot.id(), venue_id = %id, "venue missing"),
                Err(error) => {
                    tracing::warn!(slot_id = %slot.id(), venue_id = %id, %error, "venue lookup failed");
                }
            }
        }
        labels
    }

    fn event(
        &self,
        slot: &TimetableSlot,
        labels: SlotLabels,
        range_start: NaiveDate,
    ) -> Result<CalendarEvent, Error> {
        let date = occurrence_date(slot, range_start).ok_or_else(|| date_out_of_range("start"))?;
        let slot_type = slot.slot_type();
        Ok(CalendarEvent {
            uid: Uuid::new_v4(),
            stamp: self.clock.utc(),
            start: date.and_time(slot.start_time()),
            end: date.and_time(slot.end_time()),
            summary: format!("{} - {slot_type}", labels.subject_name),
            description: format!(
                "Subject: {} ({})\nStaff: {}\nVenue: {}\nType: {slot_type}",
                labels.subject_name, labels.subject_code, labels.staff_name, labels.venue_name,
            ),
            location: labels.venue_name,
        })
    }
}

#[async_trait]
impl<Q> CalendarExport for CalendarExportService<Q>
where
    Q: ScheduleQuery,
{
    async fn export_calendar(&self, user_id: &UserId, range: ExportRange) -> Result<String, Error> {
        let window = self.resolve_window(range)?;
        let slots = self.schedule.slots_in_window(user_id, &window).await?;

        let mut events = Vec::with_capacity(slots.len());
        for slot in &slots {
            let labels = self.labels(slot).await;
            events.push(self.event(slot, labels, window.start())?);
        }
        tracing::debug!(user_id = %user_id, events = events.len(), "calendar exported");
        Ok(render_calendar(&events))
    }
}

#[cfg(test)]
#[path = "calendar_export_tests.rs"]
mod tests;
