//! Schedule resolution: which timetable slots apply to a weekday or a date
//! window.
//!
//! Recurring slots are matched against the set of weekdays a window spans,
//! so a Friday-to-Monday window admits Friday, Saturday, Sunday and Monday.
//! A recurring slot is returned once however many weeks the window covers.
//! Storage adapters filter on [`SlotWindow::weekdays`] in their queries;
//! in-memory adapters call [`SlotWindow::admits`] directly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    ScheduleQuery, SlotCommand, TimetableSlotRepository, TimetableSlotRepositoryError,
};
use crate::domain::{
    DayOfWeek, Error, NewSlot, TimetableSlot, TimetableSlotDraft, UserId, ensure_owned_by,
};

/// Validation failure for a date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("end date must not be before start date")]
pub struct WindowOrderError;

/// Inclusive date window used to resolve slots.
///
/// # Examples
/// ```
/// use campus_backend::domain::SlotWindow;
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2024, 3, 11).expect("date");
/// let friday = NaiveDate::from_ymd_opt(2024, 3, 15).expect("date");
/// let window = SlotWindow::new(monday, friday).expect("ordered");
/// assert_eq!(window.start_day().number(), 1);
/// assert!(SlotWindow::new(friday, monday).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl SlotWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowOrderError> {
        if end < start {
            return Err(WindowOrderError);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_day(&self) -> DayOfWeek {
        DayOfWeek::of(self.start)
    }

    pub fn end_day(&self) -> DayOfWeek {
        DayOfWeek::of(self.end)
    }

    /// Weekdays the window touches, in calendar order from the start day.
    ///
    /// Windows of seven days or more yield all seven weekdays.
    pub fn weekdays(&self) -> Vec<DayOfWeek> {
        self.start
            .iter_days()
            .take_while(|date| *date <= self.end)
            .take(7)
            .map(DayOfWeek::of)
            .collect()
    }

    /// Whether `slot` could occur inside the window.
    pub fn admits(&self, slot: &TimetableSlot) -> bool {
        if !slot.is_active() {
            return false;
        }
        match slot.specific_date() {
            Some(date) if !slot.is_recurring() => self.start <= date && date <= self.end,
            _ => self.weekdays().contains(&slot.day_of_week()),
        }
    }
}

/// Whether `slot` belongs on the weekday listing for `day`.
pub fn recurs_on(slot: &TimetableSlot, day: DayOfWeek) -> bool {
    slot.is_active() && slot.is_recurring() && slot.day_of_week() == day
}

/// Order by start time, keeping store order for ties.
pub(crate) fn sort_by_start(slots: &mut [TimetableSlot]) {
    slots.sort_by_key(TimetableSlot::start_time);
}

pub(crate) fn map_slot_repository_error(error: TimetableSlotRepositoryError) -> Error {
    match error {
        TimetableSlotRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("timetable repository unavailable: {message}"))
        }
        TimetableSlotRepositoryError::Query { message } => {
            Error::internal(format!("timetable repository error: {message}"))
        }
    }
}

/// Timetable service implementing the schedule driving ports.
#[derive(Clone)]
pub struct ScheduleService<R> {
    slots: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ScheduleService<R> {
    pub fn new(slots: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { slots, clock }
    }
}

#[async_trait]
impl<R> ScheduleQuery for ScheduleService<R>
where
    R: TimetableSlotRepository,
{
    async fn slots_for_weekday(
        &self,
        user_id: &UserId,
        day: DayOfWeek,
    ) -> Result<Vec<TimetableSlot>, Error> {
        let mut slots = self
            .slots
            .list_by_user_and_weekday(user_id, day)
            .await
            .map_err(map_slot_repository_error)?;
        slots.retain(|slot| recurs_on(slot, day));
        sort_by_start(&mut slots);
        Ok(slots)
    }

    async fn slots_in_window(
        &self,
        user_id: &UserId,
        window: &SlotWindow,
    ) -> Result<Vec<TimetableSlot>, Error> {
        let mut slots = self
            .slots
            .list_by_user_and_date_range(user_id, window)
            .await
            .map_err(map_slot_repository_error)?;
        slots.retain(|slot| window.admits(slot));
        sort_by_start(&mut slots);
        Ok(slots)
    }

    async fn slot(&self, user_id: &UserId, slot_id: Uuid) -> Result<TimetableSlot, Error> {
        let slot = self
            .slots
            .find_by_id(&slot_id)
            .await
            .map_err(map_slot_repository_error)?
            .ok_or_else(|| Error::not_found("Timetable slot not found"))?;
        ensure_owned_by(slot, user_id, "Timetable slot")
    }
}

#[async_trait]
impl<R> SlotCommand for ScheduleService<R>
where
    R: TimetableSlotRepository,
{
    async fn create_slot(&self, user_id: &UserId, slot: NewSlot) -> Result<TimetableSlot, Error> {
        let now = self.clock.utc();
        let NewSlot {
            subject_id,
            staff_id,
            venue_id,
            day_of_week,
            start_time,
            end_time,
            period_number,
            slot_type,
            recurrence,
            notes,
            batch_filter,
        } = slot;
        let slot = TimetableSlot::from(TimetableSlotDraft {
            id: Uuid::new_v4(),
            user_id: *user_id,
            subject_id,
            staff_id,
            venue_id,
            day_of_week,
            start_time,
            end_time,
            period_number,
            slot_type,
            recurrence,
            notes,
            batch_filter,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        self.slots
            .create(&slot)
            .await
            .map_err(map_slot_repository_error)?;
        tracing::info!(slot_id = %slot.id(), user_id = %user_id, "timetable slot created");
        Ok(slot)
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
