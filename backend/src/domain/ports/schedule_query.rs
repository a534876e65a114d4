//! Driving ports for reading and creating timetable slots.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DayOfWeek, Error, NewSlot, SlotWindow, TimetableSlot, UserId};

/// Resolve which of a user's slots apply to a weekday or date window.
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    /// Recurring slots on `day`, ordered by start time.
    async fn slots_for_weekday(
        &self,
        user_id: &UserId,
        day: DayOfWeek,
    ) -> Result<Vec<TimetableSlot>, Error>;

    /// Slots admitted by `window`, ordered by start time.
    async fn slots_in_window(
        &self,
        user_id: &UserId,
        window: &SlotWindow,
    ) -> Result<Vec<TimetableSlot>, Error>;

    /// A single slot, provided `user_id` owns it.
    async fn slot(&self, user_id: &UserId, slot_id: Uuid) -> Result<TimetableSlot, Error>;
}

/// Add slots to a user's timetable.
#[async_trait]
pub trait SlotCommand: Send + Sync {
    async fn create_slot(&self, user_id: &UserId, slot: NewSlot) -> Result<TimetableSlot, Error>;
}
