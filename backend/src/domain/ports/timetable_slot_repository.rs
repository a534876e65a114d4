//! Port for per-user timetable slot storage.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DayOfWeek, SlotWindow, TimetableSlot, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by timetable slot adapters.
    pub enum TimetableSlotRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "timetable slot repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "timetable slot repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimetableSlotRepository: Send + Sync {
    /// Insert a new slot.
    async fn create(&self, slot: &TimetableSlot) -> Result<(), TimetableSlotRepositoryError>;

    /// Fetch a slot by identifier regardless of owner.
    async fn find_by_id(&self, id: &Uuid)
    -> Result<Option<TimetableSlot>, TimetableSlotRepositoryError>;

    /// Active recurring slots for `user_id` on `day`, ordered by start time.
    async fn list_by_user_and_weekday(
        &self,
        user_id: &UserId,
        day: DayOfWeek,
    ) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError>;

    /// Active slots admitted by `window` (see [`SlotWindow::admits`]),
    /// ordered by start time.
    async fn list_by_user_and_date_range(
        &self,
        user_id: &UserId,
        window: &SlotWindow,
    ) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError>;
}
