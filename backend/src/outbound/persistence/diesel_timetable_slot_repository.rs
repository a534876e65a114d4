//! PostgreSQL-backed `TimetableSlotRepository` implementation.
//!
//! The range query mirrors `SlotWindow::admits`: recurring slots match on the
//! weekdays the window spans, one-off slots on their calendar date.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TimetableSlotRepository, TimetableSlotRepositoryError};
use crate::domain::{
    DayOfWeek, SlotRecurrence, SlotWindow, TimetableSlot, TimetableSlotDraft, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::TimetableSlotRow;
use super::pool::{DbPool, PoolError};
use super::schema::timetable_slots;

/// Diesel-backed implementation of the timetable slot port.
#[derive(Clone)]
pub struct DieselTimetableSlotRepository {
    pool: DbPool,
}

impl DieselTimetableSlotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TimetableSlotRepositoryError {
    map_basic_pool_error(error, |message| {
        TimetableSlotRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> TimetableSlotRepositoryError {
    map_basic_diesel_error(
        error,
        TimetableSlotRepositoryError::query,
        TimetableSlotRepositoryError::connection,
    )
}

fn day_column(day: DayOfWeek) -> i16 {
    i16::from(day.number())
}

fn row_to_slot(row: TimetableSlotRow) -> Result<TimetableSlot, TimetableSlotRepositoryError> {
    let day_of_week = DayOfWeek::new(i32::from(row.day_of_week)).map_err(|err| {
        TimetableSlotRepositoryError::query(format!("slot {}: {err}", row.id))
    })?;
    let recurrence = SlotRecurrence::from_columns(row.is_recurring, row.specific_date)
        .map_err(|err| TimetableSlotRepositoryError::query(format!("slot {}: {err}", row.id)))?;

    Ok(TimetableSlot::from(TimetableSlotDraft {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        subject_id: row.subject_id,
        staff_id: row.staff_id,
        venue_id: row.venue_id,
        day_of_week,
        start_time: row.start_time,
        end_time: row.end_time,
        period_number: row.period_number,
        slot_type: row.slot_type,
        recurrence,
        notes: row.notes,
        batch_filter: row.batch_filter,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn slot_to_row(slot: &TimetableSlot) -> TimetableSlotRow {
    TimetableSlotRow {
        id: slot.id(),
        user_id: *slot.user_id().as_uuid(),
        subject_id: slot.subject_id(),
        staff_id: slot.staff_id(),
        venue_id: slot.venue_id(),
        day_of_week: day_column(slot.day_of_week()),
        start_time: slot.start_time(),
        end_time: slot.end_time(),
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

fn rows_to_slots(
    rows: Vec<TimetableSlotRow>,
) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError> {
    rows.into_iter().map(row_to_slot).collect()
}

#[async_trait]
impl TimetableSlotRepository for DieselTimetableSlotRepository {
    async fn create(&self, slot: &TimetableSlot) -> Result<(), TimetableSlotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(timetable_slots::table)
            .values(&slot_to_row(slot))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<TimetableSlot>, TimetableSlotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        timetable_slots::table
            .find(id)
            .select(TimetableSlotRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_slot)
            .transpose()
    }

    async fn list_by_user_and_weekday(
        &self,
        user_id: &UserId,
        day: DayOfWeek,
    ) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TimetableSlotRow> = timetable_slots::table
            .filter(timetable_slots::user_id.eq(user_id.as_uuid()))
            .filter(timetable_slots::is_active.eq(true))
            .filter(timetable_slots::is_recurring.eq(true))
            .filter(timetable_slots::day_of_week.eq(day_column(day)))
            .order(timetable_slots::start_time.asc())
            .select(TimetableSlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_slots(rows)
    }

    async fn list_by_user_and_date_range(
        &self,
        user_id: &UserId,
        window: &SlotWindow,
    ) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let weekdays: Vec<i16> = window.weekdays().into_iter().map(day_column).collect();
        let weekly = timetable_slots::is_recurring
            .eq(true)
            .and(timetable_slots::day_of_week.eq_any(weekdays));
        let one_off = timetable_slots::is_recurring.eq(false).and(
            timetable_slots::specific_date.between(window.start(), window.end()),
        );
        let rows: Vec<TimetableSlotRow> = timetable_slots::table
            .filter(timetable_slots::user_id.eq(user_id.as_uuid()))
            .filter(timetable_slots::is_active.eq(true))
            .filter(weekly.or(one_off))
            .order(timetable_slots::start_time.asc())
            .select(TimetableSlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_slots(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> TimetableSlotRow {
        let now = Utc::now();
        TimetableSlotRow {
            id: Uuid::from_u128(3),
            user_id: Uuid::from_u128(9),
            subject_id: None,
            staff_id: None,
            venue_id: None,
            day_of_week: 2,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
            period_number: Some(1),
            slot_type: "lab".to_owned(),
            is_recurring: true,
            specific_date: None,
            notes: None,
            batch_filter: Some("B1".to_owned()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn weekly_row_converts_and_back(row: TimetableSlotRow) {
        let slot = row_to_slot(row.clone()).expect("valid row");
        assert_eq!(slot.day_of_week().number(), 2);
        assert!(slot.is_recurring());
        let back = slot_to_row(&slot);
        assert_eq!(back.day_of_week, row.day_of_week);
        assert_eq!(back.batch_filter, row.batch_filter);
    }

    #[rstest]
    fn one_off_row_keeps_its_date(mut row: TimetableSlotRow) {
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).expect("date");
        row.is_recurring = false;
        row.specific_date = Some(date);
        let slot = row_to_slot(row).expect("valid row");
        assert_eq!(slot.specific_date(), Some(date));
    }

    #[rstest]
    #[case::day_out_of_range(9, true, None)]
    #[case::one_off_without_date(2, false, None)]
    fn inconsistent_rows_are_query_errors(
        mut row: TimetableSlotRow,
        #[case] day: i16,
        #[case] is_recurring: bool,
        #[case] specific_date: Option<NaiveDate>,
    ) {
        row.day_of_week = day;
        row.is_recurring = is_recurring;
        row.specific_date = specific_date;
        let error = row_to_slot(row).expect_err("inconsistent row");
        assert!(matches!(error, TimetableSlotRepositoryError::Query { .. }));
    }
}
