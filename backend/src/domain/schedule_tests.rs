//! Tests for slot windows and the schedule service.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockTimetableSlotRepository;
use crate::domain::{ErrorCode, SlotRecurrence};
use crate::test_support::{fixed_clock, slot_draft};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

fn day(n: i32) -> DayOfWeek {
    DayOfWeek::new(n).expect("valid day")
}

fn weekly(user_id: UserId, weekday: i32, start_hour: u32) -> TimetableSlot {
    let mut draft = slot_draft(user_id);
    draft.day_of_week = day(weekday);
    draft.start_time = time(start_hour, 0);
    draft.end_time = time(start_hour + 1, 0);
    TimetableSlot::from(draft)
}

fn one_off(user_id: UserId, on: NaiveDate) -> TimetableSlot {
    let mut draft = slot_draft(user_id);
    draft.recurrence = SlotRecurrence::OnDate(on);
    draft.day_of_week = DayOfWeek::of(on);
    TimetableSlot::from(draft)
}

#[fixture]
fn user() -> UserId {
    UserId::random()
}

// 2024-03-11 is a Monday, 2024-03-15 a Friday.
#[fixture]
fn work_week() -> SlotWindow {
    SlotWindow::new(date(2024, 3, 11), date(2024, 3, 15)).expect("ordered window")
}

#[rstest]
fn window_rejects_end_before_start() {
    assert_eq!(
        SlotWindow::new(date(2024, 3, 15), date(2024, 3, 11)),
        Err(WindowOrderError)
    );
}

#[rstest]
fn single_day_window_is_allowed() {
    let window = SlotWindow::new(date(2024, 3, 13), date(2024, 3, 13)).expect("single day");
    assert_eq!(window.start_day(), window.end_day());
}

#[rstest]
#[case(1, true)]
#[case(3, true)]
#[case(5, true)]
#[case(0, false)]
#[case(6, false)]
fn recurring_slots_match_by_weekday_number(
    work_week: SlotWindow,
    user: UserId,
    #[case] weekday: i32,
    #[case] expected: bool,
) {
    assert_eq!(work_week.admits(&weekly(user, weekday, 9)), expected);
}

#[rstest]
#[case(date(2024, 3, 11), true)]
#[case(date(2024, 3, 15), true)]
#[case(date(2024, 3, 10), false)]
#[case(date(2024, 3, 16), false)]
#[case(date(2024, 3, 18), false)]
fn one_off_slots_match_by_calendar_date(
    work_week: SlotWindow,
    user: UserId,
    #[case] on: NaiveDate,
    #[case] expected: bool,
) {
    assert_eq!(work_week.admits(&one_off(user, on)), expected);
}

#[rstest]
#[case(5, true)]
#[case(6, true)]
#[case(0, true)]
#[case(1, true)]
#[case(2, false)]
#[case(4, false)]
fn wrapping_window_admits_the_weekdays_it_spans(
    user: UserId,
    #[case] weekday: i32,
    #[case] expected: bool,
) {
    // Friday 2024-03-15 to Monday 2024-03-18.
    let window = SlotWindow::new(date(2024, 3, 15), date(2024, 3, 18)).expect("ordered");
    assert_eq!(window.admits(&weekly(user, weekday, 9)), expected);
}

#[rstest]
fn long_windows_cover_every_weekday_once() {
    let window = SlotWindow::new(date(2024, 3, 13), date(2024, 4, 30)).expect("ordered");
    let numbers: Vec<u8> = window.weekdays().into_iter().map(DayOfWeek::number).collect();
    assert_eq!(numbers, vec![3, 4, 5, 6, 0, 1, 2]);
}

#[rstest]
fn inactive_slots_are_never_admitted(work_week: SlotWindow, user: UserId) {
    let mut draft = slot_draft(user);
    draft.is_active = false;
    let slot = TimetableSlot::from(draft);
    assert!(!work_week.admits(&slot));
    assert!(!recurs_on(&slot, slot.day_of_week()));
}

#[rstest]
fn one_off_slots_never_recur(user: UserId) {
    let slot = one_off(user, date(2024, 3, 11));
    assert!(!recurs_on(&slot, day(1)));
}

#[rstest]
#[tokio::test]
async fn weekday_listing_sorts_by_start_time_and_drops_one_offs(user: UserId) {
    let late = weekly(user, 1, 14);
    let early = weekly(user, 1, 8);
    let stray = one_off(user, date(2024, 3, 11));
    let returned = vec![late.clone(), stray, early.clone()];

    let mut repo = MockTimetableSlotRepository::new();
    repo.expect_list_by_user_and_weekday()
        .times(1)
        .return_once(move |_, _| Ok(returned));
    let service = ScheduleService::new(Arc::new(repo), fixed_clock());

    let slots = service
        .slots_for_weekday(&user, day(1))
        .await
        .expect("listing succeeds");
    assert_eq!(slots, vec![early, late]);
}

#[rstest]
#[tokio::test]
async fn window_listing_keeps_store_order_for_equal_start_times(
    user: UserId,
    work_week: SlotWindow,
) {
    let first = weekly(user, 2, 10);
    let mut second_draft = slot_draft(user);
    second_draft.recurrence = SlotRecurrence::OnDate(date(2024, 3, 13));
    second_draft.start_time = first.start_time();
    second_draft.end_time = first.end_time();
    let second = TimetableSlot::from(second_draft);
    let earlier = weekly(user, 4, 7);
    let returned = vec![first.clone(), second.clone(), earlier.clone()];

    let mut repo = MockTimetableSlotRepository::new();
    repo.expect_list_by_user_and_date_range()
        .times(1)
        .return_once(move |_, _| Ok(returned));
    let service = ScheduleService::new(Arc::new(repo), fixed_clock());

    let slots = service
        .slots_in_window(&user, &work_week)
        .await
        .expect("listing succeeds");
    assert_eq!(slots, vec![earlier, first, second]);
}

#[rstest]
#[case(TimetableSlotRepositoryError::connection("pool exhausted"), ErrorCode::ServiceUnavailable)]
#[case(TimetableSlotRepositoryError::query("syntax error"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_failures_map_to_error_codes(
    user: UserId,
    work_week: SlotWindow,
    #[case] failure: TimetableSlotRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockTimetableSlotRepository::new();
    repo.expect_list_by_user_and_date_range()
        .times(1)
        .return_once(move |_, _| Err(failure));
    let service = ScheduleService::new(Arc::new(repo), fixed_clock());

    let error = service
        .slots_in_window(&user, &work_week)
        .await
        .expect_err("failure propagates");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn slot_lookup_enforces_ownership(user: UserId) {
    let slot = weekly(user, 3, 11);
    let slot_id = slot.id();
    let mut repo = MockTimetableSlotRepository::new();
    repo.expect_find_by_id()
        .times(2)
        .returning(move |_| Ok(Some(slot.clone())));
    let service = ScheduleService::new(Arc::new(repo), fixed_clock());

    let own = service.slot(&user, slot_id).await.expect("owner can read");
    assert_eq!(own.id(), slot_id);

    let error = service
        .slot(&UserId::random(), slot_id)
        .await
        .expect_err("stranger refused");
    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), "Timetable slot does not belong to user");
}

#[rstest]
#[tokio::test]
async fn missing_slot_is_not_found(user: UserId) {
    let mut repo = MockTimetableSlotRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let service = ScheduleService::new(Arc::new(repo), fixed_clock());

    let error = service
        .slot(&user, Uuid::new_v4())
        .await
        .expect_err("absent");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn created_slots_are_active_and_owned_by_the_caller(user: UserId) {
    let mut repo = MockTimetableSlotRepository::new();
    repo.expect_create().times(1).return_once(|_| Ok(()));
    let service = ScheduleService::new(Arc::new(repo), fixed_clock());
    let request = NewSlot {
        subject_id: None,
        staff_id: None,
        venue_id: None,
        day_of_week: day(2),
        start_time: time(9, 0),
        end_time: time(10, 0),
        period_number: Some(1),
        slot_type: "lab".to_owned(),
        recurrence: SlotRecurrence::Weekly,
        notes: None,
        batch_filter: None,
    };

    let slot = service
        .create_slot(&user, request)
        .await
        .expect("create succeeds");
    assert_eq!(slot.user_id(), &user);
    assert!(slot.is_active());
    assert_eq!(slot.slot_type(), "lab");
    assert_eq!(slot.created_at(), crate::test_support::fixture_timestamp());
}
