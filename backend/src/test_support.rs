//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and when the `test-support` feature is enabled.
//! The in-memory repositories apply the same predicates the SQL adapters
//! express in their queries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AssignmentRepository, AssignmentRepositoryError, CatalogRepositoryError, CredentialHashError,
    CredentialHasher, StaffRepository, SubjectRepository, TimetableSlotRepository,
    TimetableSlotRepositoryError, TokenAuthority, UserPersistenceError, UserRepository,
    VenueRepository,
};
use crate::domain::{
    Assignment, AssignmentDetails, AssignmentFilter, AssignmentStatus, DEFAULT_REMINDER_BEFORE_HOURS,
    DEFAULT_SLOT_TYPE, DEFAULT_THEME, DEFAULT_TIMEZONE, DayOfWeek, Email, NotificationPreferences,
    PasswordDigest, Priority, SlotRecurrence, SlotWindow, Staff, Subject, TimetableSlot,
    TimetableSlotDraft, User, UserDraft, UserId, UserProfile, Venue, recurs_on,
};
use crate::domain::{
    AccountService, AssignmentService, CalendarExportService, CatalogRepositories,
    ScheduleService, TimetableCatalogService,
};
use crate::inbound::http::state::HttpState;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Monday 2024-03-11 08:30 UTC.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 11, 8, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock frozen at [`fixture_timestamp`].
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock::at(fixture_timestamp()))
}

/// Reversible stand-in for a password hasher: digests are `plain:<password>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHasher;

impl CredentialHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, CredentialHashError> {
        Ok(PasswordDigest::new(format!("plain:{password}")))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, CredentialHashError> {
        digest
            .as_str()
            .strip_prefix("plain:")
            .map(|stored| stored == password)
            .ok_or_else(|| CredentialHashError::malformed_digest("missing plain: prefix"))
    }
}

/// Active user draft whose password digest is produced by [`PlainTextHasher`].
pub fn sample_user_draft(email: &str, password: &str) -> UserDraft {
    UserDraft {
        id: UserId::random(),
        email: Email::new(email).unwrap_or_else(|err| panic!("fixture email {email}: {err}")),
        password_digest: PasswordDigest::new(format!("plain:{password}")),
        profile: UserProfile {
            full_name: "Ada Lovelace".to_owned(),
            register_number: "21CS001".to_owned(),
            department: "CSE".to_owned(),
            year: 2,
            semester: 3,
            section: None,
            phone: None,
            avatar_url: None,
            theme: DEFAULT_THEME.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            notification_prefs: NotificationPreferences::default(),
            oauth_provider: None,
            oauth_id: None,
        },
        is_active: true,
        is_verified: false,
        last_login_at: None,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

pub fn sample_user(email: &str, password: &str) -> User {
    User::from(sample_user_draft(email, password))
}

/// Weekly Monday 09:00-10:00 lecture owned by `user_id`.
pub fn slot_draft(user_id: UserId) -> TimetableSlotDraft {
    TimetableSlotDraft {
        id: Uuid::new_v4(),
        user_id,
        subject_id: None,
        staff_id: None,
        venue_id: None,
        day_of_week: DayOfWeek::new(1).unwrap_or_else(|err| panic!("monday: {err}")),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
        period_number: None,
        slot_type: DEFAULT_SLOT_TYPE.to_owned(),
        recurrence: SlotRecurrence::Weekly,
        notes: None,
        batch_filter: None,
        is_active: true,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

pub fn sample_subject(code: &str, name: &str) -> Subject {
    Subject {
        id: Uuid::new_v4(),
        code: code.to_owned(),
        name: name.to_owned(),
        short_name: None,
        subject_type: "theory".to_owned(),
        credits: Some(4),
        department: None,
        semester: None,
        color: None,
        created_at: fixture_timestamp(),
    }
}

pub fn sample_staff(name: &str) -> Staff {
    Staff {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        title: None,
        email: None,
        phone: None,
        department: None,
        designation: None,
        cabin: None,
        created_at: fixture_timestamp(),
    }
}

pub fn sample_venue(name: &str) -> Venue {
    Venue {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        building: None,
        floor: None,
        capacity: None,
        venue_type: "classroom".to_owned(),
        facilities: Vec::new(),
        created_at: fixture_timestamp(),
    }
}

/// Pending medium-priority homework due at `due_date`.
pub fn sample_details(due_date: DateTime<Utc>) -> AssignmentDetails {
    AssignmentDetails {
        subject_id: None,
        staff_id: None,
        title: "Problem set".to_owned(),
        description: Some("Chapters 1-3".to_owned()),
        instructions: None,
        assignment_type: "homework".to_owned(),
        assigned_date: None,
        due_date,
        status: AssignmentStatus::Pending,
        max_marks: None,
        obtained_marks: None,
        feedback: None,
        priority: Priority::Medium,
        estimated_hours: None,
        actual_hours: None,
        reminder_enabled: true,
        reminder_before_hours: DEFAULT_REMINDER_BEFORE_HOURS,
        tags: Vec::new(),
        is_recurring: false,
        recurrence_pattern: None,
    }
}

/// User store keyed by insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users);
        if users.iter().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email());
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users)
            .iter()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users).iter().find(|user| user.id() == id).cloned())
    }
}

/// Subject, staff and venue tables in one adapter.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    subjects: Mutex<Vec<Subject>>,
    staff: Mutex<Vec<Staff>>,
    venues: Mutex<Vec<Venue>>,
}

impl InMemoryCatalog {
    pub fn insert_subject(&self, subject: Subject) {
        lock(&self.subjects).push(subject);
    }

    pub fn insert_staff(&self, staff: Staff) {
        lock(&self.staff).push(staff);
    }

    pub fn insert_venue(&self, venue: Venue) {
        lock(&self.venues).push(venue);
    }
}

#[async_trait]
impl SubjectRepository for InMemoryCatalog {
    async fn create(&self, subject: &Subject) -> Result<(), CatalogRepositoryError> {
        self.insert_subject(subject.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Subject>, CatalogRepositoryError> {
        let mut subjects = lock(&self.subjects).clone();
        subjects.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(subjects)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Subject>, CatalogRepositoryError> {
        Ok(lock(&self.subjects).iter().find(|s| &s.id == id).cloned())
    }
}

#[async_trait]
impl StaffRepository for InMemoryCatalog {
    async fn create(&self, staff: &Staff) -> Result<(), CatalogRepositoryError> {
        self.insert_staff(staff.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Staff>, CatalogRepositoryError> {
        let mut staff = lock(&self.staff).clone();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Staff>, CatalogRepositoryError> {
        Ok(lock(&self.staff).iter().find(|s| &s.id == id).cloned())
    }
}

#[async_trait]
impl VenueRepository for InMemoryCatalog {
    async fn create(&self, venue: &Venue) -> Result<(), CatalogRepositoryError> {
        self.insert_venue(venue.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Venue>, CatalogRepositoryError> {
        let mut venues = lock(&self.venues).clone();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Venue>, CatalogRepositoryError> {
        Ok(lock(&self.venues).iter().find(|v| &v.id == id).cloned())
    }
}

/// Slot store returning rows in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTimetableSlotRepository {
    slots: Mutex<Vec<TimetableSlot>>,
}

impl InMemoryTimetableSlotRepository {
    pub fn insert(&self, slot: TimetableSlot) {
        lock(&self.slots).push(slot);
    }
}

#[async_trait]
impl TimetableSlotRepository for InMemoryTimetableSlotRepository {
    async fn create(&self, slot: &TimetableSlot) -> Result<(), TimetableSlotRepositoryError> {
        self.insert(slot.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<TimetableSlot>, TimetableSlotRepositoryError> {
        Ok(lock(&self.slots)
            .iter()
            .find(|slot| &slot.id() == id)
            .cloned())
    }

    async fn list_by_user_and_weekday(
        &self,
        user_id: &UserId,
        day: DayOfWeek,
    ) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError> {
        Ok(lock(&self.slots)
            .iter()
            .filter(|slot| slot.user_id() == user_id && recurs_on(slot, day))
            .cloned()
            .collect())
    }

    async fn list_by_user_and_date_range(
        &self,
        user_id: &UserId,
        window: &SlotWindow,
    ) -> Result<Vec<TimetableSlot>, TimetableSlotRepositoryError> {
        Ok(lock(&self.slots)
            .iter()
            .filter(|slot| slot.user_id() == user_id && window.admits(slot))
            .cloned()
            .collect())
    }
}

/// Assignment store.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentRepository {
    assignments: Mutex<Vec<Assignment>>,
}

impl InMemoryAssignmentRepository {
    pub fn len(&self) -> usize {
        lock(&self.assignments).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn create(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        lock(&self.assignments).push(assignment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        Ok(lock(&self.assignments)
            .iter()
            .find(|a| &a.id() == id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: AssignmentFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let mut listed: Vec<Assignment> = lock(&self.assignments)
            .iter()
            .filter(|a| a.user_id() == user_id)
            .filter(|a| filter.admits(a.status(), a.details().due_date, now))
            .cloned()
            .collect();
        listed.sort_by_key(|a| a.details().due_date);
        Ok(listed)
    }

    async fn update(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        let mut assignments = lock(&self.assignments);
        match assignments.iter_mut().find(|a| a.id() == assignment.id()) {
            Some(stored) => {
                *stored = assignment.clone();
                Ok(())
            }
            None => Err(AssignmentRepositoryError::query("assignment row missing")),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AssignmentRepositoryError> {
        lock(&self.assignments).retain(|a| &a.id() != id);
        Ok(())
    }
}

/// One in-memory store per port, wired into an [`HttpState`] on demand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    pub users: Arc<InMemoryUserRepository>,
    pub catalog: Arc<InMemoryCatalog>,
    pub slots: Arc<InMemoryTimetableSlotRepository>,
    pub assignments: Arc<InMemoryAssignmentRepository>,
}

impl InMemoryBackend {
    /// Build the handler state the production server would build, backed by
    /// these stores.
    pub fn http_state(
        &self,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenAuthority>,
        clock: Arc<dyn Clock>,
    ) -> HttpState {
        let accounts = Arc::new(AccountService::new(
            self.users.clone(),
            hasher,
            tokens.clone(),
            clock.clone(),
        ));
        let schedule = Arc::new(ScheduleService::new(self.slots.clone(), clock.clone()));
        let catalog_repositories = CatalogRepositories::from_shared(self.catalog.clone());
        let assignments = Arc::new(AssignmentService::new(
            self.assignments.clone(),
            clock.clone(),
        ));
        HttpState {
            accounts: accounts.clone(),
            profiles: accounts,
            tokens,
            catalog: Arc::new(TimetableCatalogService::new(
                catalog_repositories.clone(),
                clock.clone(),
            )),
            schedule: schedule.clone(),
            slots: schedule.clone(),
            calendar: Arc::new(CalendarExportService::new(
                schedule,
                catalog_repositories,
                clock,
            )),
            assignments: assignments.clone(),
            assignments_query: assignments,
        }
    }
}
