//! Wire Diesel repositories, credential adapters and domain services into
//! the handler state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use campus_backend::domain::ports::{CredentialHasher, TokenAuthority};
use campus_backend::domain::{
    AccountService, AssignmentService, CalendarExportService, CatalogRepositories,
    ScheduleService, TimetableCatalogService,
};
use campus_backend::inbound::http::state::HttpState;
use campus_backend::outbound::password::Argon2CredentialHasher;
use campus_backend::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselCatalogRepository, DieselTimetableSlotRepository,
    DieselUserRepository,
};
use campus_backend::outbound::token::JwtTokenAuthority;

/// Build production handler state over `pool`, signing tokens with
/// `jwt_secret`.
pub fn build_http_state(pool: &DbPool, jwt_secret: &[u8]) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2CredentialHasher);
    let tokens: Arc<dyn TokenAuthority> =
        Arc::new(JwtTokenAuthority::new(jwt_secret, clock.clone()));

    let accounts = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        hasher,
        tokens.clone(),
        clock.clone(),
    ));
    let catalog = CatalogRepositories::from_shared(Arc::new(DieselCatalogRepository::new(
        pool.clone(),
    )));
    let schedule = Arc::new(ScheduleService::new(
        Arc::new(DieselTimetableSlotRepository::new(pool.clone())),
        clock.clone(),
    ));
    let assignments = Arc::new(AssignmentService::new(
        Arc::new(DieselAssignmentRepository::new(pool.clone())),
        clock.clone(),
    ));

    HttpState {
        accounts: accounts.clone(),
        profiles: accounts,
        tokens,
        catalog: Arc::new(TimetableCatalogService::new(catalog.clone(), clock.clone())),
        schedule: schedule.clone(),
        slots: schedule.clone(),
        calendar: Arc::new(CalendarExportService::new(schedule, catalog, clock)),
        assignments: assignments.clone(),
        assignments_query: assignments,
    }
}
