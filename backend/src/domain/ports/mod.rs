//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, token signing) expose typed errors
//! so adapters map their failures into predictable variants. Driving ports
//! (queries and commands) speak the domain [`Error`](crate::domain::Error)
//! that inbound adapters render directly.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod assignment_repository;
mod assignments;
mod calendar_export;
mod catalog_repository;
mod credential_hasher;
mod schedule_query;
mod timetable_catalog;
mod timetable_slot_repository;
mod token_authority;
mod user_repository;

pub use accounts::{AccountCommand, AuthSession, UserProfileQuery};
#[cfg(test)]
pub use assignment_repository::MockAssignmentRepository;
pub use assignment_repository::{AssignmentRepository, AssignmentRepositoryError};
pub use assignments::{AssignmentCommand, AssignmentQuery};
pub use calendar_export::{CalendarExport, ExportRange};
pub use catalog_repository::{
    CatalogRepositoryError, StaffRepository, SubjectRepository, VenueRepository,
};
#[cfg(test)]
pub use catalog_repository::{MockStaffRepository, MockSubjectRepository, MockVenueRepository};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use schedule_query::{ScheduleQuery, SlotCommand};
pub use timetable_catalog::TimetableCatalog;
#[cfg(test)]
pub use timetable_slot_repository::MockTimetableSlotRepository;
pub use timetable_slot_repository::{TimetableSlotRepository, TimetableSlotRepositoryError};
#[cfg(test)]
pub use token_authority::MockTokenAuthority;
pub use token_authority::{FixtureTokenAuthority, TokenAuthority};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
