//! Ports for the shared timetable catalog: subjects, staff and venues.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Staff, Subject, Venue};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by catalog repository adapters.
    pub enum CatalogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "catalog repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalog repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn create(&self, subject: &Subject) -> Result<(), CatalogRepositoryError>;

    /// All subjects ordered by code.
    async fn list_all(&self) -> Result<Vec<Subject>, CatalogRepositoryError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Subject>, CatalogRepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn create(&self, staff: &Staff) -> Result<(), CatalogRepositoryError>;

    /// All staff ordered by name.
    async fn list_all(&self) -> Result<Vec<Staff>, CatalogRepositoryError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Staff>, CatalogRepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn create(&self, venue: &Venue) -> Result<(), CatalogRepositoryError>;

    /// All venues ordered by name.
    async fn list_all(&self) -> Result<Vec<Venue>, CatalogRepositoryError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Venue>, CatalogRepositoryError>;
}
