//! Driving port for the shared subject, staff and venue catalog.

use async_trait::async_trait;

use crate::domain::{Error, NewStaff, NewSubject, NewVenue, Staff, Subject, Venue};

#[async_trait]
pub trait TimetableCatalog: Send + Sync {
    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, Error>;
    async fn list_subjects(&self) -> Result<Vec<Subject>, Error>;
    async fn create_staff(&self, staff: NewStaff) -> Result<Staff, Error>;
    async fn list_staff(&self) -> Result<Vec<Staff>, Error>;
    async fn create_venue(&self, venue: NewVenue) -> Result<Venue, Error>;
    async fn list_venues(&self) -> Result<Vec<Venue>, Error>;
}
