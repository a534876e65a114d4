//! Shared catalog of subjects, staff and venues.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    CatalogRepositoryError, StaffRepository, SubjectRepository, TimetableCatalog,
    VenueRepository,
};
use crate::domain::{
    DEFAULT_SUBJECT_TYPE, DEFAULT_VENUE_TYPE, Error, NewStaff, NewSubject, NewVenue, Staff,
    Subject, TimetableValidationError, Venue,
};

/// Repository handles for the three catalog tables.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub subjects: Arc<dyn SubjectRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub venues: Arc<dyn VenueRepository>,
}

impl CatalogRepositories {
    /// Use one adapter for all three tables.
    pub fn from_shared<A>(adapter: Arc<A>) -> Self
    where
        A: SubjectRepository + StaffRepository + VenueRepository + 'static,
    {
        Self {
            subjects: adapter.clone(),
            staff: adapter.clone(),
            venues: adapter,
        }
    }
}

pub(crate) fn map_catalog_error(error: CatalogRepositoryError) -> Error {
    match error {
        CatalogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalog repository unavailable: {message}"))
        }
        CatalogRepositoryError::Query { message } => {
            Error::internal(format!("catalog repository error: {message}"))
        }
    }
}

pub(crate) fn map_timetable_validation(error: TimetableValidationError) -> Error {
    let field = error.field();
    Error::invalid_request(error.to_string()).with_details(serde_json::json!({
        "field": field,
        "code": "invalid_field",
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

/// Catalog service implementing [`TimetableCatalog`].
#[derive(Clone)]
pub struct TimetableCatalogService {
    repositories: CatalogRepositories,
    clock: Arc<dyn Clock>,
}

impl TimetableCatalogService {
    pub fn new(repositories: CatalogRepositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repositories,
            clock,
        }
    }
}

#[async_trait]
impl TimetableCatalog for TimetableCatalogService {
    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, Error> {
        subject.validate().map_err(map_timetable_validation)?;
        let subject = Subject {
            id: Uuid::new_v4(),
            code: subject.code.trim().to_owned(),
            name: subject.name.trim().to_owned(),
            short_name: non_blank(subject.short_name),
            subject_type: non_blank(subject.subject_type)
                .unwrap_or_else(|| DEFAULT_SUBJECT_TYPE.to_owned()),
            credits: subject.credits,
            department: non_blank(subject.department),
            semester: subject.semester,
            color: non_blank(subject.color),
            created_at: self.clock.utc(),
        };
        self.repositories
            .subjects
            .create(&subject)
            .await
            .map_err(map_catalog_error)?;
        Ok(subject)
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, Error> {
        self.repositories
            .subjects
            .list_all()
            .await
            .map_err(map_catalog_error)
    }

    async fn create_staff(&self, staff: NewStaff) -> Result<Staff, Error> {
        staff.validate().map_err(map_timetable_validation)?;
        let staff = Staff {
            id: Uuid::new_v4(),
            name: staff.name.trim().to_owned(),
            title: non_blank(staff.title),
            email: non_blank(staff.email),
            phone: non_blank(staff.phone),
            department: non_blank(staff.department),
            designation: non_blank(staff.designation),
            cabin: non_blank(staff.cabin),
            created_at: self.clock.utc(),
        };
        self.repositories
            .staff
            .create(&staff)
            .await
            .map_err(map_catalog_error)?;
        Ok(staff)
    }

    async fn list_staff(&self) -> Result<Vec<Staff>, Error> {
        self.repositories
            .staff
            .list_all()
            .await
            .map_err(map_catalog_error)
    }

    async fn create_venue(&self, venue: NewVenue) -> Result<Venue, Error> {
        venue.validate().map_err(map_timetable_validation)?;
        let venue = Venue {
            id: Uuid::new_v4(),
            name: venue.name.trim().to_owned(),
            building: non_blank(venue.building),
            floor: venue.floor,
            capacity: venue.capacity,
            venue_type: non_blank(venue.venue_type)
                .unwrap_or_else(|| DEFAULT_VENUE_TYPE.to_owned()),
            facilities: venue.facilities,
            created_at: self.clock.utc(),
        };
        self.repositories
            .venues
            .create(&venue)
            .await
            .map_err(map_catalog_error)?;
        Ok(venue)
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, Error> {
        self.repositories
            .venues
            .list_all()
            .await
            .map_err(map_catalog_error)
    }
}
