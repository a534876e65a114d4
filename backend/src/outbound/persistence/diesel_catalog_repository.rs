//! PostgreSQL-backed catalog repositories for subjects, staff and venues.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    CatalogRepositoryError, StaffRepository, SubjectRepository, VenueRepository,
};
use crate::domain::{Staff, Subject, Venue};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{StaffRow, SubjectRow, VenueRow};
use super::pool::{DbPool, PoolError};
use super::schema::{staff, subjects, venues};

/// Diesel-backed implementation of the three catalog ports.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogRepositoryError {
    map_basic_pool_error(error, |message| CatalogRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogRepositoryError::query,
        CatalogRepositoryError::connection,
    )
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            short_name: row.short_name,
            subject_type: row.subject_type,
            credits: row.credits,
            department: row.department,
            semester: row.semester,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

impl From<&Subject> for SubjectRow {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            code: subject.code.clone(),
            name: subject.name.clone(),
            short_name: subject.short_name.clone(),
            subject_type: subject.subject_type.clone(),
            credits: subject.credits,
            department: subject.department.clone(),
            semester: subject.semester,
            color: subject.color.clone(),
            created_at: subject.created_at,
        }
    }
}

impl From<StaffRow> for Staff {
    fn from(row: StaffRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            title: row.title,
            email: row.email,
            phone: row.phone,
            department: row.department,
            designation: row.designation,
            cabin: row.cabin,
            created_at: row.created_at,
        }
    }
}

impl From<&Staff> for StaffRow {
    fn from(member: &Staff) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            title: member.title.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            department: member.department.clone(),
            designation: member.designation.clone(),
            cabin: member.cabin.clone(),
            created_at: member.created_at,
        }
    }
}

/// Venue rows store facilities as a JSON array of strings.
fn row_to_venue(row: VenueRow) -> Result<Venue, CatalogRepositoryError> {
    let facilities = match row.facilities {
        serde_json::Value::Null => Vec::new(),
        value => serde_json::from_value(value).map_err(|err| {
            CatalogRepositoryError::query(format!("venue facilities malformed: {err}"))
        })?,
    };
    Ok(Venue {
        id: row.id,
        name: row.name,
        building: row.building,
        floor: row.floor,
        capacity: row.capacity,
        venue_type: row.venue_type,
        facilities,
        created_at: row.created_at,
    })
}

fn venue_to_row(venue: &Venue) -> VenueRow {
    VenueRow {
        id: venue.id,
        name: venue.name.clone(),
        building: venue.building.clone(),
        floor: venue.floor,
        capacity: venue.capacity,
        venue_type: venue.venue_type.clone(),
        facilities: serde_json::Value::from(venue.facilities.clone()),
        created_at: venue.created_at,
    }
}

#[async_trait]
impl SubjectRepository for DieselCatalogRepository {
    async fn create(&self, subject: &Subject) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(subjects::table)
            .values(&SubjectRow::from(subject))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_all(&self) -> Result<Vec<Subject>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SubjectRow> = subjects::table
            .order(subjects::code.asc())
            .select(SubjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Subject::from).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Subject>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        subjects::table
            .find(id)
            .select(SubjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Subject::from))
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl StaffRepository for DieselCatalogRepository {
    async fn create(&self, member: &Staff) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(staff::table)
            .values(&StaffRow::from(member))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_all(&self) -> Result<Vec<Staff>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<StaffRow> = staff::table
            .order(staff::name.asc())
            .select(StaffRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Staff::from).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Staff>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        staff::table
            .find(id)
            .select(StaffRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Staff::from))
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl VenueRepository for DieselCatalogRepository {
    async fn create(&self, venue: &Venue) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(venues::table)
            .values(&venue_to_row(venue))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_all(&self) -> Result<Vec<Venue>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<VenueRow> = venues::table
            .order(venues::name.asc())
            .select(VenueRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_venue).collect()
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Venue>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        venues::table
            .find(id)
            .select(VenueRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_venue)
            .transpose()
    }
}
