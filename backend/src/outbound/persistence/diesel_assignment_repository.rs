//! PostgreSQL-backed `AssignmentRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{
    Assignment, AssignmentDetails, AssignmentDraft, AssignmentFilter, AssignmentStatus,
    AssignmentValidationError, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AssignmentRow, AssignmentUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::assignments;

/// Statuses the pending and overdue listings consider open.
const OPEN_STATUSES: [AssignmentStatus; 2] =
    [AssignmentStatus::Pending, AssignmentStatus::InProgress];

/// Diesel-backed implementation of the assignment port.
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
}

impl DieselAssignmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AssignmentRepositoryError {
    map_basic_pool_error(error, |message| AssignmentRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> AssignmentRepositoryError {
    map_basic_diesel_error(
        error,
        AssignmentRepositoryError::query,
        AssignmentRepositoryError::connection,
    )
}

fn row_to_assignment(row: AssignmentRow) -> Result<Assignment, AssignmentRepositoryError> {
    let corrupt = |err: AssignmentValidationError| {
        AssignmentRepositoryError::query(format!("assignment {}: {err}", row.id))
    };
    let status = row.status.parse().map_err(corrupt)?;
    let priority = row.priority.parse().map_err(corrupt)?;

    Ok(Assignment::from(AssignmentDraft {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        details: AssignmentDetails {
            subject_id: row.subject_id,
            staff_id: row.staff_id,
            title: row.title,
            description: row.description,
            instructions: row.instructions,
            assignment_type: row.assignment_type,
            assigned_date: row.assigned_date,
            due_date: row.due_date,
            status,
            max_marks: row.max_marks,
            obtained_marks: row.obtained_marks,
            feedback: row.feedback,
            priority,
            estimated_hours: row.estimated_hours,
            actual_hours: row.actual_hours,
            reminder_enabled: row.reminder_enabled,
            reminder_before_hours: row.reminder_before_hours,
            tags: row.tags,
            is_recurring: row.is_recurring,
            recurrence_pattern: row.recurrence_pattern,
        },
        submitted_at: row.submitted_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn assignment_to_row(assignment: &Assignment) -> AssignmentRow {
    let details = assignment.details().clone();
    AssignmentRow {
        id: assignment.id(),
        user_id: *assignment.user_id().as_uuid(),
        subject_id: details.subject_id,
        staff_id: details.staff_id,
        title: details.title,
        description: details.description,
        instructions: details.instructions,
        assignment_type: details.assignment_type,
        assigned_date: details.assigned_date,
        due_date: details.due_date,
        submitted_at: assignment.submitted_at(),
        status: details.status.as_str().to_owned(),
        max_marks: details.max_marks,
        obtained_marks: details.obtained_marks,
        feedback: details.feedback,
        priority: details.priority.as_str().to_owned(),
        estimated_hours: details.estimated_hours,
        actual_hours: details.actual_hours,
        reminder_enabled: details.reminder_enabled,
        reminder_before_hours: details.reminder_before_hours,
        tags: details.tags,
        is_recurring: details.is_recurring,
        recurrence_pattern: details.recurrence_pattern,
        created_at: assignment.created_at(),
        updated_at: assignment.updated_at(),
    }
}

impl From<AssignmentRow> for AssignmentUpdate {
    fn from(row: AssignmentRow) -> Self {
        Self {
            subject_id: row.subject_id,
            staff_id: row.staff_id,
            title: row.title,
            description: row.description,
            instructions: row.instructions,
            assignment_type: row.assignment_type,
            assigned_date: row.assigned_date,
            due_date: row.due_date,
            submitted_at: row.submitted_at,
            status: row.status,
            max_marks: row.max_marks,
            obtained_marks: row.obtained_marks,
            feedback: row.feedback,
            priority: row.priority,
            estimated_hours: row.estimated_hours,
            actual_hours: row.actual_hours,
            reminder_enabled: row.reminder_enabled,
            reminder_before_hours: row.reminder_before_hours,
            tags: row.tags,
            is_recurring: row.is_recurring,
            recurrence_pattern: row.recurrence_pattern,
            updated_at: row.updated_at,
        }
    }
}

fn open_status_values() -> Vec<&'static str> {
    OPEN_STATUSES.iter().map(|status| status.as_str()).collect()
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn create(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(assignments::table)
            .values(&assignment_to_row(assignment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        assignments::table
            .find(id)
            .select(AssignmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_assignment)
            .transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: AssignmentFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = assignments::table
            .filter(assignments::user_id.eq(*user_id.as_uuid()))
            .into_boxed();
        query = match filter {
            AssignmentFilter::All => query,
            AssignmentFilter::Pending => query
                .filter(assignments::status.eq_any(open_status_values()))
                .filter(assignments::due_date.ge(now)),
            AssignmentFilter::Overdue => query
                .filter(assignments::status.eq_any(open_status_values()))
                .filter(assignments::due_date.lt(now)),
        };
        let rows: Vec<AssignmentRow> = query
            .order(assignments::due_date.asc())
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_assignment).collect()
    }

    async fn update(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = AssignmentUpdate::from(assignment_to_row(assignment));
        let updated = diesel::update(assignments::table.find(assignment.id()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(AssignmentRepositoryError::query(format!(
                "assignment {} not found for update",
                assignment.id()
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(assignments::table.find(id))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
