//! Assignment use-cases with per-user ownership checks.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AssignmentCommand, AssignmentQuery, AssignmentRepository, AssignmentRepositoryError,
};
use crate::domain::{
    Assignment, AssignmentDetails, AssignmentDraft, AssignmentFilter, AssignmentRevision,
    AssignmentStatus, AssignmentValidationError, Error, UserId, ensure_owned_by,
};

const RESOURCE: &str = "Assignment";

fn map_assignment_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        AssignmentRepositoryError::Query { message } => {
            Error::internal(format!("assignment repository error: {message}"))
        }
    }
}

pub(crate) fn map_assignment_validation(error: AssignmentValidationError) -> Error {
    let field = error.field();
    Error::invalid_request(error.to_string()).with_details(serde_json::json!({
        "field": field,
        "code": "invalid_field",
    }))
}

/// Assignment service implementing the assignment driving ports.
#[derive(Clone)]
pub struct AssignmentService<R> {
    assignments: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AssignmentService<R> {
    pub fn new(assignments: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { assignments, clock }
    }
}

impl<R> AssignmentService<R>
where
    R: AssignmentRepository,
{
    /// Load `id` and confirm `user_id` owns it.
    async fn owned(&self, user_id: &UserId, id: Uuid) -> Result<Assignment, Error> {
        let assignment = self
            .assignments
            .find_by_id(&id)
            .await
            .map_err(map_assignment_error)?
            .ok_or_else(|| Error::not_found("Assignment not found"))?;
        ensure_owned_by(assignment, user_id, RESOURCE)
    }

    async fn save(&self, assignment: Assignment) -> Result<Assignment, Error> {
        self.assignments
            .update(&assignment)
            .await
            .map_err(map_assignment_error)?;
        Ok(assignment)
    }
}

#[async_trait]
impl<R> AssignmentQuery for AssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn list_assignments(
        &self,
        user_id: &UserId,
        filter: AssignmentFilter,
    ) -> Result<Vec<Assignment>, Error> {
        let now = self.clock.utc();
        let mut assignments = self
            .assignments
            .list_for_user(user_id, filter, now)
            .await
            .map_err(map_assignment_error)?;
        assignments.sort_by_key(|assignment| assignment.details().due_date);
        Ok(assignments)
    }

    async fn assignment(&self, user_id: &UserId, id: Uuid) -> Result<Assignment, Error> {
        self.owned(user_id, id).await
    }
}

#[async_trait]
impl<R> AssignmentCommand for AssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn create_assignment(
        &self,
        user_id: &UserId,
        mut details: AssignmentDetails,
    ) -> Result<Assignment, Error> {
        details.validate().map_err(map_assignment_validation)?;
        let now = self.clock.utc();
        details.assigned_date = details.assigned_date.or(Some(now.date_naive()));
        let assignment = Assignment::from(AssignmentDraft {
            id: Uuid::new_v4(),
            user_id: *user_id,
            submitted_at: (details.status == AssignmentStatus::Submitted).then_some(now),
            details,
            created_at: now,
            updated_at: now,
        });
        self.assignments
            .create(&assignment)
            .await
            .map_err(map_assignment_error)?;
        tracing::info!(assignment_id = %assignment.id(), user_id = %user_id, "assignment created");
        Ok(assignment)
    }

    async fn update_assignment(
        &self,
        user_id: &UserId,
        id: Uuid,
        revision: AssignmentRevision,
    ) -> Result<Assignment, Error> {
        revision.validate().map_err(map_assignment_validation)?;
        let mut assignment = self.owned(user_id, id).await?;
        let now = self.clock.utc();
        let previous_status = assignment.status();
        let details = revision.resolve(assignment.details().due_date);
        let status = details.status;
        assignment.revise(details, now);
        if status != previous_status {
            assignment.transition(status, now);
        }
        self.save(assignment).await
    }

    async fn update_status(
        &self,
        user_id: &UserId,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Assignment, Error> {
        let mut assignment = self.owned(user_id, id).await?;
        assignment.transition(status, self.clock.utc());
        self.save(assignment).await
    }

    async fn delete_assignment(&self, user_id: &UserId, id: Uuid) -> Result<(), Error> {
        let assignment = self.owned(user_id, id).await?;
        self.assignments
            .delete(&assignment.id())
            .await
            .map_err(map_assignment_error)?;
        tracing::info!(assignment_id = %id, user_id = %user_id, "assignment deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
