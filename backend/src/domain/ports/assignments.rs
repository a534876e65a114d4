//! Driving ports for a student's assignments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Assignment, AssignmentDetails, AssignmentFilter, AssignmentRevision, AssignmentStatus, Error,
    UserId,
};

#[async_trait]
pub trait AssignmentQuery: Send + Sync {
    /// The caller's assignments passing `filter`, earliest due first.
    async fn list_assignments(
        &self,
        user_id: &UserId,
        filter: AssignmentFilter,
    ) -> Result<Vec<Assignment>, Error>;

    async fn assignment(&self, user_id: &UserId, id: Uuid) -> Result<Assignment, Error>;
}

/// Mutations on assignments; every operation other than create checks
/// ownership before touching storage.
#[async_trait]
pub trait AssignmentCommand: Send + Sync {
    async fn create_assignment(
        &self,
        user_id: &UserId,
        details: AssignmentDetails,
    ) -> Result<Assignment, Error>;

    async fn update_assignment(
        &self,
        user_id: &UserId,
        id: Uuid,
        revision: AssignmentRevision,
    ) -> Result<Assignment, Error>;

    async fn update_status(
        &self,
        user_id: &UserId,
        id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Assignment, Error>;

    async fn delete_assignment(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;
}
