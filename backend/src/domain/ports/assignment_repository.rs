//! Port for per-user assignment storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Assignment, AssignmentFilter, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by assignment repository adapters.
    pub enum AssignmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "assignment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn create(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError>;

    /// Fetch an assignment by identifier regardless of owner.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Assignment>, AssignmentRepositoryError>;

    /// Assignments owned by `user_id` that pass `filter` at `now`, earliest
    /// due date first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: AssignmentFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError>;

    /// Overwrite the stored row with `assignment`.
    async fn update(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError>;

    async fn delete(&self, id: &Uuid) -> Result<(), AssignmentRepositoryError>;
}
