//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised with in-memory services.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AssignmentCommand, AssignmentQuery, CalendarExport, ScheduleQuery,
    SlotCommand, TimetableCatalog, TokenAuthority, UserProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn UserProfileQuery>,
    /// Consulted by the `AuthenticatedUser` extractor on every protected route.
    pub tokens: Arc<dyn TokenAuthority>,
    pub catalog: Arc<dyn TimetableCatalog>,
    pub schedule: Arc<dyn ScheduleQuery>,
    pub slots: Arc<dyn SlotCommand>,
    pub calendar: Arc<dyn CalendarExport>,
    pub assignments: Arc<dyn AssignmentCommand>,
    pub assignments_query: Arc<dyn AssignmentQuery>,
}
