//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - Repository implementations only translate between Diesel rows and
//!   domain types. No business rules live here.
//! - Row structs (`models.rs`) and the schema (`schema.rs`) stay private to
//!   this module.
//! - Every database failure is mapped onto the owning port's error type.
//!
//! # Example
//!
//! ```ignore
//! use campus_backend::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/campus");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_assignment_repository;
mod diesel_basic_error_mapping;
mod diesel_catalog_repository;
mod diesel_timetable_slot_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_timetable_slot_repository::DieselTimetableSlotRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
