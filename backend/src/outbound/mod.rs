//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **token**: HMAC-signed JWT bearer tokens
//! - **password**: Argon2id password digests
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod password;
pub mod persistence;
pub mod token;
