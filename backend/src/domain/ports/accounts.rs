//! Driving ports for account registration, login and profile lookup.
//!
//! Inbound adapters call these without knowing how users are stored or how
//! tokens are signed.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

/// A user paired with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Use-cases that create or authenticate accounts.
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and sign the new user in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Exchange credentials for a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error>;
}

/// Read access to the authenticated user's own record.
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}
