//! Port for issuing and validating bearer tokens.
use crate::domain::{AuthError, Error, UserId};

/// Signs access tokens for authenticated users and resolves them back to a
/// user id on later requests.
#[cfg_attr(test, mockall::automock)]
pub trait TokenAuthority: Send + Sync {
    /// Mint a token for `user_id`, valid for the configured lifetime.
    fn issue_token(&self, user_id: &UserId) -> Result<String, Error>;

    /// Check signature, algorithm and expiry and return the subject.
    fn validate_token(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Token authority that accepts only its own fixed token.
///
/// Handler tests use this so they can authenticate without signing keys.
#[derive(Debug, Clone)]
pub struct FixtureTokenAuthority {
    token: String,
    user_id: UserId,
}

impl FixtureTokenAuthority {
    pub const TOKEN: &'static str = "fixture-token";

    pub fn new(user_id: UserId) -> Self {
        Self {
            token: Self::TOKEN.to_owned(),
            user_id,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl Default for FixtureTokenAuthority {
    fn default() -> Self {
        Self::new(UserId::from_uuid(uuid::Uuid::from_u128(
            0x1111_1111_1111_4111_8111_1111_1111_1111,
        )))
    }
}

impl TokenAuthority for FixtureTokenAuthority {
    fn issue_token(&self, _user_id: &UserId) -> Result<String, Error> {
        Ok(self.token.clone())
    }

    fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        if token == self.token {
            Ok(self.user_id)
        } else {
            Err(AuthError::Invalid)
        }
    }
}
