//! User identity and profile model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Theme assigned to freshly registered accounts.
pub const DEFAULT_THEME: &str = "system";
/// Timezone assigned to freshly registered accounts.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Validation errors for user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must be a valid address")]
    InvalidEmail,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from text.
    ///
    /// # Examples
    /// ```
    /// use campus_backend::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// assert!(UserId::new("nope").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use campus_backend::domain::Email;
    ///
    /// let email = Email::new("  Ada@Example.EDU ").expect("valid");
    /// assert_eq!(email.as_ref(), "ada@example.edu");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded password hash (PHC string). Never rendered to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an encoded hash produced by a credential hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Notification switches stored alongside the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub push: bool,
    pub email: bool,
    pub morning_briefing: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push: true,
            email: true,
            morning_briefing: true,
        }
    }
}

/// Academic and presentation profile of a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub full_name: String,
    pub register_number: String,
    pub department: String,
    pub year: i32,
    pub semester: i32,
    pub section: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: String,
    pub timezone: String,
    pub notification_prefs: NotificationPreferences,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
}

/// Field bundle used to build a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub email: Email,
    pub password_digest: PasswordDigest,
    pub profile: UserProfile,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registered account.
///
/// Users are deactivated rather than deleted; inactive accounts cannot log in.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    email: Email,
    password_digest: PasswordDigest,
    profile: UserProfile,
    is_active: bool,
    is_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserDraft> for User {
    fn from(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            email,
            password_digest,
            profile,
            is_active,
            is_verified,
            last_login_at,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            email,
            password_digest,
            profile,
            is_active,
            is_verified,
            last_login_at,
            created_at,
            updated_at,
        }
    }
}

impl User {
    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw).expect_err("must fail"), expected);
    }

    #[rstest]
    fn user_id_serialises_as_string() {
        let id = UserId::random();
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::Value::String(id.to_string()));
    }

    #[rstest]
    #[case("student@campus.edu")]
    #[case("First.Last+tag@dept.uni.ac.in")]
    fn email_accepts_addresses(#[case] raw: &str) {
        let email = Email::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), raw.to_lowercase());
    }

    #[rstest]
    #[case("")]
    #[case("plainaddress")]
    #[case("two@@signs.com")]
    #[case("space in@local.com")]
    #[case("no-tld@host")]
    fn email_rejects_malformed(#[case] raw: &str) {
        assert_eq!(
            Email::new(raw).expect_err("must fail"),
            UserValidationError::InvalidEmail
        );
    }

    #[rstest]
    fn password_digest_debug_is_redacted() {
        let digest = PasswordDigest::new("$argon2id$v=19$secret");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(..)");
    }

    #[rstest]
    fn notification_preferences_default_to_enabled() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.push && prefs.email && prefs.morning_briefing);
    }
}
