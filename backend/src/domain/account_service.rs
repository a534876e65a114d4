//! Account registration, login and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::task::spawn_blocking;
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, AuthSession, CredentialHashError, CredentialHasher, TokenAuthority,
    UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{
    DEFAULT_THEME, DEFAULT_TIMEZONE, Error, LoginCredentials, NotificationPreferences,
    PasswordDigest, Registration, User, UserDraft, UserId, UserProfile,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Argon2id digest with the production parameters and no known password.
/// Unknown and inactive accounts are checked against it so every failed
/// login pays for one verification.
pub(crate) const DECOY_DIGEST: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$df7rD2l1kbvLnvmLlOUN8w$jOrLHEomsuxliL8DwN+EMAMHfpqjunykNnOkdVU0vqY";

fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => Error::conflict(error.to_string()),
    }
}

fn map_hash_error(error: CredentialHashError) -> Error {
    Error::internal(error.to_string())
}

/// Account service implementing [`AccountCommand`] and [`UserProfileQuery`].
#[derive(Clone)]
pub struct AccountService<R> {
    users: Arc<R>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenAuthority>,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R> {
    pub fn new(
        users: Arc<R>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenAuthority>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    async fn hash_password(&self, password: &str) -> Result<PasswordDigest, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing aborted: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: &str, digest: PasswordDigest) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|err| Error::internal(format!("password check aborted: {err}")))?
            .map_err(map_hash_error)
    }

    async fn refuse_login(&self, password: &str) -> Error {
        if let Err(error) = self
            .verify_password(password, PasswordDigest::new(DECOY_DIGEST))
            .await
        {
            tracing::debug!(%error, "decoy password check failed");
        }
        Error::unauthorized(INVALID_CREDENTIALS)
    }

    fn session_for(&self, user: User) -> Result<AuthSession, Error> {
        let token = self.tokens.issue_token(user.id())?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl<R> AccountCommand for AccountService<R>
where
    R: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let Registration {
            email,
            password,
            full_name,
            register_number,
            department,
            year,
            semester,
            section,
            phone,
        } = registration;

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repository_error)?
            .is_some()
        {
            return Err(map_user_repository_error(
                UserPersistenceError::duplicate_email(),
            ));
        }

        let password_digest = self.hash_password(&password).await?;
        let now = self.clock.utc();
        let user = User::from(UserDraft {
            id: UserId::random(),
            email,
            password_digest,
            profile: UserProfile {
                full_name,
                register_number,
                department,
                year,
                semester,
                section,
                phone,
                avatar_url: None,
                theme: DEFAULT_THEME.to_owned(),
                timezone: DEFAULT_TIMEZONE.to_owned(),
                notification_prefs: NotificationPreferences::default(),
                oauth_provider: None,
                oauth_id: None,
            },
            is_active: true,
            is_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        });

        self.users
            .create(&user)
            .await
            .map_err(map_user_repository_error)?;
        tracing::info!(user_id = %user.id(), "user registered");
        self.session_for(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, Error> {
        let found = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?;
        let user = match found {
            Some(user) if user.is_active() => user,
            Some(user) => {
                tracing::debug!(user_id = %user.id(), "login refused for inactive account");
                return Err(self.refuse_login(credentials.password()).await);
            }
            None => return Err(self.refuse_login(credentials.password()).await),
        };

        let matches = self
            .verify_password(credentials.password(), user.password_digest().clone())
            .await?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session_for(user)
    }
}

#[async_trait]
impl<R> UserProfileQuery for AccountService<R>
where
    R: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
