//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Email, NotificationPreferences, PasswordDigest, User, UserDraft, UserId, UserProfile,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, |message| UserPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    if is_unique_violation(&error) {
        return UserPersistenceError::duplicate_email();
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        email,
        password_hash,
        full_name,
        register_number,
        department,
        year,
        semester,
        section,
        phone,
        avatar_url,
        theme,
        timezone,
        notification_prefs,
        oauth_provider,
        oauth_id,
        is_active,
        is_verified,
        last_login_at,
        created_at,
        updated_at,
    } = row;

    let email = Email::new(&email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    // Rows written before the column default existed may hold `null`.
    let notification_prefs: NotificationPreferences =
        serde_json::from_value(notification_prefs).unwrap_or_default();

    Ok(User::from(UserDraft {
        id: UserId::from_uuid(id),
        email,
        password_digest: PasswordDigest::new(password_hash),
        profile: UserProfile {
            full_name,
            register_number,
            department,
            year,
            semester,
            section,
            phone,
            avatar_url,
            theme,
            timezone,
            notification_prefs,
            oauth_provider,
            oauth_id,
        },
        is_active,
        is_verified,
        last_login_at,
        created_at,
        updated_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let profile = user.profile();
        let notification_prefs = serde_json::to_value(profile.notification_prefs)
            .map_err(|err| UserPersistenceError::query(format!("serialise preferences: {err}")))?;

        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: user.password_digest().as_str(),
            full_name: &profile.full_name,
            register_number: &profile.register_number,
            department: &profile.department,
            year: profile.year,
            semester: profile.semester,
            section: profile.section.as_deref(),
            phone: profile.phone.as_deref(),
            avatar_url: profile.avatar_url.as_deref(),
            theme: &profile.theme,
            timezone: &profile.timezone,
            notification_prefs,
            oauth_provider: profile.oauth_provider.as_deref(),
            oauth_id: profile.oauth_id.as_deref(),
            is_active: user.is_active(),
            is_verified: user.is_verified(),
            last_login_at: user.last_login_at(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }
}
