//! Ownership checks shared by every per-user entity.
//!
//! An entity that exists but belongs to someone else yields `403 Forbidden`;
//! callers handle absence (`404 Not Found`) before asking this module.

use crate::domain::{Error, UserId};

/// Entity owned by exactly one user.
pub trait OwnedResource {
    /// Identifier of the owning user.
    fn owner(&self) -> &UserId;
}

/// Return the resource when `actor` owns it, otherwise a forbidden error
/// naming the resource kind (`"Assignment does not belong to user"`).
///
/// # Examples
/// ```
/// use campus_backend::domain::{ensure_owned_by, ErrorCode, OwnedResource, UserId};
///
/// struct Note(UserId);
/// impl OwnedResource for Note {
///     fn owner(&self) -> &UserId {
///         &self.0
///     }
/// }
///
/// let owner = UserId::random();
/// let note = Note(owner);
/// assert!(ensure_owned_by(note, &owner, "Note").is_ok());
///
/// let err = ensure_owned_by(Note(owner), &UserId::random(), "Note").err().expect("forbidden");
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn ensure_owned_by<T>(resource: T, actor: &UserId, kind: &str) -> Result<T, Error>
where
    T: OwnedResource,
{
    if resource.owner() == actor {
        Ok(resource)
    } else {
        tracing::debug!(%actor, owner = %resource.owner(), kind, "ownership check refused access");
        Err(Error::forbidden(format!("{kind} does not belong to user")))
    }
}
