//! Port for one-way password hashing.
use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential hashing adapters.
    pub enum CredentialHashError {
        /// Producing a digest failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}",
    }
}

/// Hash and verify plaintext passwords.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordDigest, CredentialHashError>;

    /// `Ok(false)` means the password does not match; errors are reserved for
    /// unusable digests.
    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, CredentialHashError>;
}
