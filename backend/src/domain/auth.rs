//! Authentication primitives: credentials, registration input and the
//! bearer-token failure taxonomy.
//!
//! Inbound adapters build these types from raw strings so that services only
//! ever see validated values.

use zeroize::Zeroizing;

use crate::domain::{Email, Error, UserValidationError};

/// Lifetime of an issued bearer token, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;
/// Minimum accepted password length at registration.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Reasons a bearer token is refused.
///
/// Every variant maps to `401 Unauthorized`; the distinction exists for logs
/// and for clients that want to prompt a re-login on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[error("authorization header required")]
    Missing,
    /// The token or header could not be parsed, or names a non-HMAC algorithm.
    #[error("invalid authorization header format")]
    Malformed,
    /// The token's `exp` claim is in the past.
    #[error("token expired")]
    Expired,
    /// Signature verification failed.
    #[error("invalid token")]
    Invalid,
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Self::unauthorized(value.to_string())
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use campus_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Campus.edu", "hunter22").expect("valid");
/// assert_eq!(creds.email().as_ref(), "ada@campus.edu");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Registration field failures, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("year must be between 1 and 4")]
    YearOutOfRange,
    #[error("semester must be between 1 and 8")]
    SemesterOutOfRange,
}

impl RegistrationValidationError {
    /// Wire name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "email",
            Self::PasswordTooShort { .. } => "password",
            Self::MissingField { field } => *field,
            Self::YearOutOfRange => "year",
            Self::SemesterOutOfRange => "semester",
        }
    }
}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(_: UserValidationError) -> Self {
        Self::InvalidEmail
    }
}

/// Raw registration payload as received from an adapter.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub register_number: String,
    pub department: String,
    pub year: i32,
    pub semester: i32,
    pub section: Option<String>,
    pub phone: Option<String>,
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub password: Zeroizing<String>,
    pub full_name: String,
    pub register_number: String,
    pub department: String,
    pub year: i32,
    pub semester: i32,
    pub section: Option<String>,
    pub phone: Option<String>,
}

fn required(value: String, field: &'static str) -> Result<String, RegistrationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistrationValidationError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

impl TryFrom<RegistrationInput> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(input: RegistrationInput) -> Result<Self, Self::Error> {
        let RegistrationInput {
            email,
            password,
            full_name,
            register_number,
            department,
            year,
            semester,
            section,
            phone,
        } = input;
        let password = Zeroizing::new(password);

        let email = Email::new(email)?;
        if password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(RegistrationValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }
        let full_name = required(full_name, "fullName")?;
        let register_number = required(register_number, "registerNumber")?;
        let department = required(department, "department")?;
        if !(1..=4).contains(&year) {
            return Err(RegistrationValidationError::YearOutOfRange);
        }
        if !(1..=8).contains(&semester) {
            return Err(RegistrationValidationError::SemesterOutOfRange);
        }

        Ok(Self {
            email,
            password,
            full_name,
            register_number,
            department,
            year,
            semester,
            section: optional(section),
            phone: optional(phone),
        })
    }
}
