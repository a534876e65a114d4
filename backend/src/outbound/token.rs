//! HMAC-signed JWT implementation of the token authority port.
//!
//! Tokens carry `sub` (the user id), `iat` and `exp`. Any HMAC variant
//! (HS256/384/512) is accepted on validation; every other algorithm is
//! refused before signature checks run. Expiry is judged against the
//! injected clock rather than the system time so tests can freeze it.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::TokenAuthority;
use crate::domain::{AuthError, Error, TOKEN_TTL_DAYS, UserId};

const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs tokens with a shared secret and validates them on the way back in.
#[derive(Clone)]
pub struct JwtTokenAuthority {
    secret: Zeroizing<Vec<u8>>,
    clock: Arc<dyn Clock>,
}

impl JwtTokenAuthority {
    pub fn new(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_ref().to_vec()),
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature => AuthError::Invalid,
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidAlgorithm => AuthError::Malformed,
        _ => AuthError::Invalid,
    }
}

impl TokenAuthority for JwtTokenAuthority {
    fn issue_token(&self, user_id: &UserId) -> Result<String, Error> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| Error::internal(format!("failed to sign token: {err}")))
    }

    fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| AuthError::Malformed)?;
        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            debug!(alg = ?header.alg, "refusing token signed with non-HMAC algorithm");
            return Err(AuthError::Malformed);
        }

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Self::validation(),
        )
        .map_err(|err| {
            debug!(error = %err, "token rejected");
            classify(err.kind())
        })?;

        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(AuthError::Expired);
        }
        UserId::new(&data.claims.sub).map_err(|_| AuthError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixtureClock, fixture_timestamp};
    use rstest::{fixture, rstest};

    const SECRET: &str = "test-signing-secret";
    const RS256_HEADER: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
    const NONE_HEADER: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";

    fn authority_at(offset: Duration) -> JwtTokenAuthority {
        JwtTokenAuthority::new(
            SECRET,
            Arc::new(FixtureClock::at(fixture_timestamp() + offset)),
        )
    }

    #[fixture]
    fn authority() -> JwtTokenAuthority {
        authority_at(Duration::zero())
    }

    fn sign(alg: Algorithm, secret: &str, sub: &str, exp_offset: Duration) -> String {
        let now = fixture_timestamp();
        let claims = Claims {
            sub: sub.to_owned(),
            iat: now.timestamp(),
            exp: (now + exp_offset).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign fixture token")
    }

    #[rstest]
    fn issued_tokens_validate_to_their_subject(authority: JwtTokenAuthority) {
        let user = UserId::random();
        let token = authority.issue_token(&user).expect("issue");
        assert_eq!(authority.validate_token(&token), Ok(user));
    }

    #[rstest]
    fn issued_tokens_expire_after_seven_days(authority: JwtTokenAuthority) {
        let user = UserId::random();
        let token = authority.issue_token(&user).expect("issue");

        let almost = authority_at(Duration::days(TOKEN_TTL_DAYS) - Duration::seconds(1));
        assert_eq!(almost.validate_token(&token), Ok(user));

        let later = authority_at(Duration::days(TOKEN_TTL_DAYS));
        assert_eq!(later.validate_token(&token), Err(AuthError::Expired));
    }

    #[rstest]
    #[case::hs384(Algorithm::HS384)]
    #[case::hs512(Algorithm::HS512)]
    fn other_hmac_variants_are_accepted(authority: JwtTokenAuthority, #[case] alg: Algorithm) {
        let user = UserId::random();
        let token = sign(alg, SECRET, &user.to_string(), Duration::hours(1));
        assert_eq!(authority.validate_token(&token), Ok(user));
    }

    #[rstest]
    fn wrong_secret_is_invalid(authority: JwtTokenAuthority) {
        let token = sign(
            Algorithm::HS256,
            "someone-elses-secret",
            &UserId::random().to_string(),
            Duration::hours(1),
        );
        assert_eq!(authority.validate_token(&token), Err(AuthError::Invalid));
    }

    #[rstest]
    fn tampered_payload_is_invalid(authority: JwtTokenAuthority) {
        let token = authority.issue_token(&UserId::random()).expect("issue");
        let other = authority.issue_token(&UserId::random()).expect("issue");
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert_eq!(authority.validate_token(&spliced), Err(AuthError::Invalid));
    }

    #[rstest]
    #[case::garbage("not-a-token".to_owned())]
    #[case::empty(String::new())]
    #[case::rsa_header(format!("{RS256_HEADER}.e30.c2ln"))]
    #[case::none_algorithm(format!("{NONE_HEADER}.e30."))]
    fn unusable_tokens_are_malformed(authority: JwtTokenAuthority, #[case] token: String) {
        assert_eq!(authority.validate_token(&token), Err(AuthError::Malformed));
    }

    #[rstest]
    fn non_uuid_subject_is_malformed(authority: JwtTokenAuthority) {
        let token = sign(Algorithm::HS256, SECRET, "ada", Duration::hours(1));
        assert_eq!(authority.validate_token(&token), Err(AuthError::Malformed));
    }

    #[rstest]
    fn already_expired_token_is_expired(authority: JwtTokenAuthority) {
        let token = sign(
            Algorithm::HS256,
            SECRET,
            &UserId::random().to_string(),
            Duration::seconds(-1),
        );
        assert_eq!(authority.validate_token(&token), Err(AuthError::Expired));
    }
}
