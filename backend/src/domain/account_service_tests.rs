//! Tests for the account service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{FixtureTokenAuthority, MockCredentialHasher, MockUserRepository};
use crate::domain::{Email, ErrorCode, PasswordDigest, RegistrationInput};
use crate::test_support::{PlainTextHasher, fixed_clock, sample_user};

fn service(repo: MockUserRepository) -> AccountService<MockUserRepository> {
    AccountService::new(
        Arc::new(repo),
        Arc::new(PlainTextHasher),
        Arc::new(FixtureTokenAuthority::default()),
        fixed_clock(),
    )
}

#[fixture]
fn registration() -> Registration {
    Registration::try_from(RegistrationInput {
        email: "ada@campus.edu".to_owned(),
        password: "correct horse".to_owned(),
        full_name: "Ada Lovelace".to_owned(),
        register_number: "21CS001".to_owned(),
        department: "CSE".to_owned(),
        year: 2,
        semester: 3,
        section: Some("A".to_owned()),
        phone: None,
    })
    .expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn register_stores_user_with_defaults_and_issues_token(registration: Registration) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_create()
        .withf(|user| user.email().as_ref() == "ada@campus.edu")
        .times(1)
        .return_once(|_| Ok(()));

    let session = service(repo)
        .register(registration)
        .await
        .expect("registration succeeds");

    assert_eq!(session.token, FixtureTokenAuthority::TOKEN);
    let profile = session.user.profile();
    assert_eq!(profile.theme, DEFAULT_THEME);
    assert_eq!(profile.timezone, DEFAULT_TIMEZONE);
    assert_eq!(profile.notification_prefs, NotificationPreferences::default());
    assert!(session.user.is_active());
    assert!(!session.user.is_verified());
    assert_eq!(session.user.password_digest().as_str(), "plain:correct horse");
}

#[rstest]
#[tokio::test]
async fn register_rejects_existing_email(registration: Registration) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(sample_user("ada@campus.edu", "whatever"))));
    repo.expect_create().never();

    let error = service(repo)
        .register(registration)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "user with this email already exists");
}

#[rstest]
#[tokio::test]
async fn register_maps_insert_race_to_conflict(registration: Registration) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_email()));

    let error = service(repo)
        .register(registration)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn register_surfaces_hashing_failure_as_internal(registration: Registration) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Err(CredentialHashError::hash("out of memory")));
    let service = AccountService::new(
        Arc::new(repo),
        Arc::new(hasher),
        Arc::new(FixtureTokenAuthority::default()),
        fixed_clock(),
    );

    let error = service
        .register(registration)
        .await
        .expect_err("hash failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[case::right_password("ada@campus.edu", "secret-pass", true)]
#[case::wrong_password("ada@campus.edu", "guess", false)]
#[case::unknown_email("nobody@campus.edu", "secret-pass", false)]
#[tokio::test]
async fn login_only_accepts_matching_credentials(
    #[case] email: &str,
    #[case] password: &str,
    #[case] should_succeed: bool,
) {
    let stored = sample_user("ada@campus.edu", "secret-pass");
    let stored_id = *stored.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .returning(move |lookup: &Email| {
            Ok((lookup.as_ref() == "ada@campus.edu").then(|| stored.clone()))
        });

    let credentials = LoginCredentials::try_from_parts(email, password).expect("credentials");
    match (should_succeed, service(repo).login(&credentials).await) {
        (true, Ok(session)) => assert_eq!(session.user.id(), &stored_id),
        (false, Err(err)) => {
            assert_eq!(err.code(), ErrorCode::Unauthorized);
            assert_eq!(err.message(), "invalid credentials");
        }
        (true, Err(err)) => panic!("expected success, got {err:?}"),
        (false, Ok(session)) => panic!("expected failure, got {:?}", session.user.id()),
    }
}

#[rstest]
#[tokio::test]
async fn login_refuses_inactive_accounts() {
    let mut draft = crate::test_support::sample_user_draft("ada@campus.edu", "secret-pass");
    draft.is_active = false;
    let inactive = User::from(draft);
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(inactive)));

    let credentials =
        LoginCredentials::try_from_parts("ada@campus.edu", "secret-pass").expect("credentials");
    let error = service(repo)
        .login(&credentials)
        .await
        .expect_err("inactive");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

fn inactive_user() -> User {
    let mut draft = crate::test_support::sample_user_draft("ada@campus.edu", "secret-pass");
    draft.is_active = false;
    User::from(draft)
}

#[rstest]
#[case::unknown_email(None)]
#[case::inactive_account(Some(inactive_user()))]
#[tokio::test]
async fn refused_logins_still_check_a_password(#[case] stored: Option<User>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(stored));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_verify()
        .withf(|password, digest| password == "secret-pass" && digest.as_str() == DECOY_DIGEST)
        .times(1)
        .return_once(|_, _| Ok(false));
    let service = AccountService::new(
        Arc::new(repo),
        Arc::new(hasher),
        Arc::new(FixtureTokenAuthority::default()),
        fixed_clock(),
    );

    let credentials =
        LoginCredentials::try_from_parts("ada@campus.edu", "secret-pass").expect("credentials");
    let error = service.login(&credentials).await.expect_err("refused");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[rstest]
#[tokio::test]
async fn decoy_check_failures_stay_unauthorised() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().times(1).return_once(|_| Ok(None));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| Err(CredentialHashError::malformed_digest("unsupported")));
    let service = AccountService::new(
        Arc::new(repo),
        Arc::new(hasher),
        Arc::new(FixtureTokenAuthority::default()),
        fixed_clock(),
    );

    let credentials =
        LoginCredentials::try_from_parts("nobody@campus.edu", "secret-pass").expect("credentials");
    let error = service.login(&credentials).await.expect_err("refused");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn login_treats_unreadable_digest_as_internal() {
    let mut draft = crate::test_support::sample_user_draft("ada@campus.edu", "secret-pass");
    draft.password_digest = PasswordDigest::new("not-a-digest");
    let user = User::from(draft);
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(user)));

    let credentials =
        LoginCredentials::try_from_parts("ada@campus.edu", "secret-pass").expect("credentials");
    let error = service(repo)
        .login(&credentials)
        .await
        .expect_err("malformed digest");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("boom"), ErrorCode::InternalError)]
#[tokio::test]
async fn profile_maps_repository_failures(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Err(failure));

    let error = service(repo)
        .fetch_profile(&UserId::random())
        .await
        .expect_err("failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn profile_of_missing_user_is_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let error = service(repo)
        .fetch_profile(&UserId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
