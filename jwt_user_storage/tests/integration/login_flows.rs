use std::thread;
use std::time::Duration as StdDuration;

use http::HeaderMap;
use jwt_user_storage::{JwtUserStorage, LogoutReason, SessionError, TokenError};

use crate::common::{MockBrowser, TestUsers, session_token, test_config};

/// Test a complete login, authenticated visit and logout sequence
#[test]
fn test_login_visit_logout() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    // Given a user logging in
    browser.request(&config, |storage| {
        storage.set_identity(Some(&TestUsers::admin())).unwrap();
        storage.set_authenticated(true).unwrap();
    });
    assert!(browser.cookie(&config.cookie().name).is_some());

    // When the next request arrives
    let (authenticated, identity) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.get_identity().unwrap(),
        )
    });

    // Then the session should be restored from the cookie
    assert!(authenticated);
    assert_eq!(identity, Some(TestUsers::admin()));

    // When logging out
    let reason = browser.request(&config, |storage| {
        storage.set_authenticated(false).unwrap();
        storage.get_logout_reason().unwrap()
    });
    assert_eq!(reason, Some(LogoutReason::Manual));

    // Then later requests are anonymous but still know who the user was
    let (authenticated, identity) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.get_identity().unwrap(),
        )
    });
    assert!(!authenticated);
    assert_eq!(identity, Some(TestUsers::admin()));
}

/// Test that a first visit without cookies is anonymous and writes nothing
#[test]
fn test_anonymous_visit() {
    let config = test_config();
    let request = HeaderMap::new();
    let mut storage = JwtUserStorage::new(config, &request, HeaderMap::new());

    assert!(!storage.is_authenticated().unwrap());
    assert_eq!(storage.get_identity().unwrap(), None);
    assert_eq!(
        storage.get_logout_reason().unwrap(),
        Some(LogoutReason::InactivityOrBrowserClosed)
    );
    assert!(storage.into_response().is_empty());
}

/// Test that clearing the identity logs the user out on later requests
#[test]
fn test_clear_identity() {
    let config = test_config();
    let mut browser = MockBrowser::new();
    browser.request(&config, |storage| {
        storage.set_identity(Some(&TestUsers::editor())).unwrap();
        storage.set_authenticated(true).unwrap();
    });

    browser.request(&config, |storage| storage.set_identity(None).unwrap());

    let (authenticated, identity, reason) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.get_identity().unwrap(),
            storage.get_logout_reason().unwrap(),
        )
    });
    assert!(!authenticated);
    assert_eq!(identity, None);
    assert_eq!(reason, None);
}

/// Test that an identity set on an already authenticated session keeps it
/// authenticated
#[test]
fn test_identity_after_authentication() {
    let config = test_config();
    let mut browser = MockBrowser::new();
    browser.request(&config, |storage| storage.set_authenticated(true).unwrap());

    browser.request(&config, |storage| {
        storage.set_identity(Some(&TestUsers::editor())).unwrap()
    });

    let (authenticated, identity) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.get_identity().unwrap(),
        )
    });
    assert!(authenticated);
    assert_eq!(identity, Some(TestUsers::editor()));
}

/// Test that switching users replaces the identity fields
#[test]
fn test_switch_identity() {
    let config = test_config();
    let mut browser = MockBrowser::new();
    browser.request(&config, |storage| {
        storage.set_identity(Some(&TestUsers::admin())).unwrap();
        storage.set_authenticated(true).unwrap();
    });

    browser.request(&config, |storage| {
        storage.set_identity(Some(&TestUsers::editor())).unwrap()
    });

    let identity = browser.request(&config, |storage| storage.get_identity().unwrap());
    assert_eq!(identity, Some(TestUsers::editor()));
}

/// Test that a tampered cookie is reported and can be replaced by a login
#[test]
fn test_tampered_cookie() {
    let config = test_config();
    let mut browser = MockBrowser::new();
    browser.request(&config, |storage| storage.set_authenticated(false).unwrap());

    // Given a cookie whose signature no longer matches
    let name = config.cookie().name.clone();
    let token = browser.cookie(&name).unwrap().to_string();
    let (head, _) = token.rsplit_once('.').unwrap();
    browser.set_raw_cookie(&name, &format!("{head}.AAAA"));

    // Then reads fail with the token error
    let result = browser.request(&config, |storage| storage.is_authenticated());
    assert!(matches!(
        result,
        Err(SessionError::Token(TokenError::InvalidSignature))
    ));

    // And a login issues a fresh valid cookie
    browser.request(&config, |storage| storage.set_authenticated(true).unwrap());
    let authenticated = browser.request(&config, |storage| storage.is_authenticated().unwrap());
    assert!(authenticated);
}

/// Test that two identical saves produce different token ids
#[test]
fn test_jti_differs_between_saves() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    let first = browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage.claims().unwrap().jti().map(str::to_string)
    });
    let second = browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage.claims().unwrap().jti().map(str::to_string)
    });

    assert!(first.is_some());
    assert_ne!(first, second);
}

/// Test that iat is refreshed on every save
#[test]
fn test_iat_advances() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    let first = browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage.claims().unwrap().issued_at()
    });

    thread::sleep(StdDuration::from_millis(1100));

    let second = browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage.claims().unwrap().issued_at()
    });

    assert!(second.unwrap() > first.unwrap());
}

/// Test that only one Set-Cookie is sent even after several writes
#[test]
fn test_single_set_cookie_per_response() {
    let config = test_config();
    let request = HeaderMap::new();
    let mut storage = JwtUserStorage::new(config.clone(), &request, HeaderMap::new());

    storage.set_identity(Some(&TestUsers::admin())).unwrap();
    storage.set_authenticated(true).unwrap();
    let response = storage.into_response();

    assert_eq!(response.get_all(http::header::SET_COOKIE).iter().count(), 1);
    assert!(session_token(&config, &response).is_some());
}
