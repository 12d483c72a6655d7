use chrono::{Duration, Utc};
use http::HeaderMap;
use http::header::{COOKIE, HeaderValue};
use jwt_user_storage::{ExpirationFlags, ExpirationTime, JwtUserStorage, LogoutReason};

use crate::common::{MockBrowser, TestUsers, session_token, test_config};

/// Test that a token given a past expiration reports inactivity
#[test]
fn test_past_expiration_reports_inactivity() {
    let config = test_config();

    // Given a session whose expiration is set an hour in the past
    let mut storage = JwtUserStorage::new(config.clone(), &HeaderMap::new(), HeaderMap::new());
    storage.set_identity(Some(&TestUsers::admin())).unwrap();
    storage.set_authenticated(true).unwrap();
    storage
        .set_expiration(
            Some(ExpirationTime::After(Duration::hours(-1))),
            ExpirationFlags::NONE,
        )
        .unwrap();
    let token = session_token(&config, &storage.into_response()).unwrap();

    // When the token comes back on the next request
    let mut request = HeaderMap::new();
    request.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{}={token}", config.cookie().name)).unwrap(),
    );
    let mut storage = JwtUserStorage::new(config, &request, HeaderMap::new());

    // Then the session is gone because of inactivity
    assert!(!storage.is_authenticated().unwrap());
    assert_eq!(storage.get_identity().unwrap(), None);
    assert_eq!(
        storage.get_logout_reason().unwrap(),
        Some(LogoutReason::Inactivity)
    );
}

/// Test that the browser drops a past-dated cookie right away
#[test]
fn test_past_expiration_removes_cookie() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage
            .set_expiration(
                Some(ExpirationTime::After(Duration::minutes(-5))),
                ExpirationFlags::NONE,
            )
            .unwrap();
    });

    assert_eq!(browser.cookie(&config.cookie().name), None);
    let reason = browser.request(&config, |storage| storage.get_logout_reason().unwrap());
    assert_eq!(reason, Some(LogoutReason::InactivityOrBrowserClosed));
}

/// Test a browser-session cookie lost when the browser closes
#[test]
fn test_browser_closed() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage
            .set_expiration(
                Some(ExpirationTime::After(Duration::minutes(30))),
                ExpirationFlags::BROWSER_CLOSED,
            )
            .unwrap();
    });
    assert_eq!(browser.is_persistent(&config.cookie().name), Some(false));

    // Still logged in while the browser stays open
    assert!(browser.request(&config, |storage| storage.is_authenticated().unwrap()));

    browser.close();

    let (authenticated, reason) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.get_logout_reason().unwrap(),
        )
    });
    assert!(!authenticated);
    assert_eq!(reason, Some(LogoutReason::InactivityOrBrowserClosed));
}

/// Test that the default policy issues a persistent cookie
#[test]
fn test_default_expiration_survives_browser_close() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    browser.request(&config, |storage| storage.set_authenticated(true).unwrap());
    browser.close();

    let (authenticated, exp) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.claims().unwrap().expiration(),
        )
    });
    assert!(authenticated);
    let expected = (Utc::now() + Duration::days(20)).timestamp();
    assert!((expected - exp.unwrap()).abs() <= 5);
}

/// Test a fixed point in time as expiration
#[test]
fn test_absolute_expiration() {
    let config = test_config();
    let mut browser = MockBrowser::new();
    let at = Utc::now() + Duration::hours(6);

    browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage
            .set_expiration(Some(ExpirationTime::At(at)), ExpirationFlags::NONE)
            .unwrap();
    });

    let exp = browser.request(&config, |storage| storage.claims().unwrap().expiration());
    assert_eq!(exp, Some(at.timestamp()));
}

/// Test that disabling expiration removes exp from later tokens
#[test]
fn test_expiration_disabled() {
    let config = test_config();
    let mut browser = MockBrowser::new();

    browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage.set_expiration(None, ExpirationFlags::NONE).unwrap();
    });

    assert_eq!(browser.is_persistent(&config.cookie().name), Some(false));
    let (authenticated, exp) = browser.request(&config, |storage| {
        (
            storage.is_authenticated().unwrap(),
            storage.claims().unwrap().expiration(),
        )
    });
    assert!(authenticated);
    assert_eq!(exp, None);
}

/// Test that an expiration parsed from configuration text applies
#[test]
fn test_parsed_expiration() {
    let config = test_config();
    let mut browser = MockBrowser::new();
    let time: ExpirationTime = "+30 minutes".parse().unwrap();

    let exp = browser.request(&config, |storage| {
        storage.set_authenticated(true).unwrap();
        storage.set_expiration(Some(time), ExpirationFlags::NONE).unwrap();
        storage.claims().unwrap().expiration()
    });

    let expected = (Utc::now() + Duration::minutes(30)).timestamp();
    assert!((expected - exp.unwrap()).abs() <= 5);
}
