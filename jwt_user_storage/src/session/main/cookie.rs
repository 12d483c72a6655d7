use chrono::{DateTime, Utc};
use headers::HeaderMapExt;
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};

use crate::session::errors::SessionError;
use crate::session::types::{CookieExpiry, CookieOptions};

const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Read access to the cookies of the current request
pub trait RequestCookies {
    fn cookie(&self, name: &str) -> Option<String>;
}

/// Write access to the cookies of the current response
pub trait ResponseCookies {
    fn set_cookie(
        &mut self,
        options: &CookieOptions,
        value: &str,
        expiry: CookieExpiry,
    ) -> Result<(), SessionError>;

    fn delete_cookie(&mut self, options: &CookieOptions) -> Result<(), SessionError>;
}

impl RequestCookies for HeaderMap {
    fn cookie(&self, name: &str) -> Option<String> {
        self.typed_get::<headers::Cookie>()?
            .get(name)
            .map(str::to_string)
    }
}

impl RequestCookies for headers::Cookie {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

impl<C: RequestCookies> RequestCookies for Option<C> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.as_ref()?.cookie(name)
    }
}

/// Only the last `Set-Cookie` for the session cookie survives, so a store
/// that saves several times per request emits a single header.
impl ResponseCookies for HeaderMap {
    fn set_cookie(
        &mut self,
        options: &CookieOptions,
        value: &str,
        expiry: CookieExpiry,
    ) -> Result<(), SessionError> {
        let cookie = render_set_cookie(options, value, expiry, Utc::now());
        replace_set_cookie(self, &options.name, &cookie)
    }

    fn delete_cookie(&mut self, options: &CookieOptions) -> Result<(), SessionError> {
        let cookie = render_delete_cookie(options);
        replace_set_cookie(self, &options.name, &cookie)
    }
}

impl<C: ResponseCookies + ?Sized> ResponseCookies for &mut C {
    fn set_cookie(
        &mut self,
        options: &CookieOptions,
        value: &str,
        expiry: CookieExpiry,
    ) -> Result<(), SessionError> {
        (**self).set_cookie(options, value, expiry)
    }

    fn delete_cookie(&mut self, options: &CookieOptions) -> Result<(), SessionError> {
        (**self).delete_cookie(options)
    }
}

fn replace_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    cookie: &str,
) -> Result<(), SessionError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| SessionError::Cookie("Failed to parse cookie".to_string()))?;

    let prefix = format!("{name}=");
    let kept: Vec<HeaderValue> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter(|existing| !existing.as_bytes().starts_with(prefix.as_bytes()))
        .cloned()
        .collect();

    headers.remove(SET_COOKIE);
    for existing in kept {
        headers.append(SET_COOKIE, existing);
    }
    headers.append(SET_COOKIE, value);

    Ok(())
}

pub(crate) fn render_set_cookie(
    options: &CookieOptions,
    value: &str,
    expiry: CookieExpiry,
    now: DateTime<Utc>,
) -> String {
    let mut cookie = format!("{}={value}", options.name);
    push_scope(&mut cookie, options);

    if let CookieExpiry::At(at) = expiry {
        let max_age = (at - now).num_seconds().max(0);
        cookie.push_str(&format!("; Expires={}; Max-Age={max_age}", http_date(at)));
    }

    push_flags(&mut cookie, options);
    cookie
}

pub(crate) fn render_delete_cookie(options: &CookieOptions) -> String {
    let mut cookie = format!("{}=", options.name);
    push_scope(&mut cookie, options);
    cookie.push_str(&format!("; Expires={EPOCH_HTTP_DATE}; Max-Age=0"));
    push_flags(&mut cookie, options);
    cookie
}

fn push_scope(cookie: &mut String, options: &CookieOptions) {
    if let Some(path) = &options.path {
        cookie.push_str(&format!("; Path={path}"));
    }
    if let Some(domain) = &options.domain {
        cookie.push_str(&format!("; Domain={domain}"));
    }
}

fn push_flags(cookie: &mut String, options: &CookieOptions) {
    if options.secure {
        cookie.push_str("; Secure");
    }
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if let Some(same_site) = options.same_site {
        cookie.push_str(&format!("; SameSite={}", same_site.as_str()));
    }
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
