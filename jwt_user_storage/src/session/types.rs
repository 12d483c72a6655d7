use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::config::{ConfigError, DEFAULT_COOKIE_NAME};

/// Bare numbers up to one year are relative seconds, larger ones are
/// absolute unix timestamps.
const RELATIVE_SECONDS_LIMIT: i64 = 31_557_600;

/// Why the current request has no authenticated session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The application called `set_authenticated(false)`
    Manual,
    /// The token's `exp` had passed
    Inactivity,
    /// No session cookie arrived, so the token either expired or the browser
    /// dropped a session cookie
    InactivityOrBrowserClosed,
}

impl LogoutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogoutReason::Manual => "manual",
            LogoutReason::Inactivity => "inactivity",
            LogoutReason::InactivityOrBrowserClosed => "inactivity_or_browser_closed",
        }
    }
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifetime, either relative to the moment it is applied or fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationTime {
    After(Duration),
    At(DateTime<Utc>),
}

impl ExpirationTime {
    pub(crate) fn default_session() -> Self {
        ExpirationTime::After(Duration::days(20))
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ExpirationTime::After(duration) => {
                let bound = if *duration < Duration::zero() {
                    DateTime::<Utc>::MIN_UTC
                } else {
                    DateTime::<Utc>::MAX_UTC
                };
                now.checked_add_signed(*duration).unwrap_or(bound)
            }
            ExpirationTime::At(at) => *at,
        }
    }
}

impl From<Duration> for ExpirationTime {
    fn from(duration: Duration) -> Self {
        ExpirationTime::After(duration)
    }
}

impl From<DateTime<Utc>> for ExpirationTime {
    fn from(at: DateTime<Utc>) -> Self {
        ExpirationTime::At(at)
    }
}

/// Parses `"3600"`, `"+30 minutes"`, `"20 days"`, `"2h"` and similar.
impl FromStr for ExpirationTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            name: "expiration".to_string(),
            value: s.to_string(),
        };

        let trimmed = s.trim().trim_start_matches('+');
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let amount: i64 = number.parse().map_err(|_| invalid())?;

        let duration = match unit.trim().to_lowercase().as_str() {
            "" if amount > RELATIVE_SECONDS_LIMIT => {
                let at = DateTime::from_timestamp(amount, 0).ok_or_else(invalid)?;
                return Ok(ExpirationTime::At(at));
            }
            "" | "s" | "sec" | "secs" | "second" | "seconds" => Duration::try_seconds(amount),
            "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(amount),
            "h" | "hour" | "hours" => Duration::try_hours(amount),
            "d" | "day" | "days" => Duration::try_days(amount),
            "w" | "week" | "weeks" => Duration::try_weeks(amount),
            _ => None,
        };

        duration.map(ExpirationTime::After).ok_or_else(invalid)
    }
}

/// Modifiers for [`JwtUserStorage::set_expiration`](crate::JwtUserStorage::set_expiration)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirationFlags {
    /// Issue a session cookie that the browser drops when it closes
    pub browser_closed: bool,
}

impl ExpirationFlags {
    pub const NONE: Self = Self {
        browser_closed: false,
    };

    pub const BROWSER_CLOSED: Self = Self {
        browser_closed: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("Unknown SameSite value: {other}")),
        }
    }
}

/// Attributes of the cookie carrying the session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub name: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            http_only: true,
            same_site: Some(SameSite::Lax),
        }
    }
}

/// Lifetime given to an outbound cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieExpiry {
    /// No `Expires`, so the browser drops it on close
    Session,
    At(DateTime<Utc>),
}
