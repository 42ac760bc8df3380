//! Cache TTL derivation from response headers
//!
//! Order of precedence:
//!
//! 1. `Cache-Control`: `private`, `no-cache` or `no-store` forbid caching;
//!    otherwise `max-age` (seconds) is the TTL, and a header without
//!    `max-age` falls through to the default.
//! 2. `Expires`: TTL is the time left until the expiry date.
//! 3. Neither header: the default TTL (one hour).
//!
//! A TTL of zero (`max-age=0`, or an `Expires` date already past) also means
//! "do not cache". Every TTL is capped at [`MAX_TTL`].

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, CACHE_CONTROL, EXPIRES};
use std::time::Duration;

/// TTL applied when the response carries no usable cache directives
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Longest TTL ever applied, whatever the server asks for
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Parsed `Cache-Control` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    pub private: bool,
    pub no_cache: bool,
    pub no_store: bool,
    pub max_age: Option<u64>,
}

impl CacheControl {
    /// Parses a `Cache-Control` header value
    ///
    /// Unknown directives are ignored and directive names are case-insensitive.
    /// Returns `None` for a header with no directives at all.
    pub fn parse(value: &str) -> Option<Self> {
        let mut control = CacheControl::default();
        let mut seen = false;

        for directive in value.split(',') {
            let directive = directive.trim();
            if directive.is_empty() {
                continue;
            }
            seen = true;

            let (name, argument) = match directive.split_once('=') {
                Some((name, argument)) => (name.trim(), Some(argument.trim().trim_matches('"'))),
                None => (directive, None),
            };

            match name.to_ascii_lowercase().as_str() {
                "private" => control.private = true,
                "no-cache" => control.no_cache = true,
                "no-store" => control.no_store = true,
                "max-age" => control.max_age = argument.and_then(|a| a.parse().ok()),
                _ => {}
            }
        }

        seen.then_some(control)
    }

    /// True when the directives forbid storing the response
    pub fn forbids_caching(&self) -> bool {
        self.private || self.no_cache || self.no_store
    }
}

/// Decides how long a response may be cached
///
/// # Returns
///
/// * `Some(ttl)` - cache the body for `ttl`
/// * `None` - do not cache
pub fn cache_ttl(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let control = headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(CacheControl::parse);

    let ttl = if let Some(control) = control {
        if control.forbids_caching() {
            return None;
        }
        control
            .max_age
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL)
    } else if let Some(expires) = headers.get(EXPIRES).and_then(|v| v.to_str().ok()) {
        // An unparseable date is treated as already expired
        let expires_at = DateTime::parse_from_rfc2822(expires).ok()?;
        (expires_at.with_timezone(&Utc) - now).to_std().ok()?
    } else {
        DEFAULT_TTL
    };

    (!ttl.is_zero()).then_some(ttl.min(MAX_TTL))
}
