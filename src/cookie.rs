//! Authenticated request cookies.

use crate::config::Config;
use crate::error::{BoxError, Error};
use crate::http::Params;
use crate::security::Security;

use serde::Deserialize;
use tracing::debug;

use std::time::SystemTime;

/// A cookie.
///
/// Request cookies only exist once their value was authenticated
/// (unless cookie validation is disabled). The remaining attributes
/// are used when a cookie is handed to a [`CookieSink`](crate::csrf::CookieSink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expire: Option<SystemTime>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a session cookie with no extra attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expire: None,
            path: None,
            domain: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A read-only collection of request cookies.
#[derive(Debug, Default)]
pub struct Cookies {
    cookies: Params<Cookie>,
}

impl Cookies {
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// Returns the value of the named cookie.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|cookie| cookie.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter().map(|(_, cookie)| cookie)
    }
}

/// Produce the authenticated wire value of a cookie, the value
/// [`Request::cookies`](crate::Request::cookies) accepts.
pub fn sign_cookie(
    security: &dyn Security,
    key: &str,
    name: &str,
    value: &str,
) -> Result<String, BoxError> {
    let payload = serde_json::json!([name, value]).to_string();
    security.hash_data(&payload, key)
}

/// Turn raw client cookies into [`Cookies`].
///
/// With validation enabled, a cookie whose signature does not verify, whose
/// payload is malformed, or whose payload names a different cookie is
/// dropped without an error.
pub(crate) fn load(
    raw: &Params,
    config: &Config,
    security: &dyn Security,
) -> Result<Cookies, Error> {
    if !config.enable_cookie_validation {
        let cookies = raw
            .iter()
            .map(|(name, value)| (name.to_owned(), Cookie::new(name, value.as_str())))
            .collect();

        return Ok(Cookies { cookies });
    }

    if config.cookie_validation_key.is_empty() {
        return Err(Error::config(
            "cookie_validation_key must be configured with a secret key",
        ));
    }

    let mut cookies = Params::new();

    for (name, value) in raw.iter() {
        match authenticate(name, value, &config.cookie_validation_key, security) {
            Some(cookie) => {
                cookies.insert(name, cookie);
            }
            None => debug!(cookie = name, "dropping unauthenticated cookie"),
        }
    }

    Ok(Cookies { cookies })
}

fn authenticate(name: &str, value: &str, key: &str, security: &dyn Security) -> Option<Cookie> {
    let payload = security.validate_data(value, key)?;
    let (owner, value) = serde_json::from_str::<(String, String)>(&payload).ok()?;

    if owner != name {
        return None;
    }

    Some(Cookie::new(owner, value))
}
