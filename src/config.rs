use crate::cookie::SameSite;

use serde::Deserialize;

use std::fmt;

/// Request handling options shared by every request of an [`App`](crate::App).
///
/// `Config` deserializes from any serde format; missing fields take
/// their default values.
///
/// ```
/// use portico::Config;
///
/// let config = Config::new()
///     .cookie_validation_key("a-long-random-secret")
///     .csrf_param("_token")
///     .enable_csrf_cookie(false);
///
/// assert_eq!(config.csrf_param, "_token");
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Secret used to authenticate cookies. Required when
    /// `enable_cookie_validation` is set.
    pub cookie_validation_key: String,
    pub enable_cookie_validation: bool,
    pub enable_csrf_validation: bool,
    /// Persist CSRF tokens in a cookie rather than the session.
    pub enable_csrf_cookie: bool,
    /// Name of the body parameter and cookie/session key holding the CSRF token.
    pub csrf_param: String,
    /// Name of the header that may carry the CSRF token.
    pub csrf_header: String,
    /// Name of the form field that overrides the request method.
    pub method_param: String,
    /// Returned by [`Request::preferred_language`](crate::Request::preferred_language)
    /// when no candidates are given.
    pub default_language: String,
    pub csrf_cookie: CsrfCookie,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cookie_validation_key(mut self, key: impl Into<String>) -> Self {
        self.cookie_validation_key = key.into();
        self
    }

    pub fn enable_cookie_validation(mut self, enable: bool) -> Self {
        self.enable_cookie_validation = enable;
        self
    }

    pub fn enable_csrf_validation(mut self, enable: bool) -> Self {
        self.enable_csrf_validation = enable;
        self
    }

    pub fn enable_csrf_cookie(mut self, enable: bool) -> Self {
        self.enable_csrf_cookie = enable;
        self
    }

    pub fn csrf_param(mut self, name: impl Into<String>) -> Self {
        self.csrf_param = name.into();
        self
    }

    pub fn csrf_header(mut self, name: impl Into<String>) -> Self {
        self.csrf_header = name.into();
        self
    }

    pub fn method_param(mut self, name: impl Into<String>) -> Self {
        self.method_param = name.into();
        self
    }

    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn csrf_cookie(mut self, options: CsrfCookie) -> Self {
        self.csrf_cookie = options;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cookie_validation_key: String::new(),
            enable_cookie_validation: true,
            enable_csrf_validation: true,
            enable_csrf_cookie: true,
            csrf_param: String::from("_csrf"),
            csrf_header: String::from("X-CSRF-Token"),
            method_param: String::from("_method"),
            default_language: String::from("en-US"),
            csrf_cookie: CsrfCookie::default(),
        }
    }
}

// the validation key never appears in logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cookie_validation_key", &"[REDACTED]")
            .field("enable_cookie_validation", &self.enable_cookie_validation)
            .field("enable_csrf_validation", &self.enable_csrf_validation)
            .field("enable_csrf_cookie", &self.enable_csrf_cookie)
            .field("csrf_param", &self.csrf_param)
            .field("csrf_header", &self.csrf_header)
            .field("method_param", &self.method_param)
            .field("default_language", &self.default_language)
            .field("csrf_cookie", &self.csrf_cookie)
            .finish()
    }
}

/// Attributes of the cookie that carries a freshly generated CSRF token.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CsrfCookie {
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CsrfCookie {
    fn default() -> Self {
        Self {
            path: String::from("/"),
            domain: None,
            secure: false,
            http_only: true,
            same_site: None,
        }
    }
}
