//! Cross-site request forgery protection.
//!
//! Every request carries a raw CSRF token that is kept server-side, in a
//! cookie or in the session. Clients only ever see masked copies of the
//! token: each masking uses fresh randomness, so the token never repeats
//! verbatim in a response body, and any masked copy validates against the
//! raw token.

use crate::cookie::Cookie;
use crate::error::Error;
use crate::request::{is_safe, Request};

use serde_json::Value;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Per-client session storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);
}

/// The cookies that will be sent with the response.
pub trait CookieSink: Send + Sync {
    fn add(&self, cookie: Cookie);
}

impl Request {
    /// Returns a masked CSRF token for embedding in forms or meta tags.
    ///
    /// The token is loaded from the CSRF cookie or the session. If there is
    /// none, or `regenerate` is set, a new token is generated and stored
    /// right away: added to the response cookies in cookie mode, written to
    /// the session otherwise. The masked token is cached for this request.
    pub fn csrf_token(&mut self, regenerate: bool) -> Result<&str, Error> {
        if regenerate {
            self.csrf_token.take();
        }

        self.masked_csrf_token(regenerate)
    }

    /// The CSRF token sent in the configured header, if any.
    pub fn csrf_token_from_header(&self) -> Option<&str> {
        self.header(self.app.config().csrf_header.as_str())
    }

    /// Check the CSRF token of the request.
    ///
    /// Safe methods (GET, HEAD and OPTIONS) always pass, as does every
    /// request when CSRF validation is disabled. Otherwise `supplied` is
    /// checked if given; if not, the token is accepted from either the
    /// body parameter or the header.
    ///
    /// An invalid token yields `Ok(false)`. Errors are only returned for
    /// misconfiguration or failures loading the request body.
    pub fn validate_csrf_token(&self, supplied: Option<&str>) -> Result<bool, Error> {
        let config = self.app.config();
        let method = self.method();

        if !config.enable_csrf_validation || is_safe(&method) {
            return Ok(true);
        }

        let true_token = self.masked_csrf_token(false)?;

        let valid = match supplied {
            Some(token) => self.tokens_match(Some(token), true_token),
            None => {
                let from_body = self.body_param(&config.csrf_param)?.and_then(Value::as_str);

                self.tokens_match(from_body, true_token)
                    || self.tokens_match(self.csrf_token_from_header(), true_token)
            }
        };

        if !valid {
            debug!(%method, url = self.url(), "CSRF token validation failed");
        }

        Ok(valid)
    }

    fn masked_csrf_token(&self, regenerate: bool) -> Result<&str, Error> {
        self.csrf_token
            .get_or_try_init(|| {
                let token = match self.load_csrf_token(regenerate)? {
                    Some(token) => token,
                    None => self.generate_csrf_token()?,
                };

                self.app
                    .security_provider()
                    .mask_token(&token)
                    .map_err(Error::random)
            })
            .map(String::as_str)
    }

    fn load_csrf_token(&self, regenerate: bool) -> Result<Option<String>, Error> {
        if regenerate {
            return Ok(None);
        }

        let config = self.app.config();

        let token = if config.enable_csrf_cookie {
            self.cookies()?.value(&config.csrf_param).map(str::to_owned)
        } else {
            self.session()?.get(&config.csrf_param)
        };

        Ok(token.filter(|token| !token.is_empty()))
    }

    fn generate_csrf_token(&self) -> Result<String, Error> {
        let config = self.app.config();
        let token = self
            .app
            .security_provider()
            .random_token()
            .map_err(Error::random)?;

        if config.enable_csrf_cookie {
            let sink = self.response_cookies.as_deref().ok_or_else(|| {
                Error::config("CSRF tokens are stored in cookies but no response cookies were attached")
            })?;

            sink.add(self.create_csrf_cookie(&token));
            debug!("stored new CSRF token in a cookie");
        } else {
            self.session()?.set(&config.csrf_param, token.clone());
            debug!("stored new CSRF token in the session");
        }

        Ok(token)
    }

    fn create_csrf_cookie(&self, token: &str) -> Cookie {
        let config = self.app.config();
        let options = &config.csrf_cookie;

        Cookie {
            path: Some(options.path.clone()),
            domain: options.domain.clone(),
            secure: options.secure,
            http_only: options.http_only,
            same_site: options.same_site,
            ..Cookie::new(config.csrf_param.as_str(), token)
        }
    }

    fn session(&self) -> Result<&dyn SessionStore, Error> {
        self.session.as_deref().ok_or_else(|| {
            Error::config("CSRF tokens are stored in the session but no session was attached")
        })
    }

    fn tokens_match(&self, supplied: Option<&str>, true_token: &str) -> bool {
        let security = self.app.security_provider();

        let supplied = match supplied.and_then(|token| security.unmask_token(token)) {
            Some(token) => token,
            None => return false,
        };

        match security.unmask_token(true_token) {
            Some(token) => supplied.as_bytes().ct_eq(token.as_bytes()).into(),
            None => false,
        }
    }
}
