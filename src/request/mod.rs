mod negotiate;
mod params;
mod url;

use crate::app::App;
use crate::cookie::{self, Cookies};
use crate::csrf::{CookieSink, SessionStore};
use crate::error::Error;
use crate::http::{AcceptEntry, Bytes, HeaderMap, Method, Params, RawRequest};

use http::header::{self, AsHeaderName};
use once_cell::unsync::OnceCell;
use serde_json::Value;

use std::fmt;
use std::sync::Arc;

/// A normalized view over a [`RawRequest`].
///
/// Every derived value is computed on first access and cached for the
/// lifetime of the request. Setters replace a cached value, and setters
/// of values other fields are derived from clear those fields:
///
/// - [`set_url`](Self::set_url) clears the path info.
/// - [`set_host_info`](Self::set_host_info), [`set_port`](Self::set_port) and
///   [`set_secure_port`](Self::set_secure_port) clear the host info and host name.
///
/// A `Request` belongs to a single request and is not `Sync`.
pub struct Request {
    pub(crate) app: Arc<App>,
    pub(crate) raw: RawRequest,
    pub(crate) session: Option<Arc<dyn SessionStore>>,
    pub(crate) response_cookies: Option<Arc<dyn CookieSink>>,

    url: OnceCell<String>,
    path_info: OnceCell<String>,
    host_info: OnceCell<Option<String>>,
    host_name: OnceCell<Option<String>>,
    port: Option<u16>,
    secure_port: Option<u16>,
    query_params: OnceCell<Params>,
    body_params: OnceCell<Params<Value>>,
    content_types: OnceCell<Vec<AcceptEntry>>,
    languages: OnceCell<Vec<String>>,
    cookies: OnceCell<Cookies>,
    pub(crate) csrf_token: OnceCell<String>,
}

impl Request {
    pub(crate) fn new(app: Arc<App>, raw: RawRequest) -> Self {
        Self {
            app,
            raw,
            session: None,
            response_cookies: None,
            url: OnceCell::new(),
            path_info: OnceCell::new(),
            host_info: OnceCell::new(),
            host_name: OnceCell::new(),
            port: None,
            secure_port: None,
            query_params: OnceCell::new(),
            body_params: OnceCell::new(),
            content_types: OnceCell::new(),
            languages: OnceCell::new(),
            cookies: OnceCell::new(),
            csrf_token: OnceCell::new(),
        }
    }

    /// Attach the session of the current client. Required when CSRF
    /// tokens are kept in the session.
    pub fn with_session<S>(mut self, session: Arc<S>) -> Self
    where
        S: SessionStore + 'static,
    {
        self.session = Some(session);
        self
    }

    /// Attach the response cookie collection. Required when CSRF tokens
    /// are kept in a cookie.
    pub fn with_response_cookies<C>(mut self, cookies: Arc<C>) -> Self
    where
        C: CookieSink + 'static,
    {
        self.response_cookies = Some(cookies);
        self
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn raw(&self) -> &RawRequest {
        &self.raw
    }

    /// The request method.
    ///
    /// A POST request may override its method with the configured
    /// method parameter in its form data. Overriding to a safe method
    /// (GET, HEAD or OPTIONS) is ignored.
    pub fn method(&self) -> Method {
        if self.raw.method == Method::POST {
            let overridden = self
                .raw
                .form
                .get(&self.app.config().method_param)
                .and_then(|name| Method::from_bytes(name.to_ascii_uppercase().as_bytes()).ok())
                .filter(|method| !is_safe(method));

            if let Some(method) = overridden {
                return method;
            }
        }

        self.raw.method.clone()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.raw.headers
    }

    /// Returns the first value of a header, if it is valid visible ASCII.
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.raw.headers.get(name)?.to_str().ok()
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.raw.body
    }

    /// The raw `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT)
    }

    pub fn referrer(&self) -> Option<&str> {
        self.header(header::REFERER)
    }

    pub fn user_ip(&self) -> Option<&str> {
        self.raw.remote_addr.as_deref()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.raw.server_software.as_deref()
    }

    pub fn server_port(&self) -> Option<u16> {
        self.raw.server_port
    }

    /// Returns `true` for requests sent with `X-Requested-With: XMLHttpRequest`.
    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with") == Some("XMLHttpRequest")
    }

    /// Returns `true` for PJAX requests.
    ///
    /// This is currently the same check as [`is_ajax`](Self::is_ajax).
    pub fn is_pjax(&self) -> bool {
        self.is_ajax()
            && self
                .header("x-requested-with")
                .map_or(false, |value| !value.is_empty())
    }

    /// Returns `true` for requests made by an Adobe Flash plugin.
    pub fn is_flash(&self) -> bool {
        self.user_agent().map_or(false, |agent| {
            let agent = agent.to_ascii_lowercase();
            agent.contains("shockwave") || agent.contains("flash")
        })
    }

    /// The entity tags of an `If-None-Match` header, with any `-gzip`
    /// suffix removed.
    pub fn etags(&self) -> Vec<String> {
        // read from the raw header map rather than through `header`
        let value = match self.raw.headers.get(header::IF_NONE_MATCH) {
            Some(value) => String::from_utf8_lossy(value.as_bytes()).replace("-gzip", ""),
            None => return Vec::new(),
        };

        value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// The authenticated request cookies.
    ///
    /// Fails only if cookie validation is enabled without a
    /// validation key.
    pub fn cookies(&self) -> Result<&Cookies, Error> {
        self.cookies.get_or_try_init(|| {
            cookie::load(
                &self.raw.cookies,
                self.app.config(),
                self.app.security_provider(),
            )
        })
    }
}

pub(crate) fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.raw.method)
            .field("request_uri", &self.raw.request_uri)
            .field("query_string", &self.raw.query_string)
            .finish()
    }
}
