use crate::config::Config;
use crate::http::RawRequest;
use crate::parse::Parsers;
use crate::request::Request;
use crate::route::Resolve;
use crate::security::{HmacSecurity, Security};

use std::fmt;
use std::sync::Arc;

/// Application-wide services shared by every request.
///
/// An `App` is built once at startup, wrapped in an [`Arc`], and used to
/// create a [`Request`] for every buffered request the server delivers.
///
/// ```
/// use portico::http::{Method, RawRequest};
/// use portico::{App, Config};
/// use std::sync::Arc;
///
/// let app = Arc::new(App::new(Config::new().cookie_validation_key("secret")));
///
/// let raw = RawRequest::builder()
///     .method(Method::GET)
///     .target("/posts/1?page=2")
///     .build()
///     .unwrap();
///
/// let request = app.request(raw);
/// assert_eq!(request.path_info(), "posts/1");
/// ```
pub struct App {
    config: Config,
    parsers: Parsers,
    security: Arc<dyn Security>,
    resolver: Option<Arc<dyn Resolve>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            parsers: Parsers::new(),
            security: Arc::new(HmacSecurity::new()),
            resolver: None,
        }
    }

    /// Set the body parsers.
    pub fn parsers(mut self, parsers: Parsers) -> Self {
        self.parsers = parsers;
        self
    }

    /// Replace the default [`HmacSecurity`] provider.
    pub fn security<S>(mut self, security: S) -> Self
    where
        S: Security + 'static,
    {
        self.security = Arc::new(security);
        self
    }

    /// Set the route resolver used by [`Request::resolve`].
    pub fn resolver<R>(mut self, resolver: R) -> Self
    where
        R: Resolve + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Wrap a raw request.
    pub fn request(self: &Arc<Self>, raw: RawRequest) -> Request {
        Request::new(self.clone(), raw)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn body_parsers(&self) -> &Parsers {
        &self.parsers
    }

    /// The security provider used for cookies and CSRF tokens.
    pub fn security_provider(&self) -> &dyn Security {
        &*self.security
    }

    pub(crate) fn route_resolver(&self) -> Option<Arc<dyn Resolve>> {
        self.resolver.clone()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("parsers", &self.parsers)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}
