//! Serve a [`portico::App`] with hyper.
//!
//! Each request is buffered into a [`RawRequest`], wrapped by the app and
//! handed to a synchronous handler. Cookies added to the response cookie
//! collection, such as new CSRF tokens, are signed and sent as
//! `Set-Cookie` headers.

use std::convert::Infallible;
use std::future::{ready, Future, Ready};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::SystemTime;

use hyper::header::{self, HeaderValue};
use hyper::server::conn::{AddrIncoming, AddrStream};
use hyper::service::Service;
use hyper::{Body, Method, StatusCode};
use portico::cookie::{self, Cookie, SameSite};
use portico::csrf::CookieSink;
use portico::http::RawRequest;
use portico::{App, BoxError, Request};
use tracing::{debug, warn};

pub use hyper::Server;

/// Bind `addr` and serve `app`, passing every request to `handler`.
pub fn serve<H>(
    app: Arc<App>,
    addr: &SocketAddr,
    handler: H,
) -> Result<Server<AddrIncoming, PorticoMakeService<H>>, hyper::Error>
where
    H: Fn(Request) -> hyper::Response<Body> + Send + Sync + 'static,
{
    let service = PorticoService::new(app, handler);
    Ok(Server::try_bind(addr)?.serve(PorticoMakeService { service }))
}

/// Read the whole body of a hyper request into a [`RawRequest`].
///
/// Cookies are taken from the `Cookie` header, with percent-encoded values
/// decoded. The body of a URL encoded POST request is also decoded into
/// form fields.
pub async fn buffer(
    req: hyper::Request<Body>,
    remote_addr: Option<SocketAddr>,
    server_port: Option<u16>,
) -> Result<RawRequest, BoxError> {
    let (parts, body) = req.into_parts();
    let body = hyper::body::to_bytes(body).await?;

    let target = parts.uri.path_and_query().map_or("/", |target| target.as_str());
    let mut builder = RawRequest::builder()
        .method(parts.method.clone())
        .target(target)
        .server_software("hyper");

    for (name, value) in request_cookies(&parts.headers) {
        builder = builder.cookie(name, value);
    }

    if parts.method == Method::POST && is_form(&parts.headers) {
        match serde_urlencoded::from_bytes::<Vec<(String, String)>>(&body) {
            Ok(fields) => {
                for (name, value) in fields {
                    builder = builder.form(name, value);
                }
            }
            Err(err) => debug!(%err, "ignoring malformed form body"),
        }
    }

    if let Some(addr) = remote_addr {
        builder = builder.remote_addr(addr.ip().to_string());
    }

    if let Some(port) = server_port {
        builder = builder.server_port(port);
    }

    Ok(builder.headers(parts.headers).body(body).build()?)
}

fn request_cookies(headers: &hyper::HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| {
            let value = value.trim();
            let value = urlencoding::decode(value)
                .map_or_else(|_| value.to_owned(), |decoded| decoded.into_owned());
            (name.trim().to_owned(), value)
        })
        .collect()
}

fn is_form(headers: &hyper::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map_or(false, |media_type| {
            media_type
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// The cookies to send with a response.
#[derive(Debug, Default)]
pub struct ResponseCookies {
    cookies: Mutex<Vec<Cookie>>,
}

impl ResponseCookies {
    pub fn take(&self) -> Vec<Cookie> {
        std::mem::take(&mut *self.cookies.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl CookieSink for ResponseCookies {
    fn add(&self, cookie: Cookie) {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cookie);
    }
}

/// Render a `Set-Cookie` header, signing the value when cookie
/// validation is enabled.
pub fn set_cookie_header(app: &App, cookie: &Cookie) -> Result<HeaderValue, BoxError> {
    let config = app.config();

    let value = if config.enable_cookie_validation {
        if config.cookie_validation_key.is_empty() {
            return Err("cookie validation is enabled without a validation key".into());
        }

        cookie::sign_cookie(
            app.security_provider(),
            &config.cookie_validation_key,
            &cookie.name,
            &cookie.value,
        )?
    } else {
        cookie.value.clone()
    };

    let mut header = format!("{}={}", cookie.name, urlencoding::encode(&value));

    if let Some(expire) = cookie.expire {
        let max_age = expire
            .duration_since(SystemTime::now())
            .map_or(0, |remaining| remaining.as_secs());
        header.push_str(&format!("; Max-Age={}", max_age));
    }

    if let Some(path) = &cookie.path {
        header.push_str(&format!("; Path={}", path));
    }

    if let Some(domain) = &cookie.domain {
        header.push_str(&format!("; Domain={}", domain));
    }

    if cookie.secure {
        header.push_str("; Secure");
    }

    if cookie.http_only {
        header.push_str("; HttpOnly");
    }

    match cookie.same_site {
        Some(SameSite::Strict) => header.push_str("; SameSite=Strict"),
        Some(SameSite::Lax) => header.push_str("; SameSite=Lax"),
        Some(SameSite::None) => header.push_str("; SameSite=None"),
        None => {}
    }

    Ok(HeaderValue::from_str(&header)?)
}

pub struct PorticoMakeService<H> {
    service: PorticoService<H>,
}

impl<'a, H> Service<&'a AddrStream> for PorticoMakeService<H> {
    type Response = PorticoService<H>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, stream: &'a AddrStream) -> Self::Future {
        let mut service = self.service.clone();
        service.remote_addr = Some(stream.remote_addr());
        service.server_port = Some(stream.local_addr().port());
        ready(Ok(service))
    }
}

pub struct PorticoService<H> {
    app: Arc<App>,
    handler: Arc<H>,
    remote_addr: Option<SocketAddr>,
    server_port: Option<u16>,
}

impl<H> PorticoService<H> {
    pub fn new(app: Arc<App>, handler: H) -> Self {
        Self {
            app,
            handler: Arc::new(handler),
            remote_addr: None,
            server_port: None,
        }
    }
}

impl<H> Service<hyper::Request<Body>> for PorticoService<H>
where
    H: Fn(Request) -> hyper::Response<Body> + Send + Sync + 'static,
{
    type Response = hyper::Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: hyper::Request<Body>) -> Self::Future {
        let app = self.app.clone();
        let handler = self.handler.clone();
        let (remote_addr, server_port) = (self.remote_addr, self.server_port);

        Box::pin(async move {
            let raw = match buffer(req, remote_addr, server_port).await {
                Ok(raw) => raw,
                Err(err) => {
                    debug!(%err, "failed to buffer request");
                    let mut resp = hyper::Response::new(Body::empty());
                    *resp.status_mut() = StatusCode::BAD_REQUEST;
                    return Ok(resp);
                }
            };

            let cookies = Arc::new(ResponseCookies::default());
            let req = app.request(raw).with_response_cookies(cookies.clone());
            let mut resp = handler(req);

            for cookie in cookies.take() {
                match set_cookie_header(&app, &cookie) {
                    Ok(value) => {
                        resp.headers_mut().append(header::SET_COOKIE, value);
                    }
                    Err(err) => warn!(cookie = %cookie.name, %err, "failed to set cookie"),
                }
            }

            Ok(resp)
        })
    }
}

impl<H> Clone for PorticoService<H> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            handler: self.handler.clone(),
            remote_addr: self.remote_addr,
            server_port: self.server_port,
        }
    }
}
