use super::Params;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;

use std::convert::TryFrom;

/// A fully buffered request, as delivered by the transport.
///
/// `RawRequest` is a plain bag of attributes and is never modified
/// after it is built; every derived view lives on
/// [`Request`](crate::Request).
#[derive(Debug, Default)]
pub struct RawRequest {
    pub(crate) method: Method,
    pub(crate) request_uri: String,
    pub(crate) query_string: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) form: Params,
    pub(crate) cookies: Params,
    pub(crate) remote_addr: Option<String>,
    pub(crate) server_port: Option<u16>,
    pub(crate) server_software: Option<String>,
}

impl RawRequest {
    pub fn builder() -> Builder {
        Builder {
            inner: Ok(Self {
                request_uri: String::from("/"),
                ..Self::default()
            }),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI without the query string.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Form fields the transport already decoded from the body.
    pub fn form(&self) -> &Params {
        &self.form
    }

    /// Cookies exactly as sent by the client.
    pub fn cookies(&self) -> &Params {
        &self.cookies
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    pub fn server_port(&self) -> Option<u16> {
        self.server_port
    }

    pub fn server_software(&self) -> Option<&str> {
        self.server_software.as_deref()
    }
}

/// A builder for [`RawRequest`].
///
/// Invalid header names or values are reported by [`Builder::build`].
#[derive(Debug)]
pub struct Builder {
    inner: Result<RawRequest, http::Error>,
}

impl Builder {
    pub fn method(self, method: Method) -> Self {
        self.and_then(|mut raw| {
            raw.method = method;
            Ok(raw)
        })
    }

    /// Set the request URI. Any query string must be set separately
    /// with [`query_string`](Self::query_string).
    pub fn request_uri(self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.and_then(|mut raw| {
            raw.request_uri = uri;
            Ok(raw)
        })
    }

    pub fn query_string(self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.and_then(|mut raw| {
            raw.query_string = Some(query);
            Ok(raw)
        })
    }

    /// Set both the request URI and the query string from a request
    /// target such as `/search?q=rust`.
    pub fn target(self, target: &str) -> Self {
        match target.split_once('?') {
            Some((uri, query)) => self.request_uri(uri).query_string(query),
            None => self.request_uri(target),
        }
    }

    pub fn header<K, V>(self, name: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.and_then(move |mut raw| {
            let name = HeaderName::try_from(name).map_err(Into::into)?;
            let value = HeaderValue::try_from(value).map_err(Into::into)?;
            raw.headers.append(name, value);
            Ok(raw)
        })
    }

    pub fn headers(self, headers: HeaderMap) -> Self {
        self.and_then(|mut raw| {
            raw.headers = headers;
            Ok(raw)
        })
    }

    pub fn body(self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.and_then(|mut raw| {
            raw.body = body;
            Ok(raw)
        })
    }

    /// Add a pre-parsed form field.
    pub fn form(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.and_then(|mut raw| {
            raw.form.insert(name, value);
            Ok(raw)
        })
    }

    /// Add a raw cookie as received from the client.
    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.and_then(|mut raw| {
            raw.cookies.insert(name, value);
            Ok(raw)
        })
    }

    pub fn remote_addr(self, addr: impl Into<String>) -> Self {
        let addr = addr.into();
        self.and_then(|mut raw| {
            raw.remote_addr = Some(addr);
            Ok(raw)
        })
    }

    pub fn server_port(self, port: u16) -> Self {
        self.and_then(|mut raw| {
            raw.server_port = Some(port);
            Ok(raw)
        })
    }

    pub fn server_software(self, software: impl Into<String>) -> Self {
        let software = software.into();
        self.and_then(|mut raw| {
            raw.server_software = Some(software);
            Ok(raw)
        })
    }

    pub fn build(self) -> Result<RawRequest, http::Error> {
        self.inner
    }

    fn and_then<F>(self, f: F) -> Self
    where
        F: FnOnce(RawRequest) -> Result<RawRequest, http::Error>,
    {
        Self {
            inner: self.inner.and_then(f),
        }
    }
}
