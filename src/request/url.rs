use super::Request;
use crate::http::decode;

use http::header;
use http::uri::{Authority, Uri};
use once_cell::unsync::OnceCell;

impl Request {
    /// The request URI followed by the raw query string, if any.
    pub fn url(&self) -> &str {
        self.url.get_or_init(|| self.resolve_request_uri())
    }

    /// Override the URL. The path info will be derived again.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = OnceCell::from(url.into());
        self.path_info = OnceCell::new();
    }

    /// The raw query string, or an empty string.
    pub fn query_string(&self) -> &str {
        self.raw.query_string.as_deref().unwrap_or_default()
    }

    /// The host info followed by the URL.
    pub fn absolute_url(&self) -> String {
        format!("{}{}", self.host_info().unwrap_or_default(), self.url())
    }

    /// The decoded path of the URL, without its leading slashes.
    ///
    /// `/foo/bar?x=1` yields `foo/bar`, and `//foo` yields `foo`.
    pub fn path_info(&self) -> &str {
        self.path_info.get_or_init(|| self.resolve_path_info())
    }

    pub fn set_path_info(&mut self, path_info: &str) {
        self.path_info = OnceCell::from(path_info.trim_start_matches('/').to_owned());
    }

    /// The scheme and host the request was sent to, taken from the
    /// `Host` header unless overridden.
    pub fn host_info(&self) -> Option<&str> {
        self.host_info
            .get_or_init(|| self.header(header::HOST).map(str::to_owned))
            .as_deref()
    }

    /// Override the host info, or clear the override with `None`.
    pub fn set_host_info(&mut self, host_info: Option<&str>) {
        self.host_info = match host_info {
            Some(value) => OnceCell::from(Some(value.trim_end_matches('/').to_owned())),
            None => OnceCell::new(),
        };
        self.host_name = OnceCell::new();
    }

    /// The host component of the [host info](Self::host_info), without
    /// port or IPv6 brackets.
    pub fn host_name(&self) -> Option<&str> {
        self.host_name
            .get_or_init(|| self.host_info().and_then(parse_host_name))
            .as_deref()
    }

    /// The port of insecure requests.
    pub fn port(&self) -> Option<u16> {
        self.port.or(self.raw.server_port)
    }

    pub fn set_port(&mut self, port: u16) {
        if self.port != Some(port) {
            self.port = Some(port);
            self.invalidate_host();
        }
    }

    /// The port of secure requests, 443 unless overridden.
    pub fn secure_port(&self) -> u16 {
        self.secure_port.unwrap_or(443)
    }

    pub fn set_secure_port(&mut self, port: u16) {
        if self.secure_port != Some(port) {
            self.secure_port = Some(port);
            self.invalidate_host();
        }
    }

    fn invalidate_host(&mut self) {
        self.host_info = OnceCell::new();
        self.host_name = OnceCell::new();
    }

    fn resolve_request_uri(&self) -> String {
        match &self.raw.query_string {
            Some(query) => format!("{}?{}", self.raw.request_uri, query),
            None => self.raw.request_uri.clone(),
        }
    }

    fn resolve_path_info(&self) -> String {
        let url = self.url();
        let path = url.split_once('?').map_or(url, |(path, _)| path);
        let path = decode::utf8_or_latin1(decode::url_decode(path));

        let rest = path.strip_prefix('/').unwrap_or(path.as_str());
        rest.strip_prefix('/').unwrap_or(rest).to_owned()
    }
}

fn parse_host_name(host_info: &str) -> Option<String> {
    let host = if host_info.contains("://") {
        host_info.parse::<Uri>().ok()?.host()?.to_owned()
    } else {
        host_info.parse::<Authority>().ok()?.host().to_owned()
    };

    Some(host.trim_start_matches('[').trim_end_matches(']').to_owned())
}
