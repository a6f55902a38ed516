use super::Request;
use crate::error::Error;
use crate::http::{decode, Method, Params};
use crate::parse;

use once_cell::unsync::OnceCell;
use serde_json::Value;
use tracing::{debug, trace};

impl Request {
    /// Resolve the request into a route and its parameters.
    ///
    /// Route parameters are merged into the query parameters. If the
    /// query parameters were not computed yet, values from the query
    /// string take precedence; otherwise route parameters only fill in
    /// names that are not already present.
    pub fn resolve(&mut self) -> Result<(String, &Params), Error> {
        let resolver = self
            .app
            .route_resolver()
            .ok_or_else(|| Error::config("no route resolver configured"))?;

        let (route, route_params) = match resolver.resolve(self) {
            Some(resolved) => resolved,
            None => {
                debug!(url = self.url(), "no route matched the request");
                return Err(Error::not_found());
            }
        };

        let merged = match self.query_params.take() {
            None => {
                let mut merged = route_params;
                merged.extend(self.parse_query_string());
                merged
            }
            Some(mut existing) => {
                for (name, value) in route_params {
                    if !existing.contains(&name) {
                        existing.insert(name, value);
                    }
                }
                existing
            }
        };

        self.query_params = OnceCell::from(merged);
        Ok((route, self.query_params()))
    }

    /// The parameters of the query string.
    ///
    /// The whole query string is percent-decoded once, then split into
    /// `name=value` pairs. Pairs without `=` are ignored, and a later
    /// pair replaces an earlier one with the same name.
    pub fn query_params(&self) -> &Params {
        self.query_params.get_or_init(|| self.parse_query_string())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params().get(name).map(String::as_str)
    }

    /// Replace the query parameters.
    pub fn set_query_params(&mut self, params: Params) {
        self.query_params = OnceCell::from(params);
    }

    /// The parameters of the request body.
    ///
    /// Bodies are parsed by the parser registered for their media type,
    /// or by the wildcard parser. Without a parser, the form data already
    /// decoded by the transport is used for POST requests, and other
    /// requests have their body decoded as a URL encoded form.
    pub fn body_params(&self) -> Result<&Params<Value>, Error> {
        self.body_params.get_or_try_init(|| self.parse_body())
    }

    pub fn body_param(&self, name: &str) -> Result<Option<&Value>, Error> {
        Ok(self.body_params()?.get(name))
    }

    /// Replace the body parameters.
    pub fn set_body_params(&mut self, params: Params<Value>) {
        self.body_params = OnceCell::from(params);
    }

    fn parse_query_string(&self) -> Params {
        let query = match &self.raw.query_string {
            Some(query) => query,
            None => return Params::new(),
        };

        let decoded = decode::url_decode(query);

        decode::utf8_or_latin1(decoded)
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    fn parse_body(&self) -> Result<Params<Value>, Error> {
        let method_param = &self.app.config().method_param;

        if self.raw.form.contains(method_param) {
            let mut params = self.raw.form.clone();
            params.remove(method_param);
            return Ok(params.into());
        }

        let raw_content_type = self.content_type().unwrap_or_default();
        let media_type = raw_content_type
            .split_once(';')
            .map_or(raw_content_type, |(media_type, _)| media_type)
            .trim();

        if let Some(parser) = self.app.body_parsers().find(media_type) {
            trace!(media_type, "parsing request body");
            return parser
                .parse(&self.raw.body, raw_content_type)
                .map_err(Error::parse);
        }

        if self.method() == Method::POST {
            return Ok(self.raw.form.clone().into());
        }

        parse::parse_form(&self.raw.body).map_err(Error::parse)
    }
}
