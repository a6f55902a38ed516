//! Request body parsers, keyed by media type.

use crate::error::{BoxError, Error};
use crate::http::Params;

use serde_json::Value;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The media type that matches any request without a dedicated parser.
pub const WILDCARD: &str = "*";

/// Types that can turn a raw request body into parameters.
///
/// Implemented for closures with the same signature as [`parse`](Self::parse).
pub trait BodyParser: Send + Sync {
    /// Parse the body. `content_type` is the raw `Content-Type` header,
    /// including any parameters such as the charset.
    fn parse(&self, body: &[u8], content_type: &str) -> Result<Params<Value>, BoxError>;
}

impl<F> BodyParser for F
where
    F: Fn(&[u8], &str) -> Result<Params<Value>, BoxError> + Send + Sync,
{
    fn parse(&self, body: &[u8], content_type: &str) -> Result<Params<Value>, BoxError> {
        self(body, content_type)
    }
}

/// A registry of [`BodyParser`]s.
///
/// ```
/// use portico::parse::{FormParser, Parsers};
///
/// let parsers = Parsers::new()
///     .json()
///     .register("*", FormParser)
///     .unwrap();
/// # drop(parsers);
/// ```
#[derive(Clone, Default)]
pub struct Parsers {
    parsers: HashMap<String, Arc<dyn BodyParser>>,
}

impl Parsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser for a media type such as `application/json`,
    /// or for [`WILDCARD`].
    ///
    /// Media types must not carry parameters; the `Content-Type` of a
    /// request is matched with its parameters stripped.
    pub fn register<P>(mut self, media_type: &str, parser: P) -> Result<Self, Error>
    where
        P: BodyParser + 'static,
    {
        if media_type != WILDCARD {
            let valid = media_type
                .parse::<mime::Mime>()
                .map(|mime| mime.params().next().is_none())
                .unwrap_or(false);

            if !valid {
                return Err(Error::config(format!(
                    "'{}' is not a valid media type for a request parser",
                    media_type
                )));
            }
        }

        self.parsers.insert(media_type.to_owned(), Arc::new(parser));
        Ok(self)
    }

    /// Register [`JsonParser`] for `application/json`.
    pub fn json(mut self) -> Self {
        self.parsers.insert(
            mime::APPLICATION_JSON.essence_str().to_owned(),
            Arc::new(JsonParser::new()),
        );
        self
    }

    /// Find the parser for a media type, falling back to the wildcard parser.
    pub fn find(&self, media_type: &str) -> Option<&dyn BodyParser> {
        self.parsers
            .get(media_type)
            .or_else(|| self.parsers.get(WILDCARD))
            .map(|parser| &**parser)
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for Parsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.parsers.keys()).finish()
    }
}

/// Parses JSON request bodies.
///
/// A top level object becomes the parameters, an array is keyed by
/// index, and an empty body or `null` yields no parameters. Any other
/// value is rejected.
#[derive(Clone, Debug, Default)]
pub struct JsonParser {
    _priv: (),
}

impl JsonParser {
    pub fn new() -> Self {
        Self { _priv: () }
    }
}

impl BodyParser for JsonParser {
    fn parse(&self, body: &[u8], _: &str) -> Result<Params<Value>, BoxError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Params::new());
        }

        match serde_json::from_slice(body)? {
            Value::Object(object) => Ok(object.into_iter().collect()),
            Value::Array(values) => Ok(values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value))
                .collect()),
            Value::Null => Ok(Params::new()),
            _ => Err("expected a JSON object or array".into()),
        }
    }
}

/// Parses `application/x-www-form-urlencoded` request bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormParser;

impl BodyParser for FormParser {
    fn parse(&self, body: &[u8], _: &str) -> Result<Params<Value>, BoxError> {
        parse_form(body).map_err(Into::into)
    }
}

pub(crate) fn parse_form(body: &[u8]) -> Result<Params<Value>, serde_urlencoded::de::Error> {
    let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)?;

    Ok(pairs
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shapes() {
        let parser = JsonParser::new();

        let object = parser.parse(br#"{"a": 1, "b": [true]}"#, "").unwrap();
        assert_eq!(object.get("a"), Some(&Value::from(1)));

        let array = parser.parse(br#"["x", "y"]"#, "").unwrap();
        assert_eq!(array.get("1"), Some(&Value::from("y")));

        assert!(parser.parse(b"  ", "").unwrap().is_empty());
        assert!(parser.parse(b"null", "").unwrap().is_empty());
        assert!(parser.parse(b"42", "").is_err());
        assert!(parser.parse(b"{", "").is_err());
    }

    #[test]
    fn register_rejects_bad_media_types() {
        assert!(Parsers::new().register("*", FormParser).is_ok());
        assert!(Parsers::new().register("text/plain", FormParser).is_ok());

        let err = Parsers::new().register("json", FormParser).unwrap_err();
        assert!(err.is_config());

        let err = Parsers::new()
            .register("text/plain; charset=utf-8", FormParser)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn exact_match_then_wildcard() {
        let parsers = Parsers::new()
            .json()
            .register(WILDCARD, |_: &[u8], _: &str| -> Result<Params<Value>, BoxError> {
                Ok(Params::from([("wildcard", Value::Bool(true))]))
            })
            .unwrap();

        let json = parsers.find("application/json").unwrap();
        assert!(json.parse(b"{}", "").unwrap().is_empty());

        let other = parsers.find("text/csv").unwrap();
        assert!(other.parse(b"", "").unwrap().contains("wildcard"));

        assert!(Parsers::new().find("application/json").is_none());
    }
}
