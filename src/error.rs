use http::StatusCode;

use std::fmt;

/// A dynamically typed, thread-safe error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while normalizing or validating a request.
///
/// Failed cookie authentication and failed CSRF validation are not
/// errors: the former drops the cookie, the latter returns `false`.
#[derive(Debug)]
pub struct Error(ErrorKind);

#[derive(Debug)]
enum ErrorKind {
    Config(String),
    NotFound,
    Parse(BoxError),
    Random(BoxError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self(ErrorKind::Config(message.into()))
    }

    pub(crate) fn not_found() -> Self {
        Self(ErrorKind::NotFound)
    }

    pub(crate) fn parse(err: impl Into<BoxError>) -> Self {
        Self(ErrorKind::Parse(err.into()))
    }

    pub(crate) fn random(err: BoxError) -> Self {
        Self(ErrorKind::Random(err))
    }

    /// Returns `true` if the application is misconfigured.
    pub fn is_config(&self) -> bool {
        matches!(self.0, ErrorKind::Config(_))
    }

    /// Returns `true` if the request did not resolve to a route.
    pub fn is_not_found(&self) -> bool {
        matches!(self.0, ErrorKind::NotFound)
    }

    /// Returns `true` if a body parser rejected the request body.
    pub fn is_parse(&self) -> bool {
        matches!(self.0, ErrorKind::Parse(_))
    }

    /// Returns `true` if the random source failed.
    pub fn is_random(&self) -> bool {
        matches!(self.0, ErrorKind::Random(_))
    }

    /// The status code a server should respond with.
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Parse(_) => StatusCode::BAD_REQUEST,
            ErrorKind::Config(_) | ErrorKind::Random(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ErrorKind::Config(message) => write!(f, "invalid configuration: {}", message),
            ErrorKind::NotFound => write!(f, "page not found"),
            ErrorKind::Parse(err) => write!(f, "failed to parse request body: {}", err),
            ErrorKind::Random(err) => write!(f, "failed to generate random bytes: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            ErrorKind::Parse(err) | ErrorKind::Random(err) => Some(&**err),
            ErrorKind::Config(_) | ErrorKind::NotFound => None,
        }
    }
}
