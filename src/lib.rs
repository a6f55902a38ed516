//! Request normalization and security validation for buffered HTTP requests.
//!
//! A server hands each fully buffered request to [`App::request`] as a
//! [`RawRequest`](http::RawRequest). The resulting [`Request`] derives the
//! URL, path info, host, query and body parameters and content negotiation
//! lazily, authenticates signed cookies, and issues and validates CSRF
//! tokens.

mod app;
mod config;
mod error;
mod request;

pub mod cookie;
pub mod csrf;
pub mod http;
pub mod parse;
pub mod route;
pub mod security;

pub use app::App;
pub use config::{Config, CsrfCookie};
pub use error::{BoxError, Error};
pub use request::Request;
