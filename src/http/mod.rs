mod accept;
pub(crate) mod decode;
mod params;
mod raw;

pub use accept::{parse_accept_header, AcceptEntry};
pub use params::Params;
pub use raw::{Builder, RawRequest};

pub use bytes::Bytes;
pub use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
