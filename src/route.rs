//! Route resolution.

use crate::error::Error;
use crate::http::{Method, Params};
use crate::request::Request;

use std::collections::HashMap;

use matchit::Node;
use tracing::trace;

/// Resolves a request to a route and its parameters.
///
/// Implemented by [`Router`] and by closures taking a `&Request`.
pub trait Resolve: Send + Sync {
    /// Returns the route and route parameters, or `None` if nothing matched.
    fn resolve(&self, request: &Request) -> Option<(String, Params)>;
}

impl<F> Resolve for F
where
    F: Fn(&Request) -> Option<(String, Params)> + Send + Sync,
{
    fn resolve(&self, request: &Request) -> Option<(String, Params)> {
        self(request)
    }
}

/// Maps method and path patterns to route names, matched against the
/// request's [path info](Request::path_info).
///
/// ```
/// use portico::route::Router;
///
/// let router = Router::new()
///     .get("/posts/:id", "post/view")
///     .unwrap()
///     .post("/posts", "post/create")
///     .unwrap();
/// # drop(router);
/// ```
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, Node<String>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::with_capacity(6),
        }
    }

    /// Insert a route. Paths follow `matchit` syntax: `:name` captures a
    /// segment and `*name` captures the rest of the path.
    pub fn route(
        mut self,
        method: Method,
        path: impl Into<String>,
        route: impl Into<String>,
    ) -> Result<Self, Error> {
        let path = path.into();

        self.routes
            .entry(method)
            .or_default()
            .insert(path.clone(), route.into())
            .map_err(|err| Error::config(format!("failed to insert route '{}': {}", path, err)))?;

        Ok(self)
    }
}

macro_rules! insert_route {
    ($name:ident => Method::$method:ident) => {
        #[doc = concat!("Insert a route for the `", stringify!($method), "` method.")]
        pub fn $name(
            self,
            path: impl Into<String>,
            route: impl Into<String>,
        ) -> Result<Self, Error> {
            self.route(Method::$method, path, route)
        }
    };
}

impl Router {
    insert_route!(get => Method::GET);
    insert_route!(put => Method::PUT);
    insert_route!(post => Method::POST);
    insert_route!(delete => Method::DELETE);
    insert_route!(head => Method::HEAD);
    insert_route!(options => Method::OPTIONS);
    insert_route!(patch => Method::PATCH);
}

impl Resolve for Router {
    fn resolve(&self, request: &Request) -> Option<(String, Params)> {
        let method = request.method();
        let path = format!("/{}", request.path_info());

        let matched = self.routes.get(&method)?.at(&path).ok();
        trace!(%method, path = %path, matched = matched.is_some(), "resolving route");
        let matched = matched?;

        let params = matched
            .params
            .iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();

        Some((matched.value.clone(), params))
    }
}
