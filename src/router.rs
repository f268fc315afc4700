//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Route values are plain
//! handlers or composed pipelines — the router cannot tell the difference
//! and does not need to.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally. Anywhere a
/// handler is accepted, a composed [`Pipeline`](crate::Pipeline) is too:
///
/// ```rust
/// use std::sync::Arc;
/// use strata::{ErrorMiddleware, RequestContext, Response, Result, Router, compose};
///
/// async fn get_user(cx: RequestContext) -> Result<Response> {
///     let id = cx.param("id").unwrap_or("unknown");
///     Ok(Response::json(format!(r#"{{"id":"{id}"}}"#)))
/// }
///
/// let app = Router::new()
///     .get("/users/{id}", compose(get_user, vec![Arc::new(ErrorMiddleware)]));
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers a handler for a method + path pair. Returns `self` for
    /// chaining.
    ///
    /// Path parameters use `{name}` syntax — `cx.param("name")` retrieves
    /// them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
