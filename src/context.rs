//! Per-request context threaded through the pipeline.

use std::collections::HashMap;

use crate::request::Request;

/// The authenticated identity attached to a request context after
/// successful authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self { id: id.into(), role: role.into() }
    }
}

/// Everything one pipeline invocation knows about its request: the inbound
/// [`Request`], the route parameters, and the optional authenticated
/// [`Principal`].
///
/// Contexts move through the pipeline by value. A middleware that wants
/// downstream layers to see different params or a different principal
/// builds a replacement with [`with_params`](RequestContext::with_params) /
/// [`with_principal`](RequestContext::with_principal) and hands that to its
/// continuation. Cloning first keeps the pre-replacement context available
/// for post-processing after the continuation returns — replacement, never
/// aliased mutation.
#[derive(Clone, Debug)]
pub struct RequestContext {
    request: Request,
    params: HashMap<String, String>,
    principal: Option<Principal>,
}

impl RequestContext {
    /// A context with no route parameters and no principal. Params are
    /// attached at routing time, a principal only ever by middleware.
    pub fn new(request: Request) -> Self {
        Self { request, params: HashMap::new(), principal: None }
    }

    /// Replaces the route parameters.
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Replaces the principal. Any previously attached identity is
    /// discarded.
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn request(&self) -> &Request { &self.request }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Returns a named route parameter.
    ///
    /// For a route `/users/{id}`, `cx.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The authenticated identity, if an authentication layer set one.
    /// Terminal handlers must not assume a default.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}
