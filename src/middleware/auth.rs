//! Credential checking and principal attachment.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;

use crate::context::{Principal, RequestContext};
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// Authenticates requests by inspecting the `authorization` header.
///
/// The credential-to-identity decision is an injected verifier function —
/// the engine demonstrates the composition contract, not an auth policy.
///
/// A missing or rejected credential short-circuits with
/// `401 {"error": "Unauthorized"}`; the continuation is never invoked. An
/// accepted credential derives a [`Principal`] and the continuation runs
/// with a replaced context carrying it: downstream layers and the terminal
/// handler observe only the post-auth context, and any principal attached
/// earlier is discarded.
pub struct AuthMiddleware {
    verify: Arc<dyn Fn(&str) -> Option<Principal> + Send + Sync>,
}

impl AuthMiddleware {
    /// A middleware around an arbitrary verifier.
    pub fn new(verify: impl Fn(&str) -> Option<Principal> + Send + Sync + 'static) -> Self {
        Self { verify: Arc::new(verify) }
    }

    /// A verifier that accepts exactly `token` and derives `principal`
    /// from it. Demo-grade policy for examples and tests.
    pub fn static_token(token: impl Into<String>, principal: Principal) -> Self {
        let token = token.into();
        Self::new(move |credential| (credential == token).then(|| principal.clone()))
    }

    fn reject() -> Response {
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .json(json!({ "error": "Unauthorized" }).to_string().into_bytes())
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        let principal = cx
            .request()
            .header("authorization")
            .and_then(|credential| (self.verify)(credential));

        match principal {
            None => Ok(Self::reject()),
            Some(principal) => next.run(cx.with_principal(principal)).await,
        }
    }
}
