//! Failure boundary.

use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// Traps failures raised anywhere further in and converts them into a
/// fixed-shape `500` response.
///
/// On success the response passes through unchanged. On failure the error
/// is reported to the log sink, then answered as:
///
/// ```json
/// { "error": "Internal Server Error", "message": "<failure text>" }
/// ```
///
/// Layers outside this one observe a normal response, never a failure.
/// Pipeline failure safety is exactly as strong as this middleware's
/// position — compose it outermost to cover every other layer.
///
/// The `message` field echoes the failure's own text to the caller. That
/// keeps development loops short but leaks internal error strings;
/// deployments that treat error text as sensitive should substitute their
/// own boundary here.
pub struct ErrorMiddleware;

#[async_trait]
impl Middleware for ErrorMiddleware {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        match next.run(cx).await {
            Ok(response) => Ok(response),
            Err(err) => {
                error!(error = %err, "request failed");
                let body = json!({
                    "error": "Internal Server Error",
                    "message": err.message(),
                });
                Ok(Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .json(body.to_string().into_bytes()))
            }
        }
    }
}
