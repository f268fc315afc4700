//! Per-request log records.

use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// Pure observer: one info record on the way in (method, target), one on
/// the way out (final status, elapsed time).
///
/// Never alters the context or the response. The after-record carries
/// whatever status the inner layers settled on — transforms applied
/// further in are already visible here. A failure from the continuation
/// propagates through untouched (no after-record is emitted for it;
/// trapping is [`ErrorMiddleware`](crate::ErrorMiddleware)'s job).
pub struct TraceMiddleware;

#[async_trait]
impl Middleware for TraceMiddleware {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        let method = cx.request().method().clone();
        let target = cx.request().uri().to_string();
        info!(method = %method, target = %target, "request");

        let started = Instant::now();
        let response = next.run(cx).await?;

        info!(
            status = response.status_code().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response"
        );
        Ok(response)
    }
}
