//! CORS response headers.

use async_trait::async_trait;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue,
};

use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// Stamps the three CORS allow-headers onto every response.
///
/// Always runs its continuation — this layer cannot short-circuit — then
/// overwrites `access-control-allow-origin` (wildcard),
/// `access-control-allow-methods` and `access-control-allow-headers` with
/// the fixed lists below. Status, body, and unrelated headers pass through
/// unchanged, so this composes with other header-stamping layers in either
/// order.
pub struct CorsMiddleware;

#[async_trait]
impl Middleware for CorsMiddleware {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        let mut response = next.run(cx).await?;

        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type,Authorization"),
        );
        Ok(response)
    }
}
