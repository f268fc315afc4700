//! Cache-control response header.

use async_trait::async_trait;
use http::header::{CACHE_CONTROL, HeaderValue};

use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

/// Stamps `cache-control` onto every response, overwriting any prior value
/// at that name. Status, body, and all other headers pass through
/// unchanged.
pub struct CacheControlMiddleware {
    value: HeaderValue,
}

impl CacheControlMiddleware {
    /// `public, max-age=<secs>`.
    pub fn max_age(secs: u32) -> Self {
        // Digits and ASCII punctuation only — a valid header value.
        let value = HeaderValue::from_str(&format!("public, max-age={secs}"))
            .expect("cache-control value");
        Self { value }
    }
}

/// `public, max-age=60`.
impl Default for CacheControlMiddleware {
    fn default() -> Self {
        Self { value: HeaderValue::from_static("public, max-age=60") }
    }
}

#[async_trait]
impl Middleware for CacheControlMiddleware {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        let mut response = next.run(cx).await?;
        response.headers_mut().insert(CACHE_CONTROL, self.value.clone());
        Ok(response)
    }
}
