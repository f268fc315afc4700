//! Minimal strata example — a public route and an authenticated route,
//! each behind its own middleware pipeline.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/api/hello?id=42
//!   curl http://localhost:3000/api/secure                                  # 401
//!   curl http://localhost:3000/api/secure -H 'authorization: valid-token'
//!   for i in $(seq 6); do curl http://localhost:3000/api/hello; done       # 6th is 429
//!   curl http://localhost:3000/healthz

use std::sync::Arc;
use std::time::Duration;

use strata::{
    AuthMiddleware, CacheControlMiddleware, CorsMiddleware, ErrorMiddleware, Principal,
    RateLimitMiddleware, RequestContext, Response, Result, Router, Server, TraceMiddleware,
    compose, health,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // First listed = outermost: the error boundary covers everything inside it.
    let app = Router::new()
        .get("/api/hello", compose(hello, vec![
            Arc::new(ErrorMiddleware),
            Arc::new(TraceMiddleware),
            Arc::new(RateLimitMiddleware::new(5, Duration::from_secs(60))),
            Arc::new(CacheControlMiddleware::default()),
        ]))
        .get("/api/secure", compose(secure, vec![
            Arc::new(ErrorMiddleware),
            Arc::new(CorsMiddleware),
            Arc::new(AuthMiddleware::static_token(
                "valid-token",
                Principal::new("123", "admin"),
            )),
        ]))
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);

    Server::bind("0.0.0.0:3000").serve(app).await.expect("server error");
}

// GET /api/hello — public, rate limited, cacheable.
async fn hello(cx: RequestContext) -> Result<Response> {
    let id = cx
        .request()
        .uri()
        .query()
        .and_then(|q| q.split('&').find_map(|pair| pair.strip_prefix("id=")))
        .unwrap_or("unknown");
    Ok(Response::json(format!(r#"{{"message":"hello","id":"{id}"}}"#)))
}

// GET /api/secure — only reachable through the auth layer, which attached
// the principal read here.
async fn secure(cx: RequestContext) -> Result<Response> {
    let principal = cx.principal().expect("auth middleware attaches the principal");
    Ok(Response::json(format!(
        r#"{{"message":"welcome","id":"{}","role":"{}"}}"#,
        principal.id, principal.role
    )))
}
