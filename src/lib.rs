//! # strata
//!
//! Composable middleware pipelines for async HTTP services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! A request pipeline is an onion: one terminal handler wrapped in an
//! ordered list of middleware layers. [`compose`] builds the onion. The
//! first middleware listed is the outermost — first to see the request,
//! last to see the response. Every layer gets the same deal:
//!
//! - run its continuation once, or not at all (short-circuit: 401, 429, …)
//! - hand the continuation a replaced context (params, principal)
//! - transform the response on the way back out
//! - trap failures raised further in, or let them propagate
//!
//! The order is fixed at composition time and identical for every request.
//! There is no registry, no priority sorting, no reflection: the list you
//! write is the order you get.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata::{
//!     AuthMiddleware, ErrorMiddleware, Principal, RequestContext, Response, Result, Router,
//!     Server, TraceMiddleware, compose,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let whoami = compose(whoami, vec![
//!         Arc::new(ErrorMiddleware),
//!         Arc::new(TraceMiddleware),
//!         Arc::new(AuthMiddleware::static_token(
//!             "valid-token",
//!             Principal::new("123", "admin"),
//!         )),
//!     ]);
//!
//!     let app = Router::new().get("/whoami", whoami);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn whoami(cx: RequestContext) -> Result<Response> {
//!     // Only reachable through the auth layer, which attached the principal.
//!     let id = cx.principal().map(|p| p.id.as_str()).unwrap_or("anonymous");
//!     Ok(Response::json(format!(r#"{{"id":"{id}"}}"#)))
//! }
//! ```
//!
//! ## What a middleware looks like
//!
//! Implement [`Middleware`] on a type, or just write an async closure —
//! both receive the context and a consuming [`Next`] continuation:
//!
//! ```rust
//! use strata::{Next, RequestContext, Response, Result};
//!
//! async fn deny_teapots(cx: RequestContext, next: Next) -> Result<Response> {
//!     if cx.request().header("user-agent") == Some("teapot") {
//!         return Ok(Response::status(strata::StatusCode::IM_A_TEAPOT));
//!     }
//!     next.run(cx).await
//! }
//! ```

mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use context::{Principal, RequestContext};
pub use error::{Error, Result};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use middleware::{
    AuthMiddleware, CacheControlMiddleware, CorsMiddleware, ErrorMiddleware, MemoryStore,
    Middleware, Next, Pipeline, RateLimitMiddleware, RateLimitRecord, RateLimitStore,
    TraceMiddleware, compose,
};
pub use request::{Request, RequestBuilder};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
