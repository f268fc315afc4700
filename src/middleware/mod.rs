//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: authentication, rate limiting, structured
//! tracing, CORS and cache-control headers, error trapping.
//!
//! A pipeline is an onion. [`compose`] wraps a terminal handler in an
//! ordered list of layers; the first middleware listed is the outermost —
//! the first to see the request and the last to see the response:
//!
//! ```text
//! request ──▶ m1 ──▶ m2 ──▶ … ──▶ handler
//! response ◀── m1 ◀── m2 ◀── … ◀──┘
//! ```
//!
//! Each layer receives the [`RequestContext`](crate::RequestContext) and a
//! [`Next`] continuation and may:
//!
//! - **short-circuit** — return a response without running `Next`; the
//!   handler and every inner layer are never invoked
//! - **replace the context** — hand `Next` a context with different params
//!   or principal; only inner layers see the replacement
//! - **transform the response** — run `Next`, then alter what came back
//! - **trap failures** — convert an `Err` from `Next` into a response
//!
//! The built-in middlewares below are interchangeable plug-ins over that
//! one contract, each independently callable with [`Next::terminal`].

mod auth;
mod cache;
mod cors;
mod error;
mod pipeline;
mod rate_limit;
mod trace;

pub use auth::AuthMiddleware;
pub use cache::CacheControlMiddleware;
pub use cors::CorsMiddleware;
pub use error::ErrorMiddleware;
pub use pipeline::{Middleware, Next, Pipeline, compose};
pub use rate_limit::{MemoryStore, RateLimitMiddleware, RateLimitRecord, RateLimitStore};
pub use trace::TraceMiddleware;
