//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on your router:
//!
//! ```rust,no_run
//! use strata::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Override `readiness` with your own handler to gate on dependency
//! availability (database connections, downstream services, etc.).

use crate::context::RequestContext;
use crate::error::Result;
use crate::response::Response;

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no
/// dependencies.
pub async fn liveness(_cx: RequestContext) -> Result<Response> {
    Ok(Response::text("ok"))
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace with your own handler if
/// your application needs a warm-up period or must verify dependency
/// health before accepting traffic.
pub async fn readiness(_cx: RequestContext) -> Result<Response> {
    Ok(Response::text("ready"))
}
