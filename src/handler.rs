//! Terminal handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router and the pipeline composer both need to hold handlers of
//! *different* concrete types uniformly. Rust collections hold one type, so
//! handlers are erased behind a trait object (`dyn ErasedHandler`):
//!
//! ```text
//! async fn hello(cx: RequestContext) -> Result<Response> { … }   ← user writes this
//!        ↓ compose(hello, …)  /  router.get("/", hello)
//! hello.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                        ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(cx)  at request time                 ← one vtable dispatch
//! ```
//!
//! The runtime cost per invocation is one Arc clone plus one virtual call —
//! negligible next to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::Error;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to the pipeline's result.
///
/// `Pin<Box<…>>` because the runtime must poll the future in-place;
/// `Send + 'static` so tokio may move it across threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
/// External crates cannot usefully interact with it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, cx: RequestContext) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid terminal handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(cx: RequestContext) -> Result<impl IntoResponse>
/// ```
///
/// and for a composed [`Pipeline`](crate::Pipeline), which is how a
/// pipeline registers on the router like any handler.
///
/// The trait is **sealed** (via the crate-private `Sealed` supertrait):
/// only the impls in this crate can satisfy it, which keeps the API surface
/// stable across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. External crates cannot name `Sealed` and therefore
/// cannot implement `Handler` on their own types.
pub(crate) mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

/// Implement `Handler` for any function with the right signature:
/// named `async fn` items, `async` closures, any struct implementing `Fn`.
impl<F, Fut, R> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype holding a concrete handler `F`, bridging the typed world to the
/// trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, cx: RequestContext) -> BoxFuture {
        let fut = (self.0)(cx);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}
