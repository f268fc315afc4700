//! The composer: middleware contract, continuation, and pipeline assembly.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::response::Response;

// ── Middleware contract ───────────────────────────────────────────────────────

/// One pluggable step in a request pipeline.
///
/// A middleware receives the [`RequestContext`] and a [`Next`] continuation
/// representing everything after it in the chain. It decides whether to run
/// the continuation — zero times to short-circuit, once to proceed — may
/// hand it a replaced context, and may transform the response on the way
/// back out.
///
/// Any `Fn(RequestContext, Next) -> impl Future<Output = Result<Response>>`
/// closure is a middleware, so one-off layers need no named type:
///
/// ```rust
/// use strata::{Next, RequestContext, Response, Result};
///
/// async fn stamp(cx: RequestContext, next: Next) -> Result<Response> {
///     let mut response = next.run(cx).await?;
///     response.headers_mut().insert("x-stamped", "1".parse().unwrap());
///     Ok(response)
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error>;
}

#[async_trait]
impl<F, Fut> Middleware for F
where
    F: Fn(RequestContext, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        (self)(cx, next).await
    }
}

// ── Continuation ──────────────────────────────────────────────────────────────

/// The remaining pipeline, handed to one middleware as a capability.
///
/// [`run`](Next::run) consumes the value and `Next` is not `Clone`: a
/// middleware can invoke its continuation at most once, and the compiler
/// enforces it. Not calling `run` at all is the short-circuit path — the
/// terminal handler and every layer further in are never invoked, and none
/// of their post-continuation logic runs.
pub struct Next {
    chain: Arc<dyn Chain>,
}

impl Next {
    /// Runs everything after the current middleware and resolves to its
    /// response.
    pub async fn run(self, cx: RequestContext) -> Result<Response, Error> {
        self.chain.call(cx).await
    }

    /// A continuation that runs `handler` directly — the terminal case.
    ///
    /// This is how a single middleware is exercised without composing a
    /// pipeline around it:
    ///
    /// ```rust
    /// # use strata::{Middleware, Next, RequestContext, Request, Response, Result};
    /// # async fn example(middleware: impl Middleware) -> Result<Response> {
    /// async fn stub(_cx: RequestContext) -> Result<Response> {
    ///     Ok(Response::text("ok"))
    /// }
    ///
    /// let cx = RequestContext::new(Request::builder().finish());
    /// middleware.handle(cx, Next::terminal(stub)).await
    /// # }
    /// ```
    pub fn terminal(handler: impl Handler) -> Self {
        Self { chain: Arc::new(Terminal(handler.into_boxed_handler())) }
    }
}

// ── Chain nodes ───────────────────────────────────────────────────────────────

/// An erased node of a composed chain: either one middleware layered over
/// the rest, or the terminal handler.
trait Chain: Send + Sync {
    fn call(&self, cx: RequestContext) -> BoxFuture;
}

struct Terminal(BoxedHandler);

impl Chain for Terminal {
    fn call(&self, cx: RequestContext) -> BoxFuture {
        self.0.call(cx)
    }
}

struct Layer {
    middleware: Arc<dyn Middleware>,
    inner: Arc<dyn Chain>,
}

impl Chain for Layer {
    fn call(&self, cx: RequestContext) -> BoxFuture {
        let middleware = Arc::clone(&self.middleware);
        let next = Next { chain: Arc::clone(&self.inner) };
        Box::pin(async move { middleware.handle(cx, next).await })
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// The fully composed, callable request-handling chain.
///
/// Same call signature as a terminal handler: takes a [`RequestContext`],
/// resolves to a response. Cloning is an Arc bump; invocations are
/// independent — the pipeline itself holds no per-call state, so one
/// pipeline serves any number of concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    head: Arc<dyn Chain>,
}

impl Pipeline {
    pub async fn call(&self, cx: RequestContext) -> Result<Response, Error> {
        self.head.call(cx).await
    }
}

// A composed pipeline registers on the router like any handler.
impl private::Sealed for Pipeline {}

impl Handler for Pipeline {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(PipelineHandler(self))
    }
}

struct PipelineHandler(Pipeline);

impl ErasedHandler for PipelineHandler {
    fn call(&self, cx: RequestContext) -> BoxFuture {
        self.0.head.call(cx)
    }
}

// ── Composer ──────────────────────────────────────────────────────────────────

/// Builds a [`Pipeline`] from a terminal handler and an ordered middleware
/// list.
///
/// The list is folded from last to first, each step wrapping the chain
/// built so far, so the first middleware listed becomes the outermost
/// layer: first to see the request, last to see the response, strict onion
/// discipline with LIFO unwind. An empty list degenerates to the terminal
/// handler alone.
///
/// Construction is pure — no registration side effects, no shared per-call
/// state inside the composed value.
///
/// ```rust
/// use std::sync::Arc;
/// use strata::{ErrorMiddleware, RequestContext, Response, Result, TraceMiddleware, compose};
///
/// async fn hello(_cx: RequestContext) -> Result<Response> {
///     Ok(Response::text("hello"))
/// }
///
/// // ErrorMiddleware is outermost and therefore covers TraceMiddleware too.
/// let pipeline = compose(hello, vec![Arc::new(ErrorMiddleware), Arc::new(TraceMiddleware)]);
/// ```
pub fn compose(handler: impl Handler, middlewares: Vec<Arc<dyn Middleware>>) -> Pipeline {
    let mut head: Arc<dyn Chain> = Arc::new(Terminal(handler.into_boxed_handler()));
    for middleware in middlewares.into_iter().rev() {
        head = Arc::new(Layer { middleware, inner: head });
    }
    Pipeline { head }
}
