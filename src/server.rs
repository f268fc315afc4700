//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Set `terminationGracePeriodSeconds` longer than your slowest request.

use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::context::RequestContext;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared across concurrent connection tasks without copying the
        // routing table.
        let router = Arc::new(router);

        info!(addr = %self.addr, "strata listening");

        // JoinSet tracks every spawned connection task so graceful shutdown
        // can wait for them all.
        let mut tasks = tokio::task::JoinSet::new();

        // Futures must not move in memory after the first poll; `tokio::pin!`
        // pins the shutdown future on the stack so the loop can re-poll it.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a SIGTERM stops the
                // accept loop even when more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    // TokioIo adapts tokio's AsyncRead/AsyncWrite to hyper's
                    // IO traits.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection, not once
                        // per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, remote_addr).await }
                        });

                        // `auto::Builder` handles both HTTP/1.1 and HTTP/2 —
                        // whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: every in-flight connection finishes before we return.
        while tasks.join_next().await.is_some() {}

        info!("strata stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: routes one request and produces one response.
///
/// The error type is [`Infallible`](std::convert::Infallible) — every
/// failure becomes a response here, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<bytes::Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    // The whole body is collected up front; handlers and middleware see
    // bytes, not a stream.
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(peer = %remote_addr, "body read failed: {e}");
            return Ok(Response::status(http::StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let response = match router.lookup(&method, &path) {
        Some((handler, params)) => {
            let cx = RequestContext::new(Request::from_parts(parts, body)).with_params(params);
            match handler.call(cx).await {
                Ok(response) => response,
                // A failure no error-trapping layer converted. The transport
                // boundary answers a bare 500; the fixed-shape body belongs
                // to the error middleware, not to us.
                Err(e) => {
                    error!("unhandled pipeline failure: {e}");
                    Response::status(http::StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        None => Response::status(http::StatusCode::NOT_FOUND),
    };

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by the Kubernetes
/// control plane) and **SIGINT** (Ctrl-C, for local dev). On Windows only
/// Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
