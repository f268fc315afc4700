//! Unified error type.

use std::fmt;

use crate::response::Response;

/// The error type threaded through strata's fallible operations.
///
/// Two failure domains share this type:
///
/// - [`Error::Io`] — infrastructure failures: binding a port, accepting a
///   connection. Surfaced by [`Server::serve`](crate::Server::serve).
/// - [`Error::Handler`] — a failure raised inside the request pipeline by a
///   handler or a middleware. It propagates outward through the pipeline
///   via `?` until an error-trapping layer converts it into a response, or
///   it reaches the transport layer.
///
/// Policy rejections (401, 429, ...) are not errors. They are ordinary
/// [`Response`] values produced by declining to call the continuation.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps any error value as a pipeline failure.
    ///
    /// Accepts whatever `Box<dyn Error>` accepts, including plain strings:
    ///
    /// ```rust
    /// use strata::Error;
    ///
    /// Error::handler("upstream returned garbage");
    /// ```
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(err.into())
    }

    /// The failure's message text, as echoed by the error-trapping middleware.
    pub fn message(&self) -> String {
        match self {
            Self::Io(e) => e.to_string(),
            Self::Handler(e) => e.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Handler(e) => write!(f, "handler: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Handler(e) => Some(&**e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Crate-wide result alias. Handlers and middleware return `Result<Response>`.
pub type Result<T = Response, E = Error> = std::result::Result<T, E>;
