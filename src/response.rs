//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] and return it. Middlewares receive one
//! back from their continuation and may transform it before handing it
//! outward — the accessor pair [`Response::headers_mut`] /
//! [`Response::status_code`] exists for exactly that.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use strata::{Response, StatusCode};
///
/// Response::json(r#"{"id":1}"#);
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use strata::{Response, StatusCode};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(r#"{"id":42}"#);
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    body: Bytes,
    headers: HeaderMap,
    status: StatusCode,
}

impl Response {
    /// `200 OK` — `application/json`.
    ///
    /// Takes bytes from your serialiser directly: `serde_json::to_vec`
    /// output, a `format!` literal, a static str — anything `Into<Bytes>`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::bytes_raw("application/json", body.into())
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw("text/plain; charset=utf-8", Bytes::from(body.into().into_bytes()))
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { body: Bytes::new(), headers: HeaderMap::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    fn bytes_raw(content_type: &'static str, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self { body, headers, status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not valid UTF-8 read
    /// as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut inner = http::Response::new(Full::new(self.body));
        *inner.status_mut() = self.status;
        *inner.headers_mut() = self.headers;
        inner
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`. Terminated by
/// a typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// # Panics
    ///
    /// Panics on an invalid header name or value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name: http::header::HeaderName =
            name.parse().unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid value for header `{name}`: {e}"));
        self.headers.insert(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish("application/json", body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", Bytes::from(body.into().into_bytes()))
    }

    /// Terminate with no body (e.g. `StatusCode::NO_CONTENT`).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(mut self, content_type: &'static str, body: Bytes) -> Response {
        // An explicit header() call wins over the terminator's content type.
        self.headers
            .entry(CONTENT_TYPE)
            .or_insert_with(|| HeaderValue::from_static(content_type));
        Response { body, headers: self.headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers:
///
/// ```rust,ignore
/// struct Json<T: Serialize>(T);
///
/// impl<T: Serialize> IntoResponse for Json<T> {
///     fn into_response(self) -> Response {
///         match serde_json::to_vec(&self.0) {
///             Ok(bytes) => Response::json(bytes),
///             Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
///         }
///     }
/// }
/// ```
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`StatusCode`] directly from a handler: `Ok(StatusCode::NOT_FOUND)`.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}
