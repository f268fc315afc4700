//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request, decoupled from the transport that produced it.
///
/// The server builds one per request from the hyper connection, with the
/// whole body already collected. Tests and stub invocations build one with
/// [`Request::builder`] — no socket required.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, body }
    }

    /// Builder for hand-assembled requests. Defaults to `GET /` with no
    /// headers and an empty body.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not valid UTF-8 read
    /// as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`]. Obtain via [`Request::builder`].
#[derive(Default)]
pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// # Panics
    ///
    /// Panics if `uri` does not parse.
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.parse().unwrap_or_else(|e| panic!("invalid uri `{uri}`: {e}"));
        self
    }

    /// # Panics
    ///
    /// Panics on an invalid header name or value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name: http::header::HeaderName =
            name.parse().unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = http::header::HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid value for header `{name}`: {e}"));
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn finish(self) -> Request {
        Request { method: self.method, uri: self.uri, headers: self.headers, body: self.body }
    }
}
