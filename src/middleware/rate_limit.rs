//! Fixed-window rate limiting over an injectable store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use http::StatusCode;
use serde_json::json;
use tracing::warn;

use crate::context::RequestContext;
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::response::Response;

// ── Store contract ────────────────────────────────────────────────────────────

/// One client's standing within its current window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_reset_at: Instant,
}

/// Storage contract for rate-limit records.
///
/// The store is injected into [`RateLimitMiddleware`], so tests run on
/// isolated instances and deployments can choose their own backing store.
/// `compare_and_swap` is part of the contract for backends that want the
/// check-increment sequence atomic; the built-in middleware deliberately
/// does not use it — see the concurrency note on [`RateLimitMiddleware`].
pub trait RateLimitStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<RateLimitRecord>;

    fn set(&self, key: &str, record: RateLimitRecord);

    /// Writes `new` only if the stored record still equals `current`
    /// (`None` meaning "no record"). Returns whether the write happened.
    fn compare_and_swap(
        &self,
        key: &str,
        current: Option<RateLimitRecord>,
        new: RateLimitRecord,
    ) -> bool;

    /// Drops records whose window has elapsed. Default: keep everything.
    fn sweep(&self, _now: Instant) {}
}

/// In-process store over a sharded concurrent map.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, RateLimitRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn get(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.get(key).map(|record| *record)
    }

    fn set(&self, key: &str, record: RateLimitRecord) {
        self.records.insert(key.to_owned(), record);
    }

    fn compare_and_swap(
        &self,
        key: &str,
        current: Option<RateLimitRecord>,
        new: RateLimitRecord,
    ) -> bool {
        match self.records.entry(key.to_owned()) {
            Entry::Occupied(mut entry) => {
                if current == Some(*entry.get()) {
                    entry.insert(new);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                if current.is_none() {
                    entry.insert(new);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn sweep(&self, now: Instant) {
        self.records.retain(|_, record| now < record.window_reset_at);
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// Fixed window counter keyed by forwarded client address.
///
/// The key is the first comma-separated element of the `x-forwarded-for`
/// header; header-less clients all share the `"unknown"` bucket — a known
/// coarseness of this policy.
///
/// Per request: no record for the key, or the window has elapsed → a fresh
/// record with `count = 1` and the request passes. Below the threshold →
/// increment and pass. At the threshold → short-circuit with
/// `429 {"error": "Too many requests"}` and no further increment, so the
/// count plateaus at the limit instead of growing without bound.
///
/// # Concurrency
///
/// The per-request check-increment-write is not atomic: two concurrent
/// requests from one key may read the same count and both pass. The window
/// is an approximation, a documented limitation rather than a guarantee.
pub struct RateLimitMiddleware {
    limit: u32,
    window: Duration,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimitMiddleware {
    /// `limit` requests per `window`, tracked in a fresh [`MemoryStore`].
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_store(limit, window, Arc::new(MemoryStore::new()))
    }

    /// The same policy over a caller-supplied store.
    pub fn with_store(limit: u32, window: Duration, store: Arc<dyn RateLimitStore>) -> Self {
        Self { limit, window, store }
    }

    fn client_key(cx: &RequestContext) -> String {
        cx.request()
            .header("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next())
            .map(|ip| ip.trim().to_owned())
            .unwrap_or_else(|| "unknown".to_owned())
    }

    fn reject() -> Response {
        Response::builder()
            .status(StatusCode::TOO_MANY_REQUESTS)
            .json(json!({ "error": "Too many requests" }).to_string().into_bytes())
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    async fn handle(&self, cx: RequestContext, next: Next) -> Result<Response, Error> {
        let key = Self::client_key(&cx);
        let now = Instant::now();

        match self.store.get(&key) {
            Some(record) if now < record.window_reset_at => {
                if record.count >= self.limit {
                    warn!(client = %key, limit = self.limit, "rate limit exceeded");
                    return Ok(Self::reject());
                }
                self.store
                    .set(&key, RateLimitRecord { count: record.count + 1, ..record });
            }
            record => {
                // First sighting of a key is the moment to drop stale
                // records; growth stays bounded by keys active within one
                // window.
                if record.is_none() {
                    self.store.sweep(now);
                }
                self.store
                    .set(&key, RateLimitRecord { count: 1, window_reset_at: now + self.window });
            }
        }

        next.run(cx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_window(count: u32) -> RateLimitRecord {
        RateLimitRecord { count, window_reset_at: Instant::now() + Duration::from_secs(60) }
    }

    #[test]
    fn memory_store_round_trips_records() {
        let store = MemoryStore::new();
        assert_eq!(store.get("10.0.0.1"), None);

        let record = in_window(3);
        store.set("10.0.0.1", record);
        assert_eq!(store.get("10.0.0.1"), Some(record));
        assert_eq!(store.get("10.0.0.2"), None);
    }

    #[test]
    fn compare_and_swap_honors_the_expected_value() {
        let store = MemoryStore::new();
        let first = in_window(1);

        assert!(store.compare_and_swap("k", None, first));
        // Stale expectation: a record exists now.
        assert!(!store.compare_and_swap("k", None, first));

        let second = RateLimitRecord { count: 2, ..first };
        assert!(store.compare_and_swap("k", Some(first), second));
        assert_eq!(store.get("k"), Some(second));

        // `first` is no longer the stored value.
        assert!(!store.compare_and_swap("k", Some(first), second));
    }

    #[test]
    fn sweep_drops_elapsed_windows() {
        let store = MemoryStore::new();
        let now = Instant::now();
        store.set("live", RateLimitRecord { count: 1, window_reset_at: now + Duration::from_secs(60) });
        store.set("stale", RateLimitRecord { count: 3, window_reset_at: now });

        store.sweep(now);
        assert!(store.get("live").is_some());
        assert!(store.get("stale").is_none());
    }
}
