//! Single-flight response cache
//!
//! `get_or_resolve` returns a stored response when one is fresh. On a miss,
//! exactly one computation runs per key at a time; concurrent callers for
//! the same key wait on that computation and receive its result, success or
//! failure. Only 2xx responses are persisted.
//!
//! The computation runs on its own task, so a client disconnecting does not
//! cancel it: the result is still stored and handed to any other waiters.
//! A panicking computation resolves to a 500 for every waiter and clears the
//! in-flight entry so the next request starts over.

pub mod store;

use axum::body::{Body, Bytes};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub use store::{DiskStore, StoreError};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// A complete HTTP response as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN.to_string(),
            body: Bytes::from(body.into()),
        }
    }

    pub fn json<T: serde::Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: APPLICATION_JSON.to_string(),
                body: Bytes::from(body),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                Self::internal_error()
            }
        }
    }

    pub fn internal_error() -> Self {
        Self::text(500, "Internal server error")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, self.content_type)],
            Body::from(self.body),
        )
            .into_response()
    }
}

type InFlight = Shared<BoxFuture<'static, CachedResponse>>;

struct Inner {
    store: DiskStore,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

/// Response cache shared across handlers
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Inner>,
}

impl ResponseCache {
    pub fn new(store: DiskStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Cached response for `key`, or the result of `compute`
    ///
    /// `compute` runs at most once across all concurrent callers of `key`.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> CachedResponse
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CachedResponse> + Send + 'static,
    {
        if let Some(hit) = self.lookup(key).await {
            tracing::debug!(key, "Cache hit");
            return hit;
        }

        let pending = {
            let mut in_flight = self.inner.in_flight.lock().await;
            match in_flight.get(key).cloned() {
                Some(pending) => {
                    tracing::debug!(key, "Joining in-flight computation");
                    pending
                }
                None => {
                    tracing::debug!(key, "Cache miss");
                    let pending = self.start(key.to_string(), ttl, compute);
                    in_flight.insert(key.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Number of keys currently being computed
    pub async fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().await.len()
    }

    /// Spawn the computation for `key`; the caller registers it while holding the lock
    ///
    /// No store I/O happens under the registry lock. The spawned task re-reads
    /// the store first, since an earlier computation may have finished between
    /// the caller's miss and its registration.
    fn start<F, Fut>(&self, key: String, ttl: Duration, compute: F) -> InFlight
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CachedResponse> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let response = match inner.lookup(&key).await {
                Some(hit) => hit,
                None => inner.compute_and_store(&key, ttl, compute).await,
            };

            inner.in_flight.lock().await.remove(&key);
            response
        });

        async move {
            match task.await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Response computation task failed");
                    CachedResponse::internal_error()
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn lookup(&self, key: &str) -> Option<CachedResponse> {
        self.inner.lookup(key).await
    }
}

impl Inner {
    async fn lookup(&self, key: &str) -> Option<CachedResponse> {
        match self.store.load(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, recomputing");
                None
            }
        }
    }

    async fn compute_and_store<F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> CachedResponse
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedResponse>,
    {
        let response = match AssertUnwindSafe(async move { compute().await })
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(_) => {
                tracing::error!(key, "Response computation panicked");
                CachedResponse::internal_error()
            }
        };

        if response.is_success() {
            if let Err(e) = self.store.save(key, &response, ttl).await {
                tracing::warn!(key, error = %e, "Failed to store cache entry");
            }
        }
        response
    }
}
