//! HTTP fetching layers
//!
//! This module contains the resilient request pipeline:
//! - [`Executor`]: one transport attempt with strict success/error classification
//! - [`RetryController`]: bounded retries of server-side faults with backoff
//! - [`Fetcher::fetch_cached`]: the response cache in front of the retry controller
//!
//! Call sites pick the layer they need: discovery and identity lookups are
//! retried but never cached; author pages and favicons go through the cache.

mod backoff;
mod executor;
mod request;
mod retry;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use backoff::{strategy_by_name, BackoffStrategy, BinaryExponential, Fibonacci, Fixed, Linear};
pub use executor::{classify, Executor, WireTrace, WIRE_TARGET};
pub use request::{Fetched, Payload, RequestParams, ResponseMeta};
pub use retry::{RetryController, RetryState};
pub use transport::{build_http_client, HttpTransport, RawResponse, Transport, USER_AGENT};

use crate::cache::{cache_ttl, ResponseCache};
use crate::ResolveError;
use chrono::Utc;
use std::sync::Arc;

/// Retrying, optionally caching fetcher shared by every pipeline stage
#[derive(Clone)]
pub struct Fetcher {
    retry: RetryController,
    cache: Arc<ResponseCache>,
}

impl Fetcher {
    pub fn new(retry: RetryController, cache: Arc<ResponseCache>) -> Self {
        Self { retry, cache }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Fetches through the retry controller, bypassing the cache
    pub async fn fetch(&self, params: &RequestParams) -> Result<Fetched, ResolveError> {
        self.retry.fetch(params).await
    }

    /// Fetches through the response cache
    ///
    /// A live entry is returned without touching the transport (and with no
    /// response metadata). On a miss the request goes through the retry
    /// controller and a successful response is stored for the TTL its
    /// headers allow.
    pub async fn fetch_cached(&self, params: &RequestParams) -> Result<Fetched, ResolveError> {
        let key = params.cache_key();

        if let Some(payload) = self.cache.get(&key).await {
            tracing::debug!("Cache hit for {}", key);
            // Never complete within the caller's own poll
            tokio::task::yield_now().await;
            return Ok(Fetched {
                meta: None,
                payload,
            });
        }

        tracing::debug!("Cache miss for {}", key);
        let fetched = self.retry.fetch(params).await?;

        if let Some(meta) = &fetched.meta {
            match cache_ttl(&meta.headers, Utc::now()) {
                Some(ttl) => {
                    tracing::debug!("Caching {} for {:?}", key, ttl);
                    self.cache.insert(key, fetched.payload.clone(), ttl).await;
                }
                None => tracing::debug!("Response for {} is not cacheable", key),
            }
        }

        Ok(fetched)
    }
}
