//! Bounded retry controller
//!
//! Wraps the [`Executor`] and retries server-side faults with backoff.
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | 2xx, decoded | Return immediately |
//! | HTTP 5xx | Retry while budget remains |
//! | Connection error / timeout | Retry while budget remains |
//! | HTTP 4xx, 3xx | Return immediately |
//! | Decode error | Return immediately |
//!
//! A call makes at most `retries + 1` transport attempts.

use crate::config::{validate_backoff, BackoffConfig};
use crate::fetch::backoff::{strategy_by_name, BackoffStrategy};
use crate::fetch::executor::Executor;
use crate::fetch::request::{Fetched, RequestParams};
use crate::{ConfigError, ResolveError};
use std::sync::Arc;
use std::time::Duration;

/// Mutable retry bookkeeping for one logical call
#[derive(Debug)]
pub struct RetryState {
    strategy: Arc<dyn BackoffStrategy>,
    base_delay: Duration,
    retries_left: u32,
    attempts: u32,
}

impl RetryState {
    /// Validates the backoff configuration and starts a fresh state
    pub fn start(
        backoff: &BackoffConfig,
        injected: Option<Arc<dyn BackoffStrategy>>,
    ) -> Result<Self, ConfigError> {
        validate_backoff(backoff, injected.is_some())?;

        let strategy = match injected {
            Some(strategy) => strategy,
            None => strategy_by_name(&backoff.algorithm)
                .ok_or_else(|| ConfigError::UnknownAlgorithm(backoff.algorithm.clone()))?,
        };

        Ok(Self {
            strategy,
            base_delay: Duration::from_millis(backoff.delay),
            retries_left: backoff.retries,
            attempts: backoff.tries,
        })
    }

    /// Whether another retry is allowed
    pub fn has_budget(&self) -> bool {
        self.retries_left > 0
    }

    /// Consumes one retry and returns the delay to wait before it
    pub fn next_delay(&mut self) -> Duration {
        self.retries_left = self.retries_left.saturating_sub(1);
        self.attempts += 1;
        self.strategy.delay(self.base_delay, self.attempts)
    }

    /// Attempt counter, including the configured initial `tries`
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }
}

/// Retries server-side faults through an executor
#[derive(Clone)]
pub struct RetryController {
    executor: Executor,
    backoff: BackoffConfig,
    strategy: Option<Arc<dyn BackoffStrategy>>,
}

impl RetryController {
    pub fn new(executor: Executor, backoff: BackoffConfig) -> Self {
        Self {
            executor,
            backoff,
            strategy: None,
        }
    }

    /// Uses `strategy` instead of looking one up by algorithm name
    pub fn with_strategy(mut self, strategy: Arc<dyn BackoffStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Fetches `params`, retrying server-side faults
    ///
    /// An invalid backoff configuration fails with `ResolveError::Config`
    /// before any request is made.
    pub async fn fetch(&self, params: &RequestParams) -> Result<Fetched, ResolveError> {
        let mut state = match RetryState::start(&self.backoff, self.strategy.clone()) {
            Ok(state) => state,
            Err(e) => {
                // Never complete within the caller's own poll
                tokio::task::yield_now().await;
                return Err(e.into());
            }
        };

        loop {
            match self.executor.execute(params).await {
                Err(err) if err.is_server_fault() && state.has_budget() => {
                    let delay = state.next_delay();
                    tracing::debug!(
                        "Retrying {} in {:?} (attempt {}, {} retries left): {}",
                        params.url(),
                        delay,
                        state.attempts(),
                        state.retries_left(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}
