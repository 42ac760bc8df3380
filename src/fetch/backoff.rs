//! Backoff strategies for the retry controller
//!
//! A strategy is a pure function of the base delay and the attempt number.
//! Attempt numbers start at 1 for the first retry (plus the configured
//! initial `tries`).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Computes the delay to wait before a retry
pub trait BackoffStrategy: Send + Sync + fmt::Debug {
    fn delay(&self, base: Duration, attempt: u32) -> Duration;
}

/// Doubles the delay on each attempt: `base * 2^(attempt - 1)`
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryExponential;

impl BackoffStrategy for BinaryExponential {
    fn delay(&self, base: Duration, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        base.saturating_mul(factor)
    }
}

/// Grows the delay linearly: `base * attempt`
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl BackoffStrategy for Linear {
    fn delay(&self, base: Duration, attempt: u32) -> Duration {
        base.saturating_mul(attempt.max(1))
    }
}

/// Waits the base delay every time
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed;

impl BackoffStrategy for Fixed {
    fn delay(&self, base: Duration, _attempt: u32) -> Duration {
        base
    }
}

/// Follows the Fibonacci sequence: `base * fib(attempt)` with fib(1) = fib(2) = 1
#[derive(Debug, Clone, Copy, Default)]
pub struct Fibonacci;

impl BackoffStrategy for Fibonacci {
    fn delay(&self, base: Duration, attempt: u32) -> Duration {
        let (mut previous, mut current) = (0u32, 1u32);
        for _ in 1..attempt.max(1) {
            let next = previous.saturating_add(current);
            previous = current;
            current = next;
        }
        base.saturating_mul(current)
    }
}

/// Looks up a strategy by its configuration name
///
/// # Example
///
/// ```
/// use media_publisher::fetch::strategy_by_name;
/// use std::time::Duration;
///
/// let strategy = strategy_by_name("binaryExponential").unwrap();
/// assert_eq!(strategy.delay(Duration::from_millis(100), 3), Duration::from_millis(400));
/// assert!(strategy_by_name("nope").is_none());
/// ```
pub fn strategy_by_name(name: &str) -> Option<Arc<dyn BackoffStrategy>> {
    match name {
        "binaryExponential" | "exponential" => Some(Arc::new(BinaryExponential)),
        "linear" => Some(Arc::new(Linear)),
        "fixed" | "constant" => Some(Arc::new(Fixed)),
        "fibonacci" => Some(Arc::new(Fibonacci)),
        _ => None,
    }
}
