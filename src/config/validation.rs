use crate::config::types::{BackoffConfig, ResolverConfig};
use crate::fetch::strategy_by_name;
use crate::ConfigError;
use url::Url;

/// Largest accepted backoff base delay (milliseconds)
pub const MAX_BACKOFF_DELAY_MS: u64 = 30 * 1000;

/// Largest accepted retry count
pub const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
///
/// `strategy_injected` is true when the caller supplies a backoff strategy
/// directly, in which case the algorithm name is not looked up.
pub fn validate(config: &ResolverConfig, strategy_injected: bool) -> Result<(), ConfigError> {
    validate_backoff(&config.backoff, strategy_injected)?;
    validate_timeouts(config)?;

    if let Some(server) = &config.identity_server {
        Url::parse(server).map_err(|e| {
            ConfigError::Validation(format!("Invalid identity_server '{}': {}", server, e))
        })?;
    }

    Ok(())
}

/// Validates backoff configuration
///
/// # Rules
///
/// | Field | Range |
/// |-------|-------|
/// | `delay` | 1 ..= 30000 ms |
/// | `retries` | 0 ..= 10 |
/// | `tries` | 0 ..= retries - 1 (0 when retries is 0) |
/// | `algorithm` | a known strategy name, unless one is injected |
pub fn validate_backoff(
    backoff: &BackoffConfig,
    strategy_injected: bool,
) -> Result<(), ConfigError> {
    if backoff.delay < 1 || backoff.delay > MAX_BACKOFF_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "invalid backoff delay: must be between 1 and {}ms, got {}ms",
            MAX_BACKOFF_DELAY_MS, backoff.delay
        )));
    }

    if backoff.retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "invalid backoff retries: must be between 0 and {}, got {}",
            MAX_RETRIES, backoff.retries
        )));
    }

    let max_tries = backoff.retries.saturating_sub(1);
    if backoff.tries > max_tries {
        return Err(ConfigError::Validation(format!(
            "invalid backoff tries: must be between 0 and {}, got {}",
            max_tries, backoff.tries
        )));
    }

    if !strategy_injected && strategy_by_name(&backoff.algorithm).is_none() {
        return Err(ConfigError::UnknownAlgorithm(backoff.algorithm.clone()));
    }

    Ok(())
}

fn validate_timeouts(config: &ResolverConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_ms must be >= 1ms".to_string(),
        ));
    }

    if config.deadline_ms == Some(0) {
        return Err(ConfigError::Validation(
            "deadline_ms must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}
