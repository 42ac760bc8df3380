use crate::config::types::ResolverConfig;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(ResolverConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use media_publisher::config::load_config;
///
/// let config = load_config(Path::new("resolver.toml")).unwrap();
/// println!("Retries: {}", config.backoff.retries);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<ResolverConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<ResolverConfig> {
    let config: ResolverConfig = toml::from_str(content)?;

    validate(&config, false)?;

    Ok(config)
}
