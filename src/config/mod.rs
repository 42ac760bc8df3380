//! Configuration module for the publisher resolver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Validation runs once, when a resolver is built, rather than at each call site.
//!
//! # Example
//!
//! ```no_run
//! use media_publisher::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("resolver.toml")).unwrap();
//! println!("Identity server: {}", config.identity_server());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiVersion, BackoffConfig, Environment, ResolverConfig};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_backoff, MAX_BACKOFF_DELAY_MS, MAX_RETRIES};
