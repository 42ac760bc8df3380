//! Media-Publisher: resolves the publisher identity behind a piece of media
//!
//! Given a media URL (currently videos on recognized providers) this crate walks
//! the providers that claim the URL, asks each one's discovery endpoint about the
//! media, and hands the answer to a provider-specific resolver. The winning record
//! is then decorated with a normalized 32x32 favicon and the publisher properties
//! known to the identity service.
//!
//! All HTTP traffic goes through three layers: a single-attempt executor, a
//! bounded retry controller and a TTL response cache.

pub mod cache;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod pipeline;
pub mod resolver;
pub mod ruleset;

use thiserror::Error;

/// Main error type for publisher resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP response {code} from {url}")]
    HttpStatus { url: String, code: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("No resolver for {provider}")]
    NoResolver { provider: String },

    #[error("Invalid author_url: {url}")]
    InvalidAuthorUrl { url: String },

    #[error("Failed to scrape {url}: {message}")]
    Scrape { url: String, message: String },

    #[error("Failed to normalize favicon {url}: {message}")]
    Image { url: String, message: String },

    #[error("No publisher found for {media_url}")]
    NotFound { media_url: String },

    #[error("Resolution of {media_url} exceeded its {deadline_ms}ms deadline")]
    Deadline { media_url: String, deadline_ms: u64 },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl ResolveError {
    /// Returns true for faults on the server side of the wire: a 5xx status or a
    /// transport-level failure (connection error, timeout)
    ///
    /// This is the only class of error the retry controller retries.
    pub fn is_server_fault(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { code, .. } => code / 100 == 5,
            _ => false,
        }
    }

    /// The HTTP status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse ruleset: {0}")]
    Ruleset(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid backoff algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid scheme pattern: {0}")]
    InvalidPattern(String),

    #[error("A transport must be supplied unless debug mode is enabled")]
    MissingTransport,
}

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::ResponseCache;
pub use config::{ApiVersion, BackoffConfig, Environment, ResolverConfig};
pub use fetch::{HttpTransport, Payload, RequestParams, Transport};
pub use pipeline::{
    resolve_publisher, shared_cache, PublisherResolver, PublisherResolverBuilder,
};
pub use resolver::{PublisherInfo, Resolver, ResolverRegistry};
pub use ruleset::{ProviderRule, Ruleset};
