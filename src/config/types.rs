use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for a publisher resolver
///
/// Every field has a documented default so an empty TOML file is a valid
/// configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Per-attempt transport timeout (milliseconds). No timeout when absent.
    pub timeout_ms: Option<u64>,

    /// Optional deadline for one whole resolution, across every candidate,
    /// retry and enrichment stage (milliseconds)
    pub deadline_ms: Option<u64>,

    /// Retry/backoff settings shared by every retried request
    pub backoff: BackoffConfig,

    /// Identity service environment
    pub environment: Environment,

    /// Identity service API version
    pub version: ApiVersion,

    /// Overrides the identity service base URL selected by environment/version
    pub identity_server: Option<String>,

    /// Debug mode: allows the built-in HTTP transport and dumps request params
    pub debug: bool,

    /// Logs every request and response on the wire
    pub verbose: bool,

    /// Path to a JSON ruleset; the built-in ruleset is used when absent
    pub ruleset: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            deadline_ms: None,
            backoff: BackoffConfig::default(),
            environment: Environment::default(),
            version: ApiVersion::default(),
            identity_server: None,
            debug: false,
            verbose: false,
            ruleset: None,
        }
    }
}

impl ResolverConfig {
    /// The per-attempt timeout as a Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Base URL of the identity service for this configuration
    pub fn identity_server(&self) -> &str {
        self.identity_server
            .as_deref()
            .unwrap_or_else(|| self.environment.identity_server(self.version))
    }
}

/// Backoff configuration for the retry controller
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackoffConfig {
    /// Name of the backoff algorithm (e.g. "binaryExponential")
    pub algorithm: String,

    /// Base delay in milliseconds, in [1, 30000]
    pub delay: u64,

    /// Maximum number of retries after the first attempt, in [0, 10]
    pub retries: u32,

    /// Initial attempt counter, in [0, retries - 1]
    pub tries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            algorithm: "binaryExponential".to_string(),
            delay: 5 * 1000,
            retries: 3,
            tries: 0,
        }
    }
}

/// Deployment environment of the identity service
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    #[default]
    Production,
}

impl Environment {
    /// Looks up the identity service base URL for a version
    pub fn identity_server(&self, version: ApiVersion) -> &'static str {
        match (self, version) {
            (Environment::Staging, ApiVersion::V2) => {
                "https://ledger-staging.mercury.basicattentiontoken.org"
            }
            (Environment::Production, ApiVersion::V2) => {
                "https://ledger.mercury.basicattentiontoken.org"
            }
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "unknown environment '{}', expected 'staging' or 'production'",
                other
            )),
        }
    }
}

/// Identity service API version
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V2,
}
