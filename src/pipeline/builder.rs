//! Assembles a [`PublisherResolver`] from configuration and injected parts

use crate::cache::ResponseCache;
use crate::config::{validate, ResolverConfig};
use crate::fetch::{
    BackoffStrategy, Executor, Fetcher, HttpTransport, RetryController, Transport, WireTrace,
};
use crate::pipeline::PublisherResolver;
use crate::resolver::{HtmlMetadataScraper, MetadataScraper, ResolverRegistry};
use crate::ruleset::Ruleset;
use crate::{ConfigError, ConfigResult};
use std::sync::Arc;

/// Builder for [`PublisherResolver`]
///
/// Configuration is validated once, in [`build`](Self::build). A transport
/// must be supplied unless `debug` is set, in which case the real HTTP
/// transport is used.
pub struct PublisherResolverBuilder {
    config: ResolverConfig,
    ruleset: Option<Ruleset>,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<ResponseCache>>,
    strategy: Option<Arc<dyn BackoffStrategy>>,
    registry: Option<ResolverRegistry>,
    scraper: Option<Arc<dyn MetadataScraper>>,
}

impl PublisherResolver {
    pub fn builder(config: ResolverConfig) -> PublisherResolverBuilder {
        PublisherResolverBuilder::new(config)
    }
}

impl PublisherResolverBuilder {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            ruleset: None,
            transport: None,
            cache: None,
            strategy: None,
            registry: None,
            scraper: None,
        }
    }

    /// Uses this ruleset instead of the configured or built-in one
    pub fn ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = Some(ruleset);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Shares a response cache between resolvers
    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Injects a backoff strategy; the configured algorithm name is then ignored
    pub fn strategy(mut self, strategy: Arc<dyn BackoffStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Replaces the default resolver registry
    pub fn registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Scraper used by the default registry's resolvers
    pub fn scraper(mut self, scraper: Arc<dyn MetadataScraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    /// Validates the configuration and wires up the fetch layers
    ///
    /// # Returns
    ///
    /// * `Ok(PublisherResolver)` - ready to resolve
    /// * `Err(ConfigError)` - invalid configuration, an unloadable ruleset,
    ///   or no transport outside debug mode
    pub fn build(self) -> ConfigResult<PublisherResolver> {
        validate(&self.config, self.strategy.is_some())?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None if self.config.debug => {
                tracing::debug!("No transport supplied, using the HTTP transport");
                let http = HttpTransport::new().map_err(|e| {
                    ConfigError::Validation(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(http)
            }
            None => return Err(ConfigError::MissingTransport),
        };

        let ruleset = match (self.ruleset, &self.config.ruleset) {
            (Some(ruleset), _) => ruleset,
            (None, Some(path)) => Ruleset::load(path)?,
            (None, None) => Ruleset::builtin()?,
        };

        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let scraper: Arc<dyn MetadataScraper> = match self.scraper {
                    Some(scraper) => scraper,
                    None => Arc::new(HtmlMetadataScraper),
                };
                ResolverRegistry::with_defaults(scraper)
            }
        };

        let trace = WireTrace {
            debug: self.config.debug,
            verbose: self.config.verbose,
        };
        let mut retry = RetryController::new(
            Executor::new(transport, trace),
            self.config.backoff.clone(),
        );
        if let Some(strategy) = self.strategy {
            retry = retry.with_strategy(strategy);
        }

        let cache = self.cache.unwrap_or_default();

        tracing::debug!(
            "Resolver ready: {} rule(s), {} resolver(s), environment {}",
            ruleset.len(),
            registry.len(),
            self.config.environment
        );

        Ok(PublisherResolver {
            config: self.config,
            ruleset,
            registry,
            fetcher: Fetcher::new(retry, cache),
        })
    }
}
