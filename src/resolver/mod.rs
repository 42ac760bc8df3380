//! Provider resolvers
//!
//! A resolver turns a provider's discovery payload into a [`PublisherInfo`]
//! draft, possibly after fetching more pages. Resolvers are registered by
//! provider name in a [`ResolverRegistry`]; an unknown name is a typed error.

mod scrape;
mod youtube;

pub use scrape::{HtmlMetadataScraper, MetadataScraper, PageMetadata};
pub use youtube::YouTubeResolver;

use crate::fetch::Fetcher;
use crate::ruleset::ProviderRule;
use crate::ResolveError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Publisher record built up across the pipeline stages
///
/// Owned by a single in-flight resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherInfo {
    /// Publisher identifier, e.g. `youtube#channel:UC...`
    pub publisher: String,

    #[serde(rename = "publisherURL")]
    pub publisher_url: String,

    #[serde(rename = "faviconName")]
    pub favicon_name: Option<String>,

    /// Favicon location; a `data:` URL once normalized
    #[serde(rename = "faviconURL")]
    pub favicon_url: Option<String>,

    #[serde(rename = "providerName")]
    pub provider_name: String,

    /// Properties reported by the identity service, when the lookup succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

/// What a resolver gets to work with for one candidate
pub struct ResolveContext<'a> {
    /// The rule that produced the discovery payload
    pub rule: &'a ProviderRule,

    /// The media URL being resolved
    pub media_url: &'a str,

    /// Shared fetcher (retry controller + response cache)
    pub fetcher: &'a Fetcher,

    /// Per-attempt transport timeout
    pub timeout: Option<Duration>,
}

/// Converts a discovery payload into a publisher draft
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        discovery: &Value,
    ) -> Result<PublisherInfo, ResolveError>;
}

/// Resolvers keyed by provider name
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in resolvers, scraping with `scraper`
    pub fn with_defaults(scraper: Arc<dyn MetadataScraper>) -> Self {
        let mut registry = Self::new();
        registry.register("YouTube", Arc::new(YouTubeResolver::new(scraper)));
        registry
    }

    /// Registers (or replaces) the resolver for `provider_name`
    pub fn register(&mut self, provider_name: impl Into<String>, resolver: Arc<dyn Resolver>) {
        self.resolvers.insert(provider_name.into(), resolver);
    }

    /// Looks up the resolver for `provider_name`
    pub fn get(&self, provider_name: &str) -> Result<Arc<dyn Resolver>, ResolveError> {
        self.resolvers
            .get(provider_name)
            .cloned()
            .ok_or_else(|| ResolveError::NoResolver {
                provider: provider_name.to_string(),
            })
    }

    pub fn contains(&self, provider_name: &str) -> bool {
        self.resolvers.contains_key(provider_name)
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
