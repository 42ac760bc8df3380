//! Resolution coordinator - walks the provider candidates for one media URL
//!
//! # State Machine
//!
//! ```text
//! trying(candidates, first_error)
//!   ├─ no candidates left      → exhausted(first_error or NotFound)
//!   ├─ no resolver for head    → trying(rest, first_error or NoResolver)
//!   ├─ discovery call fails    → trying(rest, first_error or error)
//!   ├─ resolver fails          → trying(rest, first_error or error)
//!   └─ resolver succeeds       → favicon → properties → success(info)
//! ```
//!
//! Candidates are tried strictly left to right and never revisited. The
//! first error recorded is the one reported when every candidate fails.

use crate::config::ResolverConfig;
use crate::enrich::{lookup_properties, normalize_favicon};
use crate::fetch::{Fetcher, RequestParams};
use crate::resolver::{PublisherInfo, ResolveContext, ResolverRegistry};
use crate::ruleset::{ProviderRule, Ruleset};
use crate::ResolveError;
use serde_json::Value;
use std::time::Duration;
use url::form_urlencoded;

/// Resolves media URLs to publisher records
///
/// Cheap to share: every resolution borrows it immutably, and the only
/// mutable state is the response cache inside the fetcher.
pub struct PublisherResolver {
    pub(crate) config: ResolverConfig,
    pub(crate) ruleset: Ruleset,
    pub(crate) registry: ResolverRegistry,
    pub(crate) fetcher: Fetcher,
}

impl PublisherResolver {
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Resolves the publisher of `media_url`
    ///
    /// # Returns
    ///
    /// * `Ok(PublisherInfo)` - a candidate resolved and the favicon was normalized
    /// * `Err(ResolveError)` - the first candidate error, `NotFound` when no
    ///   candidate matched, a favicon failure, or `Deadline` when configured
    ///
    /// # Example
    ///
    /// ```no_run
    /// use media_publisher::{HttpTransport, PublisherResolver, ResolverConfig};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let resolver = PublisherResolver::builder(ResolverConfig::default())
    ///     .transport(Arc::new(HttpTransport::new()?))
    ///     .build()?;
    ///
    /// let info = resolver.resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
    /// println!("{}", info.publisher);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve(&self, media_url: &str) -> Result<PublisherInfo, ResolveError> {
        let Some(deadline_ms) = self.config.deadline_ms else {
            return self.run(media_url).await;
        };

        match tokio::time::timeout(Duration::from_millis(deadline_ms), self.run(media_url)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ResolveError::Deadline {
                media_url: media_url.to_string(),
                deadline_ms,
            }),
        }
    }

    async fn run(&self, media_url: &str) -> Result<PublisherInfo, ResolveError> {
        let candidates = self.ruleset.candidates(media_url);
        tracing::debug!(
            "{} candidate provider(s) for {}",
            candidates.len(),
            media_url
        );

        let info = self.try_candidates(media_url, &candidates).await?;
        let info = normalize_favicon(&self.fetcher, info, self.config.timeout()).await?;
        let info = lookup_properties(
            &self.fetcher,
            info,
            self.config.identity_server(),
            self.config.timeout(),
        )
        .await;

        tracing::info!("Resolved {} to {}", media_url, info.publisher);
        Ok(info)
    }

    /// Walks the candidates in order, keeping the first error seen
    async fn try_candidates(
        &self,
        media_url: &str,
        candidates: &[&ProviderRule],
    ) -> Result<PublisherInfo, ResolveError> {
        let mut first_error: Option<ResolveError> = None;

        for rule in candidates {
            match self.try_candidate(rule, media_url).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    tracing::warn!("Provider {} failed for {}: {}", rule.provider_name, media_url, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        // Never complete within the caller's own poll
        tokio::task::yield_now().await;
        Err(first_error.unwrap_or_else(|| ResolveError::NotFound {
            media_url: media_url.to_string(),
        }))
    }

    async fn try_candidate(
        &self,
        rule: &ProviderRule,
        media_url: &str,
    ) -> Result<PublisherInfo, ResolveError> {
        let resolver = self.registry.get(&rule.provider_name)?;

        let params = discovery_request(rule, media_url)?.with_timeout(self.config.timeout());
        let discovery = self.fetcher.fetch(&params).await?;
        let payload = discovery.payload.as_json().cloned().unwrap_or(Value::Null);

        let ctx = ResolveContext {
            rule,
            media_url,
            fetcher: &self.fetcher,
            timeout: self.config.timeout(),
        };
        resolver.resolve(&ctx, &payload).await
    }
}

/// Builds the discovery request `GET <rule.url>?format=json&url=<media_url>`
pub fn discovery_request(rule: &ProviderRule, media_url: &str) -> Result<RequestParams, ResolveError> {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("format", "json")
        .append_pair("url", media_url)
        .finish();

    RequestParams::from_url(&format!("{}?{}", rule.url, query))
}
