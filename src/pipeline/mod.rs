//! Publisher resolution pipeline
//!
//! Ties together the ruleset, the resolver registry, the fetch layers and the
//! enrichment stages. Build a [`PublisherResolver`] once and reuse it, or call
//! [`resolve_publisher`], which shares one process-wide response cache across
//! calls.

mod builder;
mod coordinator;

pub use builder::PublisherResolverBuilder;
pub use coordinator::{discovery_request, PublisherResolver};

use crate::cache::ResponseCache;
use crate::config::ResolverConfig;
use crate::fetch::Transport;
use crate::resolver::PublisherInfo;
use std::sync::{Arc, OnceLock};

static SHARED_CACHE: OnceLock<Arc<ResponseCache>> = OnceLock::new();

/// The process-wide response cache used by [`resolve_publisher`]
pub fn shared_cache() -> Arc<ResponseCache> {
    SHARED_CACHE.get_or_init(Arc::default).clone()
}

/// Resolves one media URL through the process-wide response cache
///
/// Configuration errors are reported through the returned future, never
/// before it is first polled.
pub async fn resolve_publisher(
    media_url: &str,
    config: ResolverConfig,
    transport: Option<Arc<dyn Transport>>,
) -> crate::Result<PublisherInfo> {
    let mut builder = PublisherResolver::builder(config).cache(shared_cache());
    if let Some(transport) = transport {
        builder = builder.transport(transport);
    }

    let resolver = match builder.build() {
        Ok(resolver) => resolver,
        Err(e) => {
            tokio::task::yield_now().await;
            return Err(e.into());
        }
    };

    resolver.resolve(media_url).await
}
