//! YouTube resolver
//!
//! Consumes a YouTube oEmbed payload, checks that `author_url` points at a
//! channel (`/channel/<id>`), scrapes the channel page for its title and
//! avatar, and drafts a `youtube#channel:<id>` publisher.

use crate::fetch::RequestParams;
use crate::resolver::scrape::MetadataScraper;
use crate::resolver::{PublisherInfo, ResolveContext, Resolver};
use crate::ResolveError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Fields of the oEmbed payload this resolver uses
#[derive(Debug, Deserialize)]
struct OEmbedPayload {
    author_url: String,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

pub struct YouTubeResolver {
    scraper: Arc<dyn MetadataScraper>,
}

impl YouTubeResolver {
    pub fn new(scraper: Arc<dyn MetadataScraper>) -> Self {
        Self { scraper }
    }
}

/// Extracts the channel id from a `/channel/<id>` author URL
fn channel_id(author_url: &Url) -> Option<&str> {
    match author_url.path().split('/').collect::<Vec<_>>().as_slice() {
        ["", _, id] if !id.is_empty() => Some(*id),
        _ => None,
    }
}

#[async_trait]
impl Resolver for YouTubeResolver {
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        discovery: &Value,
    ) -> Result<PublisherInfo, ResolveError> {
        let payload: OEmbedPayload =
            serde_json::from_value(discovery.clone()).map_err(|e| ResolveError::Decode {
                url: ctx.rule.url.clone(),
                message: e.to_string(),
            })?;

        let author_url = Url::parse(&payload.author_url).map_err(|_| {
            ResolveError::InvalidAuthorUrl {
                url: payload.author_url.clone(),
            }
        })?;
        let channel = channel_id(&author_url).ok_or_else(|| ResolveError::InvalidAuthorUrl {
            url: payload.author_url.clone(),
        })?;

        let params = RequestParams::from_parsed(&author_url)
            .raw()
            .with_timeout(ctx.timeout);
        let page = ctx.fetcher.fetch_cached(&params).await?;

        let metadata = self.scraper.scrape(&page.payload.text(), &author_url)?;
        tracing::debug!(
            "Scraped {}: title={:?} image={:?}",
            payload.author_url,
            metadata.title,
            metadata.image
        );

        Ok(PublisherInfo {
            publisher: format!("youtube#channel:{}", channel),
            publisher_url: format!("{}/videos", payload.author_url),
            favicon_name: metadata.title.or(payload.author_name),
            favicon_url: metadata.image.or(payload.thumbnail_url),
            provider_name: ctx.rule.provider_name.clone(),
            properties: None,
        })
    }
}
