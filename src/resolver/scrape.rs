//! HTML metadata extraction for author pages
//!
//! Pulls the canonical title and image out of a page:
//!
//! | Field | Sources, in order |
//! |-------|-------------------|
//! | title | `og:title`, `twitter:title`, `<title>` |
//! | image | `og:image`, `twitter:image`, `<link rel="image_src">` |
//!
//! Relative image URLs are resolved against the page URL.

use crate::ResolveError;
use scraper::{Html, Selector};
use url::Url;

/// Title and image scraped from a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub image: Option<String>,
}

/// Extracts metadata from HTML
pub trait MetadataScraper: Send + Sync {
    fn scrape(&self, html: &str, page_url: &Url) -> Result<PageMetadata, ResolveError>;
}

/// Default scraper built on the `scraper` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMetadataScraper;

impl MetadataScraper for HtmlMetadataScraper {
    fn scrape(&self, html: &str, page_url: &Url) -> Result<PageMetadata, ResolveError> {
        if html.trim().is_empty() {
            return Err(ResolveError::Scrape {
                url: page_url.to_string(),
                message: "empty document".to_string(),
            });
        }

        let document = Html::parse_document(html);

        let title = meta_content(&document, &["og:title", "twitter:title"])
            .or_else(|| extract_title(&document));

        let image = meta_content(&document, &["og:image", "og:image:url", "twitter:image"])
            .or_else(|| link_href(&document, "image_src"))
            .and_then(|href| resolve_image(&href, page_url));

        Ok(PageMetadata { title, image })
    }
}

/// First non-empty `<meta>` content among `keys`, matching `property` or `name`
fn meta_content(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let selector =
            Selector::parse(&format!(r#"meta[property="{key}"], meta[name="{key}"]"#)).ok()?;

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
            .find(|content| !content.is_empty())
    })
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn link_href(document: &Html, rel: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"link[rel="{rel}"][href]"#)).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .find(|href| !href.is_empty())
}

/// Resolves an image reference to an absolute http(s) URL
fn resolve_image(href: &str, page_url: &Url) -> Option<String> {
    let absolute = page_url.join(href).ok()?;

    match absolute.scheme() {
        "http" | "https" => Some(absolute.to_string()),
        _ => None,
    }
}
