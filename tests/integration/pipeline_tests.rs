//! End-to-end resolutions against mock providers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use media_publisher::config::{parse_config, BackoffConfig};
use media_publisher::{
    resolve_publisher, ConfigError, HttpTransport, PublisherResolver, ResolveError,
    ResolverConfig, Ruleset, Transport,
};
use serde_json::json;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MEDIA_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Creates a test configuration pointing the identity service at `server`
fn create_test_config(server: &MockServer, retries: u32) -> ResolverConfig {
    ResolverConfig {
        backoff: BackoffConfig {
            delay: 1,
            retries,
            ..BackoffConfig::default()
        },
        identity_server: Some(server.uri()),
        ..ResolverConfig::default()
    }
}

/// A ruleset whose providers all claim YouTube watch URLs, with discovery
/// endpoints at `/<prefix>/oembed` on the mock server
fn youtube_ruleset(server: &MockServer, providers: &[(&str, &str)]) -> Ruleset {
    let rules: Vec<_> = providers
        .iter()
        .map(|(name, prefix)| {
            json!({
                "provider_name": name,
                "url": format!("{}/{}/oembed", server.uri(), prefix),
                "domain": "youtube.com",
                "schemes": ["https://*.youtube.com/watch*"]
            })
        })
        .collect();

    Ruleset::from_json(&serde_json::to_string(&rules).unwrap()).unwrap()
}

fn transport() -> Arc<dyn Transport> {
    Arc::new(HttpTransport::new().expect("Failed to build HTTP client"))
}

fn build_resolver(config: ResolverConfig, ruleset: Ruleset) -> PublisherResolver {
    PublisherResolver::builder(config)
        .ruleset(ruleset)
        .transport(transport())
        .build()
        .expect("Failed to build resolver")
}

fn avatar_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Mounts the discovery endpoint at `/<prefix>/oembed` answering for channel UC123
async fn mount_discovery(server: &MockServer, prefix: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/oembed", prefix)))
        .and(query_param("format", "json"))
        .and(query_param("url", MEDIA_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "video",
            "title": "Some Video",
            "author_name": "oEmbed Author",
            "author_url": format!("{}/channel/UC123", server.uri()),
            "thumbnail_url": format!("{}/thumbnail.jpg", server.uri()),
        })))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts the channel page and its avatar, each expected `expected` times
async fn mount_channel(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/channel/UC123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head>
                    <title>Fallback Title - YouTube</title>
                    <meta property="og:title" content="Test Channel">
                    <meta property="og:image" content="{}/avatar.png">
                    </head><body></body></html>"#,
                    server.uri()
                ))
                .insert_header("content-type", "text/html")
                .insert_header("cache-control", "public, max-age=3600"),
        )
        .expect(expected)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/avatar.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(avatar_png())
                .insert_header("content-type", "image/png")
                .insert_header("cache-control", "max-age=86400"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_identity(server: &MockServer, status: u16, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/v3/publisher/identity"))
        .and(query_param("publisher", "youtube#channel:UC123"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(json!({"properties": {"verified": true}})),
        )
        .expect(expected)
        .mount(server)
        .await;
}

fn decode_favicon(data_url: &str) -> DynamicImage {
    let encoded = data_url
        .strip_prefix("data:image/png;base64,")
        .expect("favicon should be a PNG data URL");
    image::load_from_memory(&STANDARD.decode(encoded).unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_resolution() {
    let server = MockServer::start().await;
    mount_discovery(&server, "youtube", 1).await;
    mount_channel(&server, 1).await;
    mount_identity(&server, 200, 1).await;

    let resolver = build_resolver(
        create_test_config(&server, 1),
        youtube_ruleset(&server, &[("YouTube", "youtube")]),
    );

    let info = resolver.resolve(MEDIA_URL).await.unwrap();

    assert_eq!(info.publisher, "youtube#channel:UC123");
    assert_eq!(
        info.publisher_url,
        format!("{}/channel/UC123/videos", server.uri())
    );
    assert_eq!(info.favicon_name.as_deref(), Some("Test Channel"));
    assert_eq!(info.provider_name, "YouTube");
    assert_eq!(info.properties, Some(json!({"verified": true})));

    let favicon = decode_favicon(info.favicon_url.as_deref().unwrap());
    assert_eq!(favicon.dimensions(), (32, 32));
}

#[tokio::test]
async fn test_warm_cache_skips_author_page_and_favicon() {
    let server = MockServer::start().await;
    mount_discovery(&server, "youtube", 2).await;
    mount_channel(&server, 1).await;
    mount_identity(&server, 200, 2).await;

    let resolver = build_resolver(
        create_test_config(&server, 0),
        youtube_ruleset(&server, &[("YouTube", "youtube")]),
    );

    let first = resolver.resolve(MEDIA_URL).await.unwrap();
    let second = resolver.resolve(MEDIA_URL).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_identity_failure_still_resolves() {
    let server = MockServer::start().await;
    mount_discovery(&server, "youtube", 1).await;
    mount_channel(&server, 1).await;
    // One attempt plus one retry
    mount_identity(&server, 502, 2).await;

    let resolver = build_resolver(
        create_test_config(&server, 1),
        youtube_ruleset(&server, &[("YouTube", "youtube")]),
    );

    let info = resolver.resolve(MEDIA_URL).await.unwrap();

    assert_eq!(info.publisher, "youtube#channel:UC123");
    assert_eq!(info.properties, None);
    assert!(info.favicon_url.unwrap().starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_falls_back_to_next_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first/oembed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_discovery(&server, "second", 1).await;
    mount_channel(&server, 1).await;
    mount_identity(&server, 200, 1).await;

    let resolver = build_resolver(
        create_test_config(&server, 0),
        youtube_ruleset(&server, &[("YouTube", "first"), ("YouTube", "second")]),
    );

    let info = resolver.resolve(MEDIA_URL).await.unwrap();
    assert_eq!(info.publisher, "youtube#channel:UC123");
}

#[tokio::test]
async fn test_all_providers_failing_reports_first_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first/oembed"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second/oembed"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = build_resolver(
        create_test_config(&server, 0),
        youtube_ruleset(&server, &[("YouTube", "first"), ("YouTube", "second")]),
    );

    let error = resolver.resolve(MEDIA_URL).await.unwrap_err();
    assert_eq!(error.status_code(), Some(404));
}

#[tokio::test]
async fn test_provider_without_resolver_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vimeo/oembed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    mount_discovery(&server, "youtube", 1).await;
    mount_channel(&server, 1).await;
    mount_identity(&server, 200, 1).await;

    let resolver = build_resolver(
        create_test_config(&server, 0),
        youtube_ruleset(&server, &[("Vimeo", "vimeo"), ("YouTube", "youtube")]),
    );

    let info = resolver.resolve(MEDIA_URL).await.unwrap();
    assert_eq!(info.provider_name, "YouTube");
}

#[tokio::test]
async fn test_non_channel_author_url_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/oembed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "author_name": "Handle Only",
            "author_url": format!("{}/@handle", server.uri()),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = build_resolver(
        create_test_config(&server, 0),
        youtube_ruleset(&server, &[("YouTube", "youtube")]),
    );

    let result = resolver.resolve(MEDIA_URL).await;
    assert!(matches!(result, Err(ResolveError::InvalidAuthorUrl { .. })));
}

#[tokio::test]
async fn test_favicon_failure_fails_resolution() {
    let server = MockServer::start().await;
    mount_discovery(&server, "youtube", 1).await;
    Mock::given(method("GET"))
        .and(path("/channel/UC123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><head><meta property="og:image" content="{}/broken.png"></head></html>"#,
            server.uri()
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = build_resolver(
        create_test_config(&server, 0),
        youtube_ruleset(&server, &[("YouTube", "youtube")]),
    );

    let result = resolver.resolve(MEDIA_URL).await;
    assert!(matches!(result, Err(ResolveError::Image { .. })));
}

#[tokio::test]
async fn test_invalid_backoff_makes_no_requests() {
    let server = MockServer::start().await;
    let mut config = create_test_config(&server, 0);
    config.backoff.delay = 0;

    let result = resolve_publisher(MEDIA_URL, config, Some(transport())).await;

    assert!(matches!(
        result,
        Err(ResolveError::Config(ConfigError::Validation(_)))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_transport_rejected_outside_debug() {
    let server = MockServer::start().await;
    let config = create_test_config(&server, 0);

    let result = resolve_publisher(MEDIA_URL, config, None).await;

    assert!(matches!(
        result,
        Err(ResolveError::Config(ConfigError::MissingTransport))
    ));
}

#[tokio::test]
async fn test_resolver_from_config_files() {
    let server = MockServer::start().await;
    mount_discovery(&server, "youtube", 1).await;
    mount_channel(&server, 1).await;
    mount_identity(&server, 200, 1).await;

    let mut ruleset_file = NamedTempFile::new().unwrap();
    write!(
        ruleset_file,
        r#"[{{"provider_name": "YouTube", "url": "{}/youtube/oembed", "domain": "youtube.com"}}]"#,
        server.uri()
    )
    .unwrap();
    ruleset_file.flush().unwrap();

    let config = parse_config(&format!(
        r#"
identity-server = "{}"
ruleset = "{}"
debug = true

[backoff]
delay = 1
retries = 0
"#,
        server.uri(),
        ruleset_file.path().display()
    ))
    .unwrap();

    // Debug mode supplies the HTTP transport
    let info = resolve_publisher(MEDIA_URL, config, None).await.unwrap();
    assert_eq!(info.publisher, "youtube#channel:UC123");
}
