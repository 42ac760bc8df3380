//! Publisher properties lookup against the identity service

use crate::fetch::{Fetcher, RequestParams};
use crate::resolver::PublisherInfo;
use std::time::Duration;
use url::form_urlencoded;

/// Path of the identity endpoint on the identity server
pub const IDENTITY_PATH: &str = "/v3/publisher/identity";

/// Builds the identity request for a publisher
pub fn identity_request(server: &str, publisher: &str) -> RequestParams {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("publisher", publisher)
        .finish();

    RequestParams::new(
        server.trim_end_matches('/'),
        format!("{}?{}", IDENTITY_PATH, query),
    )
}

/// Attaches identity-service properties to the record
///
/// Retried but never cached. Any failure leaves the record unchanged: the
/// lookup never fails a resolution.
pub async fn lookup_properties(
    fetcher: &Fetcher,
    mut info: PublisherInfo,
    server: &str,
    timeout: Option<Duration>,
) -> PublisherInfo {
    let params = identity_request(server, &info.publisher).with_timeout(timeout);

    match fetcher.fetch(&params).await {
        Ok(fetched) => {
            info.properties = fetched
                .payload
                .as_json()
                .and_then(|body| body.get("properties"))
                .filter(|properties| !properties.is_null())
                .cloned();
        }
        Err(e) => {
            tracing::debug!("Identity lookup for {} failed: {}", info.publisher, e);
        }
    }

    info
}
