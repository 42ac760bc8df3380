//! Transport seam: performs one HTTP exchange without interpreting it
//!
//! The resolver never talks to the network except through a [`Transport`].
//! Production callers inject one explicitly; the built-in [`HttpTransport`]
//! is only picked up implicitly in debug mode.

use crate::fetch::request::RequestParams;
use crate::ResolveError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// User agent sent by the built-in transport
pub const USER_AGENT: &str = concat!("media-publisher/", env!("CARGO_PKG_VERSION"));

/// Unclassified outcome of one HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Performs exactly one request
///
/// Implementations report connection failures and timeouts as
/// [`ResolveError::Transport`]; every response that made it back, whatever
/// its status, is returned as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, params: &RequestParams) -> Result<RawResponse, ResolveError>;
}

/// Builds the HTTP client used by the built-in transport
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn round_trip(&self, params: &RequestParams) -> Result<RawResponse, ResolveError> {
        let url = params.url();

        let mut request = self.client.request(params.method(), &url);
        if let Some(payload) = &params.payload {
            request = request.json(payload);
        }
        if let Some(timeout) = params.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        let headers = response.headers().clone();

        // The timeout covers the body too; a late body after a timeout is dropped
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, e))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Maps a reqwest failure onto the transport fault class
fn transport_error(url: &str, error: reqwest::Error) -> ResolveError {
    let message = if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    ResolveError::Transport {
        url: url.to_string(),
        message,
    }
}
