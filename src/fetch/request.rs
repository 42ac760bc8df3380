//! Request parameters and classified response types

use crate::ResolveError;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// Everything needed for one transport attempt
///
/// Built fresh at each call site (discovery, author page, favicon, identity).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    /// Scheme, host and optional port, e.g. `https://www.youtube.com`
    pub server: String,

    /// Path plus query string, e.g. `/oembed?format=json`
    pub path: String,

    /// Explicit HTTP method; defaults to POST with a payload, GET otherwise
    pub method: Option<Method>,

    /// JSON request body
    pub payload: Option<Value>,

    /// Per-attempt timeout
    pub timeout: Option<Duration>,

    /// Decode the body as a byte stream (implies `is_raw`)
    pub is_binary: bool,

    /// Hand back the body as-is instead of decoding it as JSON
    pub is_raw: bool,
}

impl RequestParams {
    /// Creates GET parameters for a server and path
    pub fn new(server: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            path: path.into(),
            method: None,
            payload: None,
            timeout: None,
            is_binary: false,
            is_raw: false,
        }
    }

    /// Splits an absolute URL into server and path+query
    ///
    /// # Example
    ///
    /// ```
    /// use media_publisher::fetch::RequestParams;
    ///
    /// let params = RequestParams::from_url("https://example.com:8443/a/b?c=d").unwrap();
    /// assert_eq!(params.server, "https://example.com:8443");
    /// assert_eq!(params.path, "/a/b?c=d");
    /// ```
    pub fn from_url(url: &str) -> Result<Self, ResolveError> {
        let parsed = Url::parse(url)?;
        Ok(Self::from_parsed(&parsed))
    }

    /// Splits an already parsed URL into server and path+query
    pub fn from_parsed(url: &Url) -> Self {
        let mut server = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
        if let Some(port) = url.port() {
            server.push_str(&format!(":{}", port));
        }

        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        Self::new(server, path)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Requests the undecoded body
    pub fn raw(mut self) -> Self {
        self.is_raw = true;
        self
    }

    /// Requests the body as bytes
    pub fn binary(mut self) -> Self {
        self.is_binary = true;
        self.is_raw = true;
        self
    }

    /// The method actually sent on the wire
    pub fn method(&self) -> Method {
        match (&self.method, &self.payload) {
            (Some(method), _) => method.clone(),
            (None, Some(_)) => Method::POST,
            (None, None) => Method::GET,
        }
    }

    /// Whether the body is handed back without JSON decoding
    pub fn wants_raw(&self) -> bool {
        self.is_raw || self.is_binary
    }

    /// The absolute URL of the request
    pub fn url(&self) -> String {
        format!("{}{}", self.server, self.path)
    }

    /// Key under which the response body is cached
    pub fn cache_key(&self) -> String {
        format!("url:{}{}", self.server, self.path)
    }
}

/// A classified, decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured body; `Value::Null` for HTTP 204
    Json(Value),

    /// Raw text body (UTF-8, invalid sequences replaced)
    Text(String),

    /// Raw binary body
    Binary(Bytes),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the body as text, decoding bytes lossily when needed
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Payload::Json(value) => Cow::Owned(value.to_string()),
            Payload::Text(text) => Cow::Borrowed(text),
            Payload::Binary(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    /// Returns the body as bytes
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Payload::Json(value) => Cow::Owned(value.to_string().into_bytes()),
            Payload::Text(text) => Cow::Borrowed(text.as_bytes()),
            Payload::Binary(bytes) => Cow::Borrowed(bytes.as_ref()),
        }
    }
}

/// Status line and headers of a response that came off the wire
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Result of a successful fetch
///
/// `meta` is `None` when the payload was served from the response cache.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub meta: Option<ResponseMeta>,
    pub payload: Payload,
}

impl Fetched {
    /// True when the payload came from the cache
    pub fn is_cached(&self) -> bool {
        self.meta.is_none()
    }
}
