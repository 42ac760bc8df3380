//! Single-attempt transport executor
//!
//! Issues one request through the configured [`Transport`] and classifies the
//! outcome:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | Connection error / timeout | `ResolveError::Transport` |
//! | Status class other than 2xx | `ResolveError::HttpStatus { code }` |
//! | 2xx, raw request | `Payload::Text` or `Payload::Binary` |
//! | 204, JSON request | `Payload::Json(Value::Null)` |
//! | 2xx, JSON request | decoded `Payload::Json`, or `ResolveError::Decode` |
//!
//! No retry, no cache.

use crate::fetch::request::{Fetched, Payload, RequestParams, ResponseMeta};
use crate::fetch::transport::{RawResponse, Transport};
use crate::ResolveError;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;

/// Tracing target for request/response dumps
pub const WIRE_TARGET: &str = "media_publisher::wire";

/// Longest body excerpt logged in verbose mode
const BODY_PREVIEW_LIMIT: usize = 2048;

/// Optional request/response tracing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireTrace {
    /// Dump the request parameters before sending
    pub debug: bool,
    /// Dump status line, headers and (non-raw) body of each response
    pub verbose: bool,
}

/// Runs one transport attempt and classifies it
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    trace: WireTrace,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>, trace: WireTrace) -> Self {
        Self { transport, trace }
    }

    /// Performs exactly one request
    pub async fn execute(&self, params: &RequestParams) -> Result<Fetched, ResolveError> {
        if self.trace.debug {
            tracing::debug!(target: WIRE_TARGET, ?params, "request parameters");
        }
        if self.trace.verbose {
            tracing::debug!(target: WIRE_TARGET, "<<< {} {}", params.method(), params.url());
            if let Some(payload) = &params.payload {
                tracing::debug!(target: WIRE_TARGET, "<<< {}", payload);
            }
        }

        let raw = self.transport.round_trip(params).await?;

        if self.trace.verbose {
            log_response(params, &raw);
        }

        classify(params, raw)
    }
}

/// Classifies a raw response against the request that produced it
pub fn classify(params: &RequestParams, raw: RawResponse) -> Result<Fetched, ResolveError> {
    if !raw.status.is_success() {
        return Err(ResolveError::HttpStatus {
            url: params.url(),
            code: raw.status.as_u16(),
        });
    }

    let payload = if params.is_binary {
        Payload::Binary(raw.body)
    } else if params.is_raw {
        Payload::Text(String::from_utf8_lossy(&raw.body).into_owned())
    } else if raw.status == StatusCode::NO_CONTENT {
        Payload::Json(Value::Null)
    } else {
        let value =
            serde_json::from_slice(&raw.body).map_err(|e| ResolveError::Decode {
                url: params.url(),
                message: e.to_string(),
            })?;
        Payload::Json(value)
    };

    Ok(Fetched {
        meta: Some(ResponseMeta {
            status: raw.status,
            headers: raw.headers,
        }),
        payload,
    })
}

fn log_response(params: &RequestParams, raw: &RawResponse) {
    tracing::debug!(
        target: WIRE_TARGET,
        ">>> {} {}",
        raw.status.as_u16(),
        raw.status.canonical_reason().unwrap_or("")
    );
    for (name, value) in raw.headers.iter() {
        tracing::debug!(
            target: WIRE_TARGET,
            ">>> {}: {}",
            name,
            value.to_str().unwrap_or("<binary>")
        );
    }

    if params.wants_raw() {
        tracing::debug!(target: WIRE_TARGET, ">>> ...");
    } else {
        let body = String::from_utf8_lossy(&raw.body);
        let preview: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();
        tracing::debug!(target: WIRE_TARGET, ">>> {}", preview);
    }
}
