//! Scripted in-memory transport for unit tests

use crate::fetch::request::RequestParams;
use crate::fetch::transport::{RawResponse, Transport};
use crate::ResolveError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Outcome {
    Response(RawResponse),
    Fault { url: String, message: String },
}

impl Outcome {
    fn from_result(result: Result<RawResponse, ResolveError>) -> Self {
        match result {
            Ok(raw) => Outcome::Response(raw),
            Err(ResolveError::Transport { url, message }) => Outcome::Fault { url, message },
            Err(other) => panic!("transports only fail with transport faults, got {:?}", other),
        }
    }

    fn into_result(self) -> Result<RawResponse, ResolveError> {
        match self {
            Outcome::Response(raw) => Ok(raw),
            Outcome::Fault { url, message } => Err(ResolveError::Transport { url, message }),
        }
    }
}

/// Plays back a fixed script of outcomes and records every attempt
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Option<Outcome>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    /// Plays `script` in order; panics if asked for more
    pub fn new(script: Vec<Result<RawResponse, ResolveError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(Outcome::from_result).collect()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with the same outcome
    pub fn repeating(outcome: Result<RawResponse, ResolveError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(Outcome::from_result(outcome)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Time elapsed between consecutive attempts
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].1 - w[0].1).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn round_trip(&self, params: &RequestParams) -> Result<RawResponse, ResolveError> {
        self.calls
            .lock()
            .unwrap()
            .push((params.url(), Instant::now()));

        let next = self.script.lock().unwrap().pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(outcome) => outcome.into_result(),
            None => panic!("unexpected request to {}", params.url()),
        }
    }
}
