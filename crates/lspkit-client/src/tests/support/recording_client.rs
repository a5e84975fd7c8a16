//! Recording session transport used in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::cancellation::CancellationToken;
use crate::client::{LanguageClient, log_failed_request};
use crate::errors::RequestError;

/// Scripted answer for one method.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with the raw result.
    Respond(Value),
    /// Answer with a JSON-RPC error object.
    Fail {
        /// Error code.
        code: i64,
        /// Error message.
        message: String,
    },
    /// Fail at the transport level.
    Transport(String),
    /// Never answer; give up only once the request is cancelled.
    Pending,
    /// Cancel the caller's token, then answer anyway.
    Stale(Value),
}

/// A request observed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRequest {
    /// Wire method.
    pub method: String,
    /// Raw params.
    pub params: Value,
}

/// A failure handed to the diagnostic sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedFailure {
    /// Method of the failed request.
    pub method: String,
    /// JSON-RPC code, when the server supplied one.
    pub code: Option<i64>,
}

/// Test double that answers from a script and records what it saw.
#[derive(Clone, Default)]
pub struct RecordingClient {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingClient {
    /// Creates a transport that answers `null` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the answer for `method`.
    pub fn reply(&self, method: &str, reply: Reply) {
        with_state(&self.shared, |state| {
            state.replies.insert(method.to_owned(), reply);
        });
    }

    /// Requests sent so far, in order.
    pub fn sent(&self) -> Vec<SentRequest> {
        with_state(&self.shared, |state| state.sent.clone())
    }

    /// Number of requests sent for `method`.
    pub fn sent_count(&self, method: &str) -> usize {
        with_state(&self.shared, |state| {
            state
                .sent
                .iter()
                .filter(|request| request.method == method)
                .count()
        })
    }

    /// Failures reported to the diagnostic sink, in order.
    pub fn failures(&self) -> Vec<LoggedFailure> {
        with_state(&self.shared, |state| state.failures.clone())
    }
}

#[async_trait]
impl LanguageClient for RecordingClient {
    async fn send_request(
        &self,
        method: &'static str,
        params: Value,
        token: CancellationToken,
    ) -> Result<Value, RequestError> {
        let reply = with_state(&self.shared, |state| {
            state.sent.push(SentRequest {
                method: method.to_owned(),
                params,
            });
            state
                .replies
                .get(method)
                .cloned()
                .unwrap_or(Reply::Respond(Value::Null))
        });
        match reply {
            Reply::Respond(value) => Ok(value),
            Reply::Fail { code, message } => Err(RequestError::response(code, message)),
            Reply::Transport(message) => Err(RequestError::transport(message)),
            Reply::Pending => {
                token.cancelled().await;
                Err(RequestError::response(
                    crate::errors::REQUEST_CANCELLED,
                    "request cancelled",
                ))
            }
            Reply::Stale(value) => {
                token.cancel();
                Ok(value)
            }
        }
    }

    fn log_failed_request(&self, method: &str, error: &RequestError) {
        with_state(&self.shared, |state| {
            state.failures.push(LoggedFailure {
                method: method.to_owned(),
                code: error.code(),
            });
        });
        log_failed_request(method, error);
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    replies: HashMap<String, Reply>,
    sent: Vec<SentRequest>,
    failures: Vec<LoggedFailure>,
}

fn with_state<R, F>(shared: &Arc<Mutex<RecordingState>>, action: F) -> R
where
    F: FnOnce(&mut RecordingState) -> R,
{
    let mut guard = shared.lock().unwrap_or_else(|poison| poison.into_inner());
    action(&mut guard)
}
