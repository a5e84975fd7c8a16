//! Error types surfaced at the transport boundary and by feature wiring.

use serde_json::Value;
use thiserror::Error;

/// JSON-RPC code for a method the server does not implement.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// LSP code for a request the client cancelled.
pub const REQUEST_CANCELLED: i64 = -32800;
/// LSP code for a request invalidated by a document change.
pub const CONTENT_MODIFIED: i64 = -32801;
/// LSP code for a request the server cancelled.
pub const SERVER_CANCELLED: i64 = -32802;

/// Failures reported by a [`crate::LanguageClient`] for a single request.
///
/// These never reach editor-facing callers: the dispatcher routes them to
/// [`crate::LanguageClient::log_failed_request`] and resolves to an empty
/// result instead.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server answered with a JSON-RPC error object.
    #[error("server returned error: {message} (code: {code})")]
    Response {
        /// The JSON-RPC error code.
        code: i64,
        /// The error message from the server.
        message: String,
        /// Optional structured error payload.
        data: Option<Value>,
    },

    /// The connection failed while sending or awaiting the request.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// Params could not be encoded or the result could not be decoded.
    #[error("JSON codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The transport abandoned the request after cancellation.
    #[error("request was cancelled")]
    Cancelled,
}

impl RequestError {
    /// Builds a response error from a JSON-RPC error code and message.
    #[must_use]
    pub fn response(code: i64, message: impl Into<String>) -> Self {
        Self::Response {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Builds a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// JSON-RPC error code, when the server supplied one.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Response { code, .. } => Some(*code),
            Self::Transport { .. } | Self::Codec(_) | Self::Cancelled => None,
        }
    }

    /// Whether the error only reports that the request was cancelled.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
            || matches!(self.code(), Some(REQUEST_CANCELLED | SERVER_CANCELLED))
    }

    /// Whether the server rejected the method as unknown.
    #[must_use]
    pub fn is_method_not_found(&self) -> bool {
        self.code() == Some(METHOD_NOT_FOUND)
    }

    /// Whether the request was invalidated by a concurrent document edit.
    #[must_use]
    pub fn is_content_modified(&self) -> bool {
        self.code() == Some(CONTENT_MODIFIED)
    }
}

/// Errors raised while wiring features into a session.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Two features claimed the same request method.
    #[error("a feature for '{method}' is already registered")]
    DuplicateFeature {
        /// Method claimed twice.
        method: String,
    },

    /// The server tried to (un)register a method no feature handles.
    #[error("no feature handles '{method}'")]
    UnknownMethod {
        /// Method named by the server.
        method: String,
    },

    /// Dynamic registration options did not have the expected shape.
    #[error("invalid registration options for '{method}': {source}")]
    InvalidRegisterOptions {
        /// Method being registered.
        method: String,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

impl FeatureError {
    /// Builds a `DuplicateFeature` error.
    pub(crate) fn duplicate(method: &str) -> Self {
        Self::DuplicateFeature {
            method: method.to_owned(),
        }
    }

    /// Builds an `UnknownMethod` error.
    pub(crate) fn unknown(method: &str) -> Self {
        Self::UnknownMethod {
            method: method.to_owned(),
        }
    }

    /// Builds an `InvalidRegisterOptions` error.
    pub(crate) fn invalid_options(method: &str, source: serde_json::Error) -> Self {
        Self::InvalidRegisterOptions {
            method: method.to_owned(),
            source,
        }
    }
}
