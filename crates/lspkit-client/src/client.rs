//! The session transport consumed by features.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cancellation::CancellationToken;
use crate::errors::RequestError;

/// Log target for failed requests.
pub(crate) const CLIENT_TARGET: &str = "lspkit_client::client";

/// Session transport shared by every feature of a client.
///
/// Implementations own the connection, correlate responses with requests,
/// and forward cancellation to the server (`$/cancelRequest`). They must not
/// serialise requests beyond what the wire requires.
#[async_trait]
pub trait LanguageClient: Send + Sync {
    /// Sends a request and resolves with the raw JSON result.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] when the transport fails, the server
    /// answers with an error object, or the request is abandoned after
    /// `token` fires.
    async fn send_request(
        &self,
        method: &'static str,
        params: Value,
        token: CancellationToken,
    ) -> Result<Value, RequestError>;

    /// Diagnostic sink for requests that failed.
    ///
    /// The default implementation ignores cancellations, reports methods the
    /// server does not implement and content-modified races at `debug`, and
    /// logs anything else at `warn`.
    fn log_failed_request(&self, method: &str, error: &RequestError) {
        log_failed_request(method, error);
    }
}

/// Default classification used by [`LanguageClient::log_failed_request`].
pub fn log_failed_request(method: &str, error: &RequestError) {
    if error.is_cancellation() {
        return;
    }
    if error.is_method_not_found() {
        debug!(
            target: CLIENT_TARGET,
            method,
            "request not supported by the server"
        );
        return;
    }
    if error.is_content_modified() {
        debug!(
            target: CLIENT_TARGET,
            method,
            "request invalidated by a document change"
        );
        return;
    }
    warn!(
        target: CLIENT_TARGET,
        method,
        code = ?error.code(),
        error = %error,
        "request failed"
    );
}
