//! Default request behaviour: send, await, and absorb failures.

use std::fmt;
use std::marker::PhantomData;
use std::pin::pin;
use std::sync::Arc;

use futures::future::{Either, select};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::LanguageClient;
use crate::errors::RequestError;
use crate::kinds::RequestKind;
use crate::middleware::{Invocation, Next};
use crate::provider::{ProviderFuture, ProviderResult};

/// Log target for request dispatch.
const DISPATCH_TARGET: &str = "lspkit_client::dispatch";

/// Sends one request kind over the session transport.
pub struct Dispatcher<K> {
    client: Arc<dyn LanguageClient>,
    kind: PhantomData<fn() -> K>,
}

impl<K: RequestKind> Dispatcher<K> {
    /// Creates a dispatcher bound to the session transport.
    #[must_use]
    pub fn new(client: Arc<dyn LanguageClient>) -> Self {
        Self {
            client,
            kind: PhantomData,
        }
    }

    /// Runs the request for `invocation`.
    ///
    /// The future never fails: transport and protocol errors are logged
    /// through [`LanguageClient::log_failed_request`] and become
    /// [`ProviderResult::Empty`]; cancellation becomes
    /// [`ProviderResult::Cancelled`] without logging.
    #[must_use]
    pub fn dispatch(&self, invocation: Invocation) -> ProviderFuture<K::Response> {
        let client = Arc::clone(&self.client);
        Box::pin(async move { send_request::<K>(client.as_ref(), invocation).await })
    }

    /// The dispatcher as a middleware continuation.
    #[must_use]
    pub fn continuation(&self) -> Next<K::Response> {
        let dispatcher = self.clone();
        Next::new(move |invocation| dispatcher.dispatch(invocation))
    }
}

impl<K> Clone for Dispatcher<K> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for Dispatcher<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Dispatcher")
    }
}

async fn send_request<K: RequestKind>(
    client: &dyn LanguageClient,
    invocation: Invocation,
) -> ProviderResult<K::Response> {
    let Invocation {
        document,
        position,
        token,
    } = invocation;
    if token.is_cancelled() {
        return ProviderResult::Cancelled;
    }

    let params = match serde_json::to_value(K::params(&document, position)) {
        Ok(params) => params,
        Err(error) => {
            client.log_failed_request(K::METHOD, &RequestError::from(error));
            return ProviderResult::Empty;
        }
    };

    debug!(
        target: DISPATCH_TARGET,
        method = K::METHOD,
        uri = document.uri().as_str(),
        line = position.line,
        character = position.character,
        "sending request"
    );

    let request = client.send_request(K::METHOD, params, token.clone());
    let cancelled = pin!(token.cancelled());
    let outcome = match select(request, cancelled).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => {
            debug!(
                target: DISPATCH_TARGET,
                method = K::METHOD,
                "request cancelled before a response arrived"
            );
            return ProviderResult::Cancelled;
        }
    };

    if token.is_cancelled() {
        debug!(
            target: DISPATCH_TARGET,
            method = K::METHOD,
            "discarding response to a cancelled request"
        );
        return ProviderResult::Cancelled;
    }

    match outcome.and_then(decode::<K::Response>) {
        Ok(Some(response)) => ProviderResult::Value(response),
        Ok(None) => ProviderResult::Empty,
        Err(error) if error.is_cancellation() => ProviderResult::Cancelled,
        Err(error) => {
            client.log_failed_request(K::METHOD, &error);
            ProviderResult::Empty
        }
    }
}

/// Decodes a raw result; `null` means "no result".
fn decode<T: DeserializeOwned>(value: Value) -> Result<Option<T>, RequestError> {
    Ok(serde_json::from_value(value)?)
}
