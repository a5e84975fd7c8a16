//! BDD test world encapsulating a feature host, its registry and a scripted transport.

use std::str::FromStr;
use std::sync::Arc;

use lsp_types::{
    ClientCapabilities, GotoDefinitionResponse, Location, Position, Range, RegistrationParams,
    ServerCapabilities, UnregistrationParams, Uri,
};
use lspkit_config::ClientOptions;
use tokio::runtime::Runtime;

use crate::cancellation::CancellationToken;
use crate::document::TextDocument;
use crate::errors::FeatureError;
use crate::host::FeatureHost;
use crate::middleware::Middleware;
use crate::provider::ProviderResult;
use crate::registry::LanguageRegistry;

use super::recording_client::RecordingClient;

/// Shared state exercised by BDD step implementations.
pub struct TestWorld {
    runtime: Runtime,
    /// Scripted transport.
    pub client: RecordingClient,
    /// Provider registry the host installs into.
    pub registry: LanguageRegistry,
    options: ClientOptions,
    middleware: Middleware,
    host: Option<FeatureHost>,
    /// Capabilities the server reports from `initialize`.
    pub server_capabilities: ServerCapabilities,
    /// Last collected client capabilities.
    pub client_capabilities: Option<ClientCapabilities>,
    /// Last lookup outcome.
    pub result: Option<ProviderResult<GotoDefinitionResponse>>,
    /// Last error returned by the host.
    pub last_error: Option<FeatureError>,
}

impl TestWorld {
    /// Builds a world with default options and a silent server.
    #[must_use]
    pub fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|error| panic!("failed to build test runtime: {error}"));
        Self {
            runtime,
            client: RecordingClient::new(),
            registry: LanguageRegistry::new(),
            options: ClientOptions::default(),
            middleware: Middleware::default(),
            host: None,
            server_capabilities: ServerCapabilities::default(),
            client_capabilities: None,
            result: None,
            last_error: None,
        }
    }

    /// Replaces the client options; the host is rebuilt on next use.
    pub fn set_options(&mut self, options: ClientOptions) {
        self.options = options;
        self.host = None;
    }

    /// Replaces the middleware; the host is rebuilt on next use.
    pub fn set_middleware(&mut self, middleware: Middleware) {
        self.middleware = middleware;
        self.host = None;
    }

    /// The host under test, built from the current options on first use.
    pub fn host(&mut self) -> &mut FeatureHost {
        self.host.get_or_insert_with(|| {
            FeatureHost::new(
                &self.options,
                Arc::new(self.client.clone()),
                Arc::new(self.registry.clone()),
                self.middleware.clone(),
            )
        })
    }

    /// Collects the capabilities for the `initialize` request.
    pub fn collect_client_capabilities(&mut self) {
        let capabilities = self.host().client_capabilities();
        self.client_capabilities = Some(capabilities);
    }

    /// Feeds the server capabilities to the host.
    pub fn initialise(&mut self) {
        let capabilities = self.server_capabilities.clone();
        self.host().initialize(&capabilities);
    }

    /// Applies a dynamic registration request.
    pub fn register_capability(&mut self, params: RegistrationParams) {
        self.last_error = self.host().handle_register_capability(params).err();
    }

    /// Applies a dynamic unregistration request.
    pub fn unregister_capability(&mut self, params: UnregistrationParams) {
        self.last_error = self.host().handle_unregister_capability(params).err();
    }

    /// Tears the session down.
    pub fn dispose(&mut self) {
        self.host().dispose();
    }

    /// Runs a lookup through the registry and stores the outcome.
    pub fn request(&mut self, method: &str, uri: &str, position: Position) {
        let document = document(uri);
        let lookup = self
            .registry
            .lookup(method, &document, position, CancellationToken::new());
        self.result = Some(self.runtime.block_on(lookup));
    }

    /// Runs a lookup and cancels it while it is in flight.
    pub fn request_and_cancel(&mut self, method: &str, uri: &str) {
        let document = document(uri);
        let token = CancellationToken::new();
        let lookup = self
            .registry
            .lookup(method, &document, Position::new(0, 0), token.clone());
        let cancel = async {
            tokio::task::yield_now().await;
            token.cancel();
        };
        let outcome = self.runtime.block_on(async {
            let (result, ()) = tokio::join!(lookup, cancel);
            result
        });
        self.result = Some(outcome);
    }

    /// The stored lookup outcome.
    pub fn result(&self) -> &ProviderResult<GotoDefinitionResponse> {
        self.result
            .as_ref()
            .unwrap_or_else(|| panic!("no lookup has been made"))
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a test URI.
#[must_use]
pub fn uri(value: &str) -> Uri {
    Uri::from_str(value).unwrap_or_else(|error| panic!("invalid test URI {value}: {error}"))
}

/// An open document whose language id is its file extension.
#[must_use]
pub fn document(value: &str) -> TextDocument {
    let language = value.rsplit_once('.').map_or("plaintext", |(_, extension)| extension);
    TextDocument::new(uri(value), language, 1)
}

/// A location at the start of `value`.
#[must_use]
pub fn location(value: &str) -> Location {
    Location::new(uri(value), Range::default())
}

/// URI of the first target in a goto response.
#[must_use]
pub fn first_uri(response: &GotoDefinitionResponse) -> Option<String> {
    match response {
        GotoDefinitionResponse::Scalar(location) => Some(location.uri.as_str().to_owned()),
        GotoDefinitionResponse::Array(locations) => locations
            .first()
            .map(|location| location.uri.as_str().to_owned()),
        GotoDefinitionResponse::Link(links) => {
            links.first().map(|link| link.target_uri.as_str().to_owned())
        }
    }
}
