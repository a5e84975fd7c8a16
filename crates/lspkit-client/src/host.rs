//! Host facade that owns every feature of one client session.

use std::sync::Arc;

use lsp_types::{
    ClientCapabilities, DocumentSelector, RegistrationParams, ServerCapabilities,
    UnregistrationParams,
};
use lspkit_config::ClientOptions;
use tracing::{debug, info, warn};

use crate::capability::ClientCapabilityBuilder;
use crate::client::LanguageClient;
use crate::errors::FeatureError;
use crate::feature::{DynamicFeature, TextDocumentFeature};
use crate::kinds::{Declaration, Definition, Implementation, RequestKind, TypeDefinition};
use crate::middleware::Middleware;
use crate::provider::ProviderRegistry;
use crate::registration::Registration;
use crate::selector::document_selector;

/// Log target for host events.
const HOST_TARGET: &str = "lspkit_client::host";

/// Routes the session lifecycle to the features that serve each method.
pub struct FeatureHost {
    client: Arc<dyn LanguageClient>,
    registry: Arc<dyn ProviderRegistry>,
    middleware: Middleware,
    document_selector: DocumentSelector,
    features: Vec<Box<dyn DynamicFeature>>,
}

impl FeatureHost {
    /// Builds a host with the built-in goto features.
    ///
    /// Features denied by `options` are left out entirely, so they neither
    /// declare client capabilities nor register providers.
    #[must_use]
    pub fn new(
        options: &ClientOptions,
        client: Arc<dyn LanguageClient>,
        registry: Arc<dyn ProviderRegistry>,
        middleware: Middleware,
    ) -> Self {
        let mut host = Self {
            client,
            registry,
            middleware,
            document_selector: document_selector(&options.document_selector),
            features: Vec::new(),
        };
        host.add_builtin::<TypeDefinition>(options);
        host.add_builtin::<Definition>(options);
        host.add_builtin::<Implementation>(options);
        host.add_builtin::<Declaration>(options);
        host
    }

    fn add_builtin<K: RequestKind>(&mut self, options: &ClientOptions) {
        if options.is_feature_disabled(K::NAME) {
            debug!(
                target: HOST_TARGET,
                feature = K::NAME,
                "feature disabled by configuration"
            );
            return;
        }
        let feature = TextDocumentFeature::<K>::new(
            Arc::clone(&self.client),
            Arc::clone(&self.registry),
            &self.middleware,
        );
        self.features.push(Box::new(feature));
    }

    /// Adds a feature for a method not yet served by this host.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::DuplicateFeature`] when a feature already
    /// serves the same method.
    pub fn register_feature(&mut self, feature: Box<dyn DynamicFeature>) -> Result<(), FeatureError> {
        if self.feature(feature.method()).is_some() {
            return Err(FeatureError::duplicate(feature.method()));
        }
        self.features.push(feature);
        Ok(())
    }

    /// The capabilities to send in the `initialize` request.
    #[must_use]
    pub fn client_capabilities(&self) -> ClientCapabilities {
        self.extend_client_capabilities(ClientCapabilities::default())
    }

    /// Adds every feature's declaration to capabilities built elsewhere.
    #[must_use]
    pub fn extend_client_capabilities(&self, base: ClientCapabilities) -> ClientCapabilities {
        let mut builder = ClientCapabilityBuilder::from_capabilities(base);
        for feature in &self.features {
            feature.fill_client_capabilities(&mut builder);
        }
        builder.build()
    }

    /// Hands the server's `initialize` result to every feature.
    pub fn initialize(&mut self, capabilities: &ServerCapabilities) {
        for feature in &mut self.features {
            feature.initialize(capabilities, &self.document_selector);
        }
        info!(
            target: HOST_TARGET,
            features = self.features.len(),
            registered = self.features.iter().filter(|feature| feature.is_registered()).count(),
            "session initialised"
        );
    }

    /// Applies a `client/registerCapability` request.
    ///
    /// Every entry is attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::UnknownMethod`] for entries no feature serves
    /// and [`FeatureError::InvalidRegisterOptions`] for malformed options.
    pub fn handle_register_capability(
        &mut self,
        params: RegistrationParams,
    ) -> Result<(), FeatureError> {
        let mut outcome = Ok(());
        for registration in params.registrations {
            let result = match self.feature_mut(&registration.method) {
                Some(feature) => feature.register_dynamic(registration),
                None => Err(FeatureError::unknown(&registration.method)),
            };
            if let Err(error) = result {
                warn!(target: HOST_TARGET, error = %error, "dynamic registration rejected");
                if outcome.is_ok() {
                    outcome = Err(error);
                }
            }
        }
        outcome
    }

    /// Applies a `client/unregisterCapability` request.
    ///
    /// Unknown registration ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::UnknownMethod`] for entries no feature serves.
    pub fn handle_unregister_capability(
        &mut self,
        params: UnregistrationParams,
    ) -> Result<(), FeatureError> {
        let mut outcome = Ok(());
        for unregistration in params.unregisterations {
            match self.feature_mut(&unregistration.method) {
                Some(feature) => {
                    feature.unregister(&unregistration.id);
                }
                None if outcome.is_ok() => {
                    outcome = Err(FeatureError::unknown(&unregistration.method));
                }
                None => {}
            }
        }
        outcome
    }

    /// The active registration for `method`.
    #[must_use]
    pub fn registration(&self, method: &str) -> Option<&Registration> {
        self.feature(method).and_then(|feature| feature.registration())
    }

    /// Whether a provider is installed for `method`.
    #[must_use]
    pub fn is_registered(&self, method: &str) -> bool {
        self.registration(method).is_some()
    }

    /// Methods served by this host, in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|feature| feature.method())
    }

    /// Disposes every feature at session teardown.
    pub fn dispose(&mut self) {
        for feature in &mut self.features {
            feature.dispose();
        }
        debug!(target: HOST_TARGET, "session disposed");
    }

    fn feature(&self, method: &str) -> Option<&dyn DynamicFeature> {
        self.features
            .iter()
            .find(|feature| feature.method() == method)
            .map(|feature| &**feature)
    }

    fn feature_mut(&mut self, method: &str) -> Option<&mut (dyn DynamicFeature + 'static)> {
        self.features
            .iter_mut()
            .find(|feature| feature.method() == method)
            .map(|feature| &mut **feature)
    }
}

impl std::fmt::Debug for FeatureHost {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FeatureHost")
            .field("methods", &self.methods().collect::<Vec<_>>())
            .field("document_selector", &self.document_selector)
            .finish_non_exhaustive()
    }
}
