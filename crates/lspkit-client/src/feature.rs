//! The feature lifecycle shared by every request kind.
//!
//! A feature starts unregistered. The server's `initialize` result, or a later
//! `client/registerCapability`, moves it to registered by installing a provider
//! into the editor's registry. Unregistration and session teardown dispose the
//! provider again. A feature never holds more than one provider.

use std::fmt;
use std::pin::pin;
use std::sync::Arc;

use futures::future::{Either, select};
use lsp_types::{DocumentSelector, Position, ServerCapabilities, TextDocumentRegistrationOptions};
use serde_json::Value;
use tracing::debug;

use crate::cancellation::CancellationToken;
use crate::capability::{ClientCapabilityBuilder, ProviderAdvertisement};
use crate::client::LanguageClient;
use crate::dispatch::Dispatcher;
use crate::document::TextDocument;
use crate::errors::FeatureError;
use crate::kinds::RequestKind;
use crate::middleware::{Invocation, Middleware, MiddlewareHook};
use crate::provider::{Disposable, Provider, ProviderFuture, ProviderRegistry, ProviderResult};
use crate::registration::{Registration, resolve_registration};

/// Log target for feature lifecycle events.
const FEATURE_TARGET: &str = "lspkit_client::feature";

/// Object-safe view of a feature, used by hosts to drive the lifecycle.
pub trait DynamicFeature: Send {
    /// Short configuration name, e.g. `typeDefinition`.
    fn name(&self) -> &'static str;

    /// Wire method served by the feature.
    fn method(&self) -> &'static str;

    /// Declares the client's support in the `initialize` request.
    fn fill_client_capabilities(&self, capabilities: &mut ClientCapabilityBuilder);

    /// Reacts to the server's `initialize` result.
    ///
    /// `document_selector` is the statically configured selector. It is
    /// remembered for registrations that do not name their own, and bounds
    /// those that do.
    fn initialize(&mut self, capabilities: &ServerCapabilities, document_selector: &DocumentSelector);

    /// Applies one entry of a `client/registerCapability` request.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::UnknownMethod`] when the entry names another
    /// method, and [`FeatureError::InvalidRegisterOptions`] when its options
    /// are not text document registration options.
    fn register_dynamic(&mut self, registration: lsp_types::Registration)
    -> Result<(), FeatureError>;

    /// Removes the registration with `id`. Returns whether it was active.
    fn unregister(&mut self, id: &str) -> bool;

    /// Tears the feature down at the end of the session.
    fn dispose(&mut self);

    /// The active registration, if any.
    fn registration(&self) -> Option<&Registration>;

    /// Whether a provider is installed.
    fn is_registered(&self) -> bool {
        self.registration().is_some()
    }
}

enum FeatureState {
    Unregistered,
    Registered {
        registration: Registration,
        disposable: Disposable,
    },
}

/// Generic text document feature for one [`RequestKind`].
pub struct TextDocumentFeature<K: RequestKind> {
    client: Arc<dyn LanguageClient>,
    registry: Arc<dyn ProviderRegistry>,
    hook: Option<MiddlewareHook<K::Response>>,
    static_selector: DocumentSelector,
    state: FeatureState,
}

impl<K: RequestKind> TextDocumentFeature<K> {
    /// Creates an unregistered feature.
    ///
    /// The hook for `K` is read from `middleware` once; later changes to the
    /// middleware do not affect the feature.
    #[must_use]
    pub fn new(
        client: Arc<dyn LanguageClient>,
        registry: Arc<dyn ProviderRegistry>,
        middleware: &Middleware,
    ) -> Self {
        Self {
            client,
            registry,
            hook: K::middleware(middleware),
            static_selector: DocumentSelector::new(),
            state: FeatureState::Unregistered,
        }
    }

    /// Installs a provider for `registration`, replacing any previous one.
    pub fn register(&mut self, registration: Registration) {
        self.clear();
        let provider = Arc::new(FeatureProvider::<K> {
            dispatcher: Dispatcher::new(Arc::clone(&self.client)),
            hook: self.hook.clone(),
        });
        let disposable = self
            .registry
            .register(registration.scope(), K::capability(provider));
        debug!(
            target: FEATURE_TARGET,
            method = K::METHOD,
            id = %registration.id,
            filters = registration.document_selector.len(),
            "provider registered"
        );
        self.state = FeatureState::Registered {
            registration,
            disposable,
        };
    }

    /// Disposes the active provider, if any.
    fn clear(&mut self) {
        let state = std::mem::replace(&mut self.state, FeatureState::Unregistered);
        if let FeatureState::Registered {
            registration,
            disposable,
        } = state
        {
            disposable.dispose();
            debug!(
                target: FEATURE_TARGET,
                method = K::METHOD,
                id = %registration.id,
                "provider disposed"
            );
        }
    }
}

impl<K: RequestKind> DynamicFeature for TextDocumentFeature<K> {
    fn name(&self) -> &'static str {
        K::NAME
    }

    fn method(&self) -> &'static str {
        K::METHOD
    }

    fn fill_client_capabilities(&self, capabilities: &mut ClientCapabilityBuilder) {
        K::fill_client_capabilities(capabilities);
    }

    fn initialize(&mut self, capabilities: &ServerCapabilities, document_selector: &DocumentSelector) {
        self.static_selector = document_selector.clone();
        let resolved = resolve_registration(
            K::METHOD,
            K::advertisement(capabilities),
            document_selector,
            self.registration(),
        );
        match resolved {
            Some(registration) => self.register(registration),
            None => debug!(
                target: FEATURE_TARGET,
                method = K::METHOD,
                "server does not advertise the request"
            ),
        }
    }

    fn register_dynamic(
        &mut self,
        registration: lsp_types::Registration,
    ) -> Result<(), FeatureError> {
        if registration.method != K::METHOD {
            return Err(FeatureError::unknown(&registration.method));
        }
        let document_selector = match &registration.register_options {
            None | Some(Value::Null) => None,
            Some(options) => {
                serde_json::from_value::<TextDocumentRegistrationOptions>(options.clone())
                    .map_err(|source| FeatureError::invalid_options(K::METHOD, source))?
                    .document_selector
            }
        };
        let advertisement = ProviderAdvertisement::Options {
            document_selector,
            id: Some(registration.id),
            options: registration.register_options,
        };
        if let Some(resolved) =
            resolve_registration(K::METHOD, advertisement, &self.static_selector, None)
        {
            self.register(resolved);
        }
        Ok(())
    }

    fn unregister(&mut self, id: &str) -> bool {
        let matches = matches!(
            &self.state,
            FeatureState::Registered { registration, .. } if registration.id == id
        );
        if matches {
            self.clear();
        } else {
            debug!(
                target: FEATURE_TARGET,
                method = K::METHOD,
                id,
                "ignoring unregistration of an unknown id"
            );
        }
        matches
    }

    fn dispose(&mut self) {
        self.clear();
    }

    fn registration(&self) -> Option<&Registration> {
        match &self.state {
            FeatureState::Registered { registration, .. } => Some(registration),
            FeatureState::Unregistered => None,
        }
    }
}

impl<K: RequestKind> fmt::Debug for TextDocumentFeature<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TextDocumentFeature")
            .field("method", &K::METHOD)
            .field("registration", &self.registration())
            .field("middleware", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

/// Provider installed by a feature: the middleware hook around the dispatcher.
struct FeatureProvider<K: RequestKind> {
    dispatcher: Dispatcher<K>,
    hook: Option<MiddlewareHook<K::Response>>,
}

impl<K: RequestKind> Provider<K::Response> for FeatureProvider<K> {
    fn provide(
        &self,
        document: TextDocument,
        position: Position,
        token: CancellationToken,
    ) -> ProviderFuture<K::Response> {
        let invocation = Invocation {
            document,
            position,
            token: token.clone(),
        };
        let pending = match &self.hook {
            Some(hook) => hook(invocation, self.dispatcher.continuation()),
            None => self.dispatcher.dispatch(invocation),
        };
        Box::pin(async move {
            let cancelled = pin!(token.cancelled());
            match select(pending, cancelled).await {
                Either::Left((result, _)) if !token.is_cancelled() => result,
                Either::Left(_) | Either::Right(_) => ProviderResult::Cancelled,
            }
        })
    }
}
