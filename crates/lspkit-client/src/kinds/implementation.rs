//! `textDocument/implementation`.

use std::sync::Arc;

use lsp_types::request::{GotoImplementation, Request};
use lsp_types::{
    GotoDefinitionParams, GotoDefinitionResponse, ImplementationProviderCapability, Position,
    ServerCapabilities,
};

use super::RequestKind;
use crate::capability::{ClientCapabilityBuilder, ProviderAdvertisement};
use crate::document::TextDocument;
use crate::feature::TextDocumentFeature;
use crate::middleware::{Middleware, MiddlewareHook};
use crate::provider::{Provider, ProviderCapability};

/// Go to the implementations of the symbol under the caret.
#[derive(Debug, Clone, Copy, Default)]
pub struct Implementation;

/// The implementation feature.
pub type ImplementationFeature = TextDocumentFeature<Implementation>;

impl RequestKind for Implementation {
    type Params = GotoDefinitionParams;
    type Response = GotoDefinitionResponse;

    const METHOD: &'static str = GotoImplementation::METHOD;
    const NAME: &'static str = "implementation";

    fn fill_client_capabilities(capabilities: &mut ClientCapabilityBuilder) {
        ClientCapabilityBuilder::enable_goto(&mut capabilities.text_document().implementation);
    }

    fn advertisement(capabilities: &ServerCapabilities) -> ProviderAdvertisement {
        match &capabilities.implementation_provider {
            None => ProviderAdvertisement::Absent,
            Some(ImplementationProviderCapability::Simple(supported)) => {
                ProviderAdvertisement::Flag(*supported)
            }
            Some(ImplementationProviderCapability::Options(options)) => {
                ProviderAdvertisement::from_static(options)
            }
        }
    }

    fn params(document: &TextDocument, position: Position) -> Self::Params {
        document.goto_params(position)
    }

    fn middleware(middleware: &Middleware) -> Option<MiddlewareHook<Self::Response>> {
        middleware.provide_implementation.clone()
    }

    fn capability(provider: Arc<dyn Provider<Self::Response>>) -> ProviderCapability {
        ProviderCapability::Implementation(provider)
    }
}
