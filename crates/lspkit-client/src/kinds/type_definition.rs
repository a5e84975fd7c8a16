//! `textDocument/typeDefinition`.

use std::sync::Arc;

use lsp_types::request::{GotoTypeDefinition, Request};
use lsp_types::{
    GotoDefinitionParams, GotoDefinitionResponse, Position, ServerCapabilities,
    TypeDefinitionProviderCapability,
};

use super::RequestKind;
use crate::capability::{ClientCapabilityBuilder, ProviderAdvertisement};
use crate::document::TextDocument;
use crate::feature::TextDocumentFeature;
use crate::middleware::{Middleware, MiddlewareHook};
use crate::provider::{Provider, ProviderCapability};

/// Go to the type of the symbol under the caret.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDefinition;

/// The type definition feature.
pub type TypeDefinitionFeature = TextDocumentFeature<TypeDefinition>;

impl RequestKind for TypeDefinition {
    type Params = GotoDefinitionParams;
    type Response = GotoDefinitionResponse;

    const METHOD: &'static str = GotoTypeDefinition::METHOD;
    const NAME: &'static str = "typeDefinition";

    fn fill_client_capabilities(capabilities: &mut ClientCapabilityBuilder) {
        ClientCapabilityBuilder::enable_goto(&mut capabilities.text_document().type_definition);
    }

    fn advertisement(capabilities: &ServerCapabilities) -> ProviderAdvertisement {
        match &capabilities.type_definition_provider {
            None => ProviderAdvertisement::Absent,
            Some(TypeDefinitionProviderCapability::Simple(supported)) => {
                ProviderAdvertisement::Flag(*supported)
            }
            Some(TypeDefinitionProviderCapability::Options(options)) => {
                ProviderAdvertisement::from_static(options)
            }
        }
    }

    fn params(document: &TextDocument, position: Position) -> Self::Params {
        document.goto_params(position)
    }

    fn middleware(middleware: &Middleware) -> Option<MiddlewareHook<Self::Response>> {
        middleware.provide_type_definition.clone()
    }

    fn capability(provider: Arc<dyn Provider<Self::Response>>) -> ProviderCapability {
        ProviderCapability::TypeDefinition(provider)
    }
}
