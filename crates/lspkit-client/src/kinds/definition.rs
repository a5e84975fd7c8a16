//! `textDocument/definition`.

use std::sync::Arc;

use lsp_types::request::{GotoDefinition, Request};
use lsp_types::{GotoDefinitionParams, GotoDefinitionResponse, OneOf, Position, ServerCapabilities};

use super::RequestKind;
use crate::capability::{ClientCapabilityBuilder, ProviderAdvertisement};
use crate::document::TextDocument;
use crate::feature::TextDocumentFeature;
use crate::middleware::{Middleware, MiddlewareHook};
use crate::provider::{Provider, ProviderCapability};

/// Go to the definition of the symbol under the caret.
#[derive(Debug, Clone, Copy, Default)]
pub struct Definition;

/// The definition feature.
pub type DefinitionFeature = TextDocumentFeature<Definition>;

impl RequestKind for Definition {
    type Params = GotoDefinitionParams;
    type Response = GotoDefinitionResponse;

    const METHOD: &'static str = GotoDefinition::METHOD;
    const NAME: &'static str = "definition";

    fn fill_client_capabilities(capabilities: &mut ClientCapabilityBuilder) {
        ClientCapabilityBuilder::enable_goto(&mut capabilities.text_document().definition);
    }

    // Definition options carry neither a selector nor an id.
    fn advertisement(capabilities: &ServerCapabilities) -> ProviderAdvertisement {
        match &capabilities.definition_provider {
            None => ProviderAdvertisement::Absent,
            Some(OneOf::Left(supported)) => ProviderAdvertisement::Flag(*supported),
            Some(OneOf::Right(options)) => ProviderAdvertisement::from_options(options),
        }
    }

    fn params(document: &TextDocument, position: Position) -> Self::Params {
        document.goto_params(position)
    }

    fn middleware(middleware: &Middleware) -> Option<MiddlewareHook<Self::Response>> {
        middleware.provide_definition.clone()
    }

    fn capability(provider: Arc<dyn Provider<Self::Response>>) -> ProviderCapability {
        ProviderCapability::Definition(provider)
    }
}
