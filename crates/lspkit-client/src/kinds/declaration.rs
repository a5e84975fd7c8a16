//! `textDocument/declaration`.

use std::sync::Arc;

use lsp_types::request::{GotoDeclaration, Request};
use lsp_types::{
    DeclarationCapability, GotoDefinitionParams, GotoDefinitionResponse, Position,
    ServerCapabilities,
};

use super::RequestKind;
use crate::capability::{ClientCapabilityBuilder, ProviderAdvertisement};
use crate::document::TextDocument;
use crate::feature::TextDocumentFeature;
use crate::middleware::{Middleware, MiddlewareHook};
use crate::provider::{Provider, ProviderCapability};

/// Go to the declaration of the symbol under the caret.
#[derive(Debug, Clone, Copy, Default)]
pub struct Declaration;

/// The declaration feature.
pub type DeclarationFeature = TextDocumentFeature<Declaration>;

impl RequestKind for Declaration {
    type Params = GotoDefinitionParams;
    type Response = GotoDefinitionResponse;

    const METHOD: &'static str = GotoDeclaration::METHOD;
    const NAME: &'static str = "declaration";

    fn fill_client_capabilities(capabilities: &mut ClientCapabilityBuilder) {
        ClientCapabilityBuilder::enable_goto(&mut capabilities.text_document().declaration);
    }

    fn advertisement(capabilities: &ServerCapabilities) -> ProviderAdvertisement {
        match &capabilities.declaration_provider {
            None => ProviderAdvertisement::Absent,
            Some(DeclarationCapability::Simple(supported)) => {
                ProviderAdvertisement::Flag(*supported)
            }
            Some(DeclarationCapability::RegistrationOptions(options)) => {
                ProviderAdvertisement::Options {
                    document_selector: options
                        .text_document_registration_options
                        .document_selector
                        .clone(),
                    id: options.static_registration_options.id.clone(),
                    options: serde_json::to_value(options).ok(),
                }
            }
            Some(DeclarationCapability::Options(options)) => {
                ProviderAdvertisement::from_options(options)
            }
        }
    }

    fn params(document: &TextDocument, position: Position) -> Self::Params {
        document.goto_params(position)
    }

    fn middleware(middleware: &Middleware) -> Option<MiddlewareHook<Self::Response>> {
        middleware.provide_declaration.clone()
    }

    fn capability(provider: Arc<dyn Provider<Self::Response>>) -> ProviderCapability {
        ProviderCapability::Declaration(provider)
    }
}
