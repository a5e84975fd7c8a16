//! Per-request-kind glue between the generic feature and the protocol.
//!
//! Each kind names its wire method, the client capability slot it fills, the
//! server capability it reads, and the middleware slot that may wrap it. The
//! rest of the lifecycle is shared by [`crate::TextDocumentFeature`].

mod declaration;
mod definition;
mod implementation;
mod type_definition;

use std::sync::Arc;

use lsp_types::{Position, ServerCapabilities};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::capability::{ClientCapabilityBuilder, ProviderAdvertisement};
use crate::document::TextDocument;
use crate::middleware::{Middleware, MiddlewareHook};
use crate::provider::{Provider, ProviderCapability};

pub use self::declaration::{Declaration, DeclarationFeature};
pub use self::definition::{Definition, DefinitionFeature};
pub use self::implementation::{Implementation, ImplementationFeature};
pub use self::type_definition::{TypeDefinition, TypeDefinitionFeature};

/// A text document request kind served through a provider.
pub trait RequestKind: Send + Sync + 'static {
    /// Request parameters on the wire.
    type Params: Serialize + Send;
    /// Decoded non-null result.
    type Response: DeserializeOwned + Send + 'static;

    /// Wire method, e.g. `textDocument/typeDefinition`.
    const METHOD: &'static str;
    /// Short name used by configuration, e.g. `typeDefinition`.
    const NAME: &'static str;

    /// Declares the client's support for this kind.
    fn fill_client_capabilities(capabilities: &mut ClientCapabilityBuilder);

    /// Reads the server's advertisement for this kind.
    fn advertisement(capabilities: &ServerCapabilities) -> ProviderAdvertisement;

    /// Builds the request parameters for a lookup.
    fn params(document: &TextDocument, position: Position) -> Self::Params;

    /// The configured hook for this kind, if any.
    fn middleware(middleware: &Middleware) -> Option<MiddlewareHook<Self::Response>>;

    /// Tags a provider for the provider registry.
    fn capability(provider: Arc<dyn Provider<Self::Response>>) -> ProviderCapability;
}
