//! Language Server Protocol client features for the goto family of requests.
#![deny(missing_docs)]
//!
//! Each feature declares its client capability, registers a provider with the
//! editor when the server advertises support (statically in the `initialize`
//! result or later through `client/registerCapability`), and answers lookups
//! by sending the request over a [`LanguageClient`]. Lookups may be wrapped by
//! user [`Middleware`]. Transport failures are logged and surface as an empty
//! result; cancellation surfaces as [`ProviderResult::Cancelled`].
//!
//! [`FeatureHost`] wires the built-in features for type definition,
//! definition, implementation and declaration into one session.

mod cancellation;
mod capability;
mod client;
mod dispatch;
mod document;
mod errors;
mod feature;
mod host;
mod kinds;
mod middleware;
mod provider;
mod registration;
mod registry;
mod selector;

pub use cancellation::CancellationToken;
pub use capability::{ClientCapabilityBuilder, ProviderAdvertisement, ensure};
pub use client::{LanguageClient, log_failed_request};
pub use dispatch::Dispatcher;
pub use document::TextDocument;
pub use errors::{
    CONTENT_MODIFIED, FeatureError, METHOD_NOT_FOUND, REQUEST_CANCELLED, RequestError,
    SERVER_CANCELLED,
};
pub use feature::{DynamicFeature, TextDocumentFeature};
pub use host::FeatureHost;
pub use kinds::{
    Declaration, DeclarationFeature, Definition, DefinitionFeature, Implementation,
    ImplementationFeature, RequestKind, TypeDefinition, TypeDefinitionFeature,
};
pub use middleware::{Invocation, Middleware, MiddlewareHook, Next};
pub use provider::{
    Disposable, LocationProvider, Provider, ProviderCapability, ProviderFuture, ProviderRegistry,
    ProviderResult,
};
pub use registration::{Registration, resolve_registration};
pub use registry::LanguageRegistry;
pub use selector::{
    CompiledSelector, DocumentScope, document_selector, filter_matches, matches,
};

#[cfg(test)]
mod tests;
