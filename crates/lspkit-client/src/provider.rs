//! Provider objects installed into the editor's provider registry.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use lsp_types::request::{
    GotoDeclaration, GotoDefinition, GotoImplementation, GotoTypeDefinition, Request,
};
use lsp_types::{GotoDefinitionResponse, Position};

use crate::cancellation::CancellationToken;
use crate::document::TextDocument;
use crate::selector::DocumentScope;

/// Outcome of a provider invocation. Errors are never represented here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResult<T> {
    /// The server produced a result.
    Value(T),
    /// Nothing to show: the server returned `null`, or the request failed and
    /// the failure was logged.
    Empty,
    /// The invocation was cancelled before a result arrived.
    Cancelled,
}

impl<T> ProviderResult<T> {
    /// Returns the value, treating `Empty` and `Cancelled` alike.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty | Self::Cancelled => None,
        }
    }

    /// Borrows the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty | Self::Cancelled => None,
        }
    }

    /// Whether the invocation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Maps the contained value.
    pub fn map<U>(self, map: impl FnOnce(T) -> U) -> ProviderResult<U> {
        match self {
            Self::Value(value) => ProviderResult::Value(map(value)),
            Self::Empty => ProviderResult::Empty,
            Self::Cancelled => ProviderResult::Cancelled,
        }
    }
}

/// Future returned by providers; owns everything it needs.
pub type ProviderFuture<T> = BoxFuture<'static, ProviderResult<T>>;

/// A lookup provider for one request kind.
pub trait Provider<T>: Send + Sync {
    /// Answers a lookup at `position` in `document`.
    fn provide(
        &self,
        document: TextDocument,
        position: Position,
        token: CancellationToken,
    ) -> ProviderFuture<T>;
}

/// Shared handle to a goto-family provider.
pub type LocationProvider = Arc<dyn Provider<GotoDefinitionResponse>>;

/// Provider tagged with the request kind it serves.
#[derive(Clone)]
pub enum ProviderCapability {
    /// `textDocument/typeDefinition`.
    TypeDefinition(LocationProvider),
    /// `textDocument/definition`.
    Definition(LocationProvider),
    /// `textDocument/implementation`.
    Implementation(LocationProvider),
    /// `textDocument/declaration`.
    Declaration(LocationProvider),
}

impl ProviderCapability {
    /// Request method served by the provider.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::TypeDefinition(_) => GotoTypeDefinition::METHOD,
            Self::Definition(_) => GotoDefinition::METHOD,
            Self::Implementation(_) => GotoImplementation::METHOD,
            Self::Declaration(_) => GotoDeclaration::METHOD,
        }
    }

    /// The goto-family provider behind the tag.
    #[must_use]
    pub fn location_provider(&self) -> &LocationProvider {
        match self {
            Self::TypeDefinition(provider)
            | Self::Definition(provider)
            | Self::Implementation(provider)
            | Self::Declaration(provider) => provider,
        }
    }
}

impl fmt::Debug for ProviderCapability {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("ProviderCapability")
            .field(&self.method())
            .finish()
    }
}

/// Removes an installed provider when disposed or dropped.
#[must_use = "dropping a Disposable removes what it guards"]
pub struct Disposable {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Disposable {
    /// Wraps the action that undoes an installation.
    pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A disposable with nothing to undo.
    pub fn noop() -> Self {
        Self { dispose: None }
    }

    /// Runs the undo action now.
    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Disposable {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Disposable")
            .field("pending", &self.dispose.is_some())
            .finish()
    }
}

/// The editor's provider registry.
pub trait ProviderRegistry: Send + Sync {
    /// Installs `provider` for documents inside `scope`.
    ///
    /// Disposing the returned handle must remove the provider again.
    fn register(&self, scope: DocumentScope, provider: ProviderCapability) -> Disposable;
}
