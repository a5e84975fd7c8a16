//! User-supplied interceptors around the default request behaviour.
//!
//! A hook receives the invocation and a [`Next`] continuation. It may call the
//! continuation once (the usual case), several times, or not at all, and may
//! rewrite whatever the continuation returns. Hooks only shape individual
//! calls; they play no part in registration.

use std::fmt;
use std::sync::Arc;

use lsp_types::{GotoDefinitionResponse, Position};

use crate::cancellation::CancellationToken;
use crate::document::TextDocument;
use crate::provider::ProviderFuture;

/// Arguments of a single provider call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Document the lookup runs in.
    pub document: TextDocument,
    /// Caret position.
    pub position: Position,
    /// Cancellation signal for this call.
    pub token: CancellationToken,
}

/// The default behaviour, handed to hooks as a continuation.
pub struct Next<T> {
    run: Arc<dyn Fn(Invocation) -> ProviderFuture<T> + Send + Sync>,
}

impl<T> Next<T> {
    /// Wraps a default-behaviour function.
    pub fn new(run: impl Fn(Invocation) -> ProviderFuture<T> + Send + Sync + 'static) -> Self {
        Self { run: Arc::new(run) }
    }

    /// Runs the default behaviour for `invocation`.
    pub fn run(&self, invocation: Invocation) -> ProviderFuture<T> {
        (self.run)(invocation)
    }
}

impl<T> Clone for Next<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Next<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Next")
    }
}

/// An interceptor for one request kind.
pub type MiddlewareHook<T> = Arc<dyn Fn(Invocation, Next<T>) -> ProviderFuture<T> + Send + Sync>;

/// Interceptors configured on the client, one optional slot per request kind.
#[derive(Clone, Default)]
pub struct Middleware {
    /// Wraps `textDocument/typeDefinition`.
    pub provide_type_definition: Option<MiddlewareHook<GotoDefinitionResponse>>,
    /// Wraps `textDocument/definition`.
    pub provide_definition: Option<MiddlewareHook<GotoDefinitionResponse>>,
    /// Wraps `textDocument/implementation`.
    pub provide_implementation: Option<MiddlewareHook<GotoDefinitionResponse>>,
    /// Wraps `textDocument/declaration`.
    pub provide_declaration: Option<MiddlewareHook<GotoDefinitionResponse>>,
}

impl Middleware {
    /// Installs the type definition hook.
    #[must_use]
    pub fn with_type_definition(
        mut self,
        hook: impl Fn(Invocation, Next<GotoDefinitionResponse>) -> ProviderFuture<GotoDefinitionResponse>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.provide_type_definition = Some(Arc::new(hook));
        self
    }

    /// Installs the definition hook.
    #[must_use]
    pub fn with_definition(
        mut self,
        hook: impl Fn(Invocation, Next<GotoDefinitionResponse>) -> ProviderFuture<GotoDefinitionResponse>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.provide_definition = Some(Arc::new(hook));
        self
    }

    /// Installs the implementation hook.
    #[must_use]
    pub fn with_implementation(
        mut self,
        hook: impl Fn(Invocation, Next<GotoDefinitionResponse>) -> ProviderFuture<GotoDefinitionResponse>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.provide_implementation = Some(Arc::new(hook));
        self
    }

    /// Installs the declaration hook.
    #[must_use]
    pub fn with_declaration(
        mut self,
        hook: impl Fn(Invocation, Next<GotoDefinitionResponse>) -> ProviderFuture<GotoDefinitionResponse>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.provide_declaration = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Middleware")
            .field("provide_type_definition", &self.provide_type_definition.is_some())
            .field("provide_definition", &self.provide_definition.is_some())
            .field("provide_implementation", &self.provide_implementation.is_some())
            .field("provide_declaration", &self.provide_declaration.is_some())
            .finish()
    }
}
