//! In-memory provider registry keyed by document selector.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lsp_types::{DocumentSelector, GotoDefinitionResponse, Position};

use crate::cancellation::CancellationToken;
use crate::document::TextDocument;
use crate::provider::{Disposable, ProviderCapability, ProviderRegistry, ProviderResult};
use crate::selector::DocumentScope;

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    entries: Vec<Entry>,
}

struct Entry {
    id: u64,
    scope: DocumentScope,
    provider: ProviderCapability,
}

/// Provider registry that answers "who handles this lookup" for a document.
///
/// Clones share the same entries. Later registrations take precedence over
/// earlier ones for documents both match.
#[derive(Clone, Default)]
pub struct LanguageRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl LanguageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The provider for `method` that applies to `document`, if any.
    #[must_use]
    pub fn provider(&self, method: &str, document: &TextDocument) -> Option<ProviderCapability> {
        lock(&self.state)
            .entries
            .iter()
            .rev()
            .find(|entry| {
                entry.provider.method() == method && entry.scope.matches(document)
            })
            .map(|entry| entry.provider.clone())
    }

    /// Runs a goto-family lookup through the matching provider.
    ///
    /// Resolves to [`ProviderResult::Empty`] when no provider applies.
    pub async fn lookup(
        &self,
        method: &str,
        document: &TextDocument,
        position: Position,
        token: CancellationToken,
    ) -> ProviderResult<GotoDefinitionResponse> {
        let Some(provider) = self.provider(method, document) else {
            return ProviderResult::Empty;
        };
        provider
            .location_provider()
            .provide(document.clone(), position, token)
            .await
    }

    /// Selectors currently registered for `method`, oldest first.
    #[must_use]
    pub fn selectors(&self, method: &str) -> Vec<DocumentSelector> {
        lock(&self.state)
            .entries
            .iter()
            .filter(|entry| entry.provider.method() == method)
            .map(|entry| entry.scope.selector().clone())
            .collect()
    }

    /// Number of installed providers.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// Whether no provider is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.state).entries.is_empty()
    }
}

impl ProviderRegistry for LanguageRegistry {
    fn register(&self, scope: DocumentScope, provider: ProviderCapability) -> Disposable {
        let id = {
            let mut state = lock(&self.state);
            state.next_id += 1;
            let id = state.next_id;
            state.entries.push(Entry {
                id,
                scope,
                provider,
            });
            id
        };
        let state = Arc::downgrade(&self.state);
        Disposable::new(move || {
            if let Some(state) = state.upgrade() {
                lock(&state).entries.retain(|entry| entry.id != id);
            }
        })
    }
}

fn lock(state: &Mutex<RegistryState>) -> MutexGuard<'_, RegistryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use futures::FutureExt;
    use lsp_types::request::{GotoDefinition, GotoTypeDefinition, Request};
    use lsp_types::{DocumentFilter, Location, Range, Uri};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::provider::{Provider, ProviderFuture};

    struct Fixed(&'static str);

    impl Provider<GotoDefinitionResponse> for Fixed {
        fn provide(
            &self,
            _document: TextDocument,
            _position: Position,
            _token: CancellationToken,
        ) -> ProviderFuture<GotoDefinitionResponse> {
            let uri = Uri::from_str(self.0).unwrap_or_else(|error| panic!("bad uri: {error}"));
            let location = Location::new(uri, Range::default());
            async move { ProviderResult::Value(GotoDefinitionResponse::Scalar(location)) }.boxed()
        }
    }

    fn language(language: &str) -> DocumentSelector {
        vec![DocumentFilter {
            language: Some(language.to_owned()),
            scheme: None,
            pattern: None,
        }]
    }

    #[fixture]
    fn document() -> TextDocument {
        let uri = Uri::from_str("file:///workspace/main.foo")
            .unwrap_or_else(|error| panic!("bad uri: {error}"));
        TextDocument::new(uri, "foo", 1)
    }

    #[rstest]
    fn finds_providers_by_method_and_selector(document: TextDocument) {
        let registry = LanguageRegistry::new();
        let _definition = registry.register(
            language("foo").into(),
            ProviderCapability::Definition(Arc::new(Fixed("file:///a.foo"))),
        );
        let _other_language = registry.register(
            language("bar").into(),
            ProviderCapability::TypeDefinition(Arc::new(Fixed("file:///b.foo"))),
        );

        assert!(registry.provider(GotoDefinition::METHOD, &document).is_some());
        assert!(registry.provider(GotoTypeDefinition::METHOD, &document).is_none());
    }

    #[rstest]
    fn newest_registration_wins(document: TextDocument) {
        let registry = LanguageRegistry::new();
        let _first = registry.register(
            language("foo").into(),
            ProviderCapability::TypeDefinition(Arc::new(Fixed("file:///first.foo"))),
        );
        let _second = registry.register(
            language("foo").into(),
            ProviderCapability::TypeDefinition(Arc::new(Fixed("file:///second.foo"))),
        );

        let result = registry
            .lookup(
                GotoTypeDefinition::METHOD,
                &document,
                Position::new(0, 0),
                CancellationToken::new(),
            )
            .now_or_never()
            .unwrap_or_else(|| panic!("lookup should be ready"));

        let Some(GotoDefinitionResponse::Scalar(location)) = result.into_option() else {
            panic!("expected a scalar location");
        };
        assert_eq!(location.uri.as_str(), "file:///second.foo");
    }

    #[rstest]
    fn disposing_removes_only_that_entry(document: TextDocument) {
        let registry = LanguageRegistry::new();
        let first = registry.register(
            language("foo").into(),
            ProviderCapability::TypeDefinition(Arc::new(Fixed("file:///first.foo"))),
        );
        let _second = registry.register(
            language("foo").into(),
            ProviderCapability::Definition(Arc::new(Fixed("file:///second.foo"))),
        );

        first.dispose();

        assert_eq!(registry.len(), 1);
        assert!(registry.provider(GotoTypeDefinition::METHOD, &document).is_none());
        assert_eq!(registry.selectors(GotoDefinition::METHOD).len(), 1);
    }

    #[rstest]
    fn bounded_scopes_hide_documents_outside_the_bound(document: TextDocument) {
        let registry = LanguageRegistry::new();
        let _provider = registry.register(
            DocumentScope::new(language("foo")).bounded_by(language("bar")),
            ProviderCapability::TypeDefinition(Arc::new(Fixed("file:///a.foo"))),
        );

        assert!(registry.provider(GotoTypeDefinition::METHOD, &document).is_none());
        assert_eq!(registry.selectors(GotoTypeDefinition::METHOD), vec![language("foo")]);
    }

    #[rstest]
    fn lookups_without_a_provider_are_empty(document: TextDocument) {
        let registry = LanguageRegistry::new();

        let result = registry
            .lookup(
                GotoTypeDefinition::METHOD,
                &document,
                Position::new(0, 0),
                CancellationToken::new(),
            )
            .now_or_never()
            .unwrap_or_else(|| panic!("lookup should be ready"));

        assert_eq!(result, ProviderResult::Empty);
        assert!(registry.is_empty());
    }
}
