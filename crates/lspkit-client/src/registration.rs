//! Resolution of server advertisements into concrete registrations.

use std::sync::atomic::{AtomicU64, Ordering};

use lsp_types::DocumentSelector;
use serde_json::Value;

use crate::capability::ProviderAdvertisement;
use crate::selector::DocumentScope;

static REGISTRATION_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a process-unique registration id for a method.
fn next_registration_id(method: &str) -> String {
    let id = REGISTRATION_ID.fetch_add(1, Ordering::Relaxed);
    format!("{method}#{id}")
}

/// An active binding of a feature to a document selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// Identifier used to unregister; supplied by the server or synthesised.
    pub id: String,
    /// Documents the provider applies to.
    pub document_selector: DocumentSelector,
    /// The client's configured selector. When non-empty, documents must also
    /// match it.
    pub client_selector: DocumentSelector,
    /// Options the server attached, if any.
    pub options: Option<Value>,
}

impl Registration {
    /// Documents the registration serves.
    #[must_use]
    pub fn scope(&self) -> DocumentScope {
        DocumentScope::new(self.document_selector.clone()).bounded_by(self.client_selector.clone())
    }

    /// Whether both registrations bind the same documents with the same options.
    #[must_use]
    pub fn same_binding(&self, other: &Self) -> bool {
        self.document_selector == other.document_selector
            && self.client_selector == other.client_selector
            && self.options == other.options
    }
}

/// Decides whether and how a feature registers for the session.
///
/// Returns `None` when the server does not advertise the request kind. A
/// missing selector falls back to `static_selector` verbatim. A missing id
/// reuses the id of `active` when the binding is unchanged and is otherwise
/// synthesised.
#[must_use]
pub fn resolve_registration(
    method: &str,
    advertisement: ProviderAdvertisement,
    static_selector: &DocumentSelector,
    active: Option<&Registration>,
) -> Option<Registration> {
    let (id, document_selector, options) = match advertisement {
        ProviderAdvertisement::Absent | ProviderAdvertisement::Flag(false) => return None,
        ProviderAdvertisement::Flag(true) => (None, None, None),
        ProviderAdvertisement::Options {
            document_selector,
            id,
            options,
        } => (id, document_selector, options),
    };
    let mut registration = Registration {
        id: String::new(),
        document_selector: document_selector.unwrap_or_else(|| static_selector.clone()),
        client_selector: static_selector.clone(),
        options,
    };
    registration.id = match id {
        Some(id) => id,
        None => active
            .filter(|active| active.same_binding(&registration))
            .map_or_else(|| next_registration_id(method), |active| active.id.clone()),
    };
    Some(registration)
}

#[cfg(test)]
mod tests {
    use lsp_types::DocumentFilter;
    use rstest::{fixture, rstest};

    use super::*;

    const METHOD: &str = "textDocument/typeDefinition";

    #[fixture]
    fn static_selector() -> DocumentSelector {
        vec![DocumentFilter {
            language: None,
            scheme: None,
            pattern: Some(String::from("*.foo")),
        }]
    }

    #[rstest]
    #[case(ProviderAdvertisement::Absent)]
    #[case(ProviderAdvertisement::Flag(false))]
    fn unsupported_advertisements_do_not_register(
        static_selector: DocumentSelector,
        #[case] advertisement: ProviderAdvertisement,
    ) {
        assert_eq!(resolve_registration(METHOD, advertisement, &static_selector, None), None);
    }

    #[rstest]
    fn boolean_support_uses_the_static_selector(static_selector: DocumentSelector) {
        let registration =
            resolve_registration(METHOD, ProviderAdvertisement::Flag(true), &static_selector, None)
                .unwrap_or_else(|| panic!("expected a registration"));

        assert_eq!(registration.document_selector, static_selector);
        assert!(registration.id.starts_with(METHOD));
        assert_eq!(registration.options, None);
    }

    #[rstest]
    fn options_without_selector_inherit_the_static_selector(static_selector: DocumentSelector) {
        let advertisement = ProviderAdvertisement::Options {
            document_selector: None,
            id: Some(String::from("server-id")),
            options: None,
        };

        let registration = resolve_registration(METHOD, advertisement, &static_selector, None)
            .unwrap_or_else(|| panic!("expected a registration"));

        assert_eq!(registration.id, "server-id");
        assert_eq!(registration.document_selector, static_selector);
    }

    #[rstest]
    fn server_selectors_are_kept(static_selector: DocumentSelector) {
        let server_selector = vec![DocumentFilter {
            language: Some(String::from("foo")),
            scheme: Some(String::from("file")),
            pattern: None,
        }];
        let advertisement = ProviderAdvertisement::Options {
            document_selector: Some(server_selector.clone()),
            id: None,
            options: Some(serde_json::json!({"documentSelector": []})),
        };

        let registration = resolve_registration(METHOD, advertisement, &static_selector, None)
            .unwrap_or_else(|| panic!("expected a registration"));

        assert_eq!(registration.document_selector, server_selector);
        assert_eq!(registration.client_selector, static_selector);
        assert!(registration.options.is_some());
    }

    #[rstest]
    fn synthesised_ids_are_unique(static_selector: DocumentSelector) {
        let first = resolve_registration(METHOD, ProviderAdvertisement::Flag(true), &static_selector, None);
        let second =
            resolve_registration(METHOD, ProviderAdvertisement::Flag(true), &static_selector, None);

        assert_ne!(
            first.map(|registration| registration.id),
            second.map(|registration| registration.id)
        );
    }

    #[rstest]
    fn unchanged_advertisements_keep_the_active_id(static_selector: DocumentSelector) {
        let active =
            resolve_registration(METHOD, ProviderAdvertisement::Flag(true), &static_selector, None)
                .unwrap_or_else(|| panic!("expected a registration"));

        let repeated = resolve_registration(
            METHOD,
            ProviderAdvertisement::Flag(true),
            &static_selector,
            Some(&active),
        );

        assert_eq!(repeated, Some(active));
    }

    #[rstest]
    fn changed_advertisements_get_a_fresh_id(static_selector: DocumentSelector) {
        let active =
            resolve_registration(METHOD, ProviderAdvertisement::Flag(true), &static_selector, None)
                .unwrap_or_else(|| panic!("expected a registration"));
        let advertisement = ProviderAdvertisement::Options {
            document_selector: Some(Vec::new()),
            id: None,
            options: None,
        };

        let changed = resolve_registration(METHOD, advertisement, &static_selector, Some(&active))
            .unwrap_or_else(|| panic!("expected a registration"));

        assert_ne!(changed.id, active.id);
    }
}
