//! Capability negotiation: what the client declares and what the server advertises.

use lsp_types::{
    ClientCapabilities, DocumentSelector, GotoCapability, StaticTextDocumentRegistrationOptions,
    TextDocumentClientCapabilities,
};
use serde::Serialize;
use serde_json::Value;

/// Returns the value in `slot`, inserting a default first when it is empty.
///
/// Existing values are never replaced, so repeated calls hand back the same
/// value.
pub fn ensure<T: Default>(slot: &mut Option<T>) -> &mut T {
    slot.get_or_insert_with(T::default)
}

/// Accumulates the client capabilities sent in the `initialize` request.
///
/// Features write their flags through the builder during session
/// construction; [`ClientCapabilityBuilder::build`] then freezes the result
/// for the handshake.
#[derive(Debug, Clone, Default)]
pub struct ClientCapabilityBuilder {
    capabilities: ClientCapabilities,
}

impl ClientCapabilityBuilder {
    /// Starts from empty capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from capabilities declared elsewhere, keeping their contents.
    #[must_use]
    pub fn from_capabilities(capabilities: ClientCapabilities) -> Self {
        Self { capabilities }
    }

    /// The `textDocument` section, created on first access.
    pub fn text_document(&mut self) -> &mut TextDocumentClientCapabilities {
        ensure(&mut self.capabilities.text_document)
    }

    /// Marks a goto-family capability as supporting dynamic registration and
    /// `LocationLink` results.
    pub fn enable_goto(slot: &mut Option<GotoCapability>) {
        let support = ensure(slot);
        support.dynamic_registration = Some(true);
        support.link_support = Some(true);
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> ClientCapabilities {
        self.capabilities
    }
}

/// How the server advertised one request kind in its `initialize` result.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderAdvertisement {
    /// The server did not mention the request kind.
    Absent,
    /// The server answered with a plain boolean.
    Flag(bool),
    /// The server answered with an options object.
    Options {
        /// Selector supplied by the server, if any.
        document_selector: Option<DocumentSelector>,
        /// Registration id supplied by the server, if any.
        id: Option<String>,
        /// The raw options, kept for the registration record.
        options: Option<Value>,
    },
}

impl ProviderAdvertisement {
    /// Builds an advertisement from static text document registration options.
    #[must_use]
    pub fn from_static(options: &StaticTextDocumentRegistrationOptions) -> Self {
        Self::Options {
            document_selector: options.document_selector.clone(),
            id: options.id.clone(),
            options: raw_options(options),
        }
    }

    /// Builds an advertisement from options that carry neither selector nor id.
    #[must_use]
    pub fn from_options<O: Serialize>(options: &O) -> Self {
        Self::Options {
            document_selector: None,
            id: None,
            options: raw_options(options),
        }
    }

    /// Whether the server claims support at all.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        match self {
            Self::Absent | Self::Flag(false) => false,
            Self::Flag(true) | Self::Options { .. } => true,
        }
    }
}

fn raw_options<O: Serialize>(options: &O) -> Option<Value> {
    serde_json::to_value(options)
        .ok()
        .filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use lsp_types::HoverClientCapabilities;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn ensure_returns_the_same_value_on_repeat() {
        let mut builder = ClientCapabilityBuilder::new();

        let first: *const TextDocumentClientCapabilities = builder.text_document();
        let second: *const TextDocumentClientCapabilities = builder.text_document();

        assert!(std::ptr::eq(first, second));
    }

    #[rstest]
    fn ensure_keeps_existing_sections() {
        let mut capabilities = ClientCapabilities::default();
        ensure(&mut capabilities.text_document).hover = Some(HoverClientCapabilities {
            dynamic_registration: Some(false),
            content_format: None,
        });
        let mut builder = ClientCapabilityBuilder::from_capabilities(capabilities);

        ClientCapabilityBuilder::enable_goto(&mut builder.text_document().type_definition);
        let built = builder.build();

        let text_document = built
            .text_document
            .unwrap_or_else(|| panic!("textDocument section missing"));
        assert!(text_document.hover.is_some(), "hover support was clobbered");
        assert_eq!(
            text_document.type_definition,
            Some(GotoCapability {
                dynamic_registration: Some(true),
                link_support: Some(true),
            })
        );
    }

    #[rstest]
    fn builds_the_wire_shape() {
        let mut builder = ClientCapabilityBuilder::new();
        ClientCapabilityBuilder::enable_goto(&mut builder.text_document().type_definition);

        let value = serde_json::to_value(builder.build())
            .unwrap_or_else(|error| panic!("capabilities should serialise: {error}"));

        assert_eq!(
            value.pointer("/textDocument/typeDefinition"),
            Some(&serde_json::json!({"dynamicRegistration": true, "linkSupport": true}))
        );
    }

    #[rstest]
    #[case(ProviderAdvertisement::Absent, false)]
    #[case(ProviderAdvertisement::Flag(false), false)]
    #[case(ProviderAdvertisement::Flag(true), true)]
    #[case(
        ProviderAdvertisement::from_static(&StaticTextDocumentRegistrationOptions {
            document_selector: None,
            id: None,
        }),
        true
    )]
    fn reports_support(#[case] advertisement: ProviderAdvertisement, #[case] expected: bool) {
        assert_eq!(advertisement.is_supported(), expected);
    }
}
