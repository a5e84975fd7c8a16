//! Open editor documents and their protocol conversions.

use lsp_types::{
    GotoDefinitionParams, PartialResultParams, Position, TextDocumentIdentifier,
    TextDocumentPositionParams, Uri, WorkDoneProgressParams,
};
use percent_encoding::percent_decode_str;
use url::Url;

/// A document open in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    uri: Uri,
    language_id: String,
    version: i32,
    scheme: String,
    path: String,
}

impl TextDocument {
    /// Describes an open document.
    #[must_use]
    pub fn new(uri: Uri, language_id: impl Into<String>, version: i32) -> Self {
        let (scheme, path) = split_uri(&uri);
        Self {
            uri,
            language_id: language_id.into(),
            version,
            scheme,
            path,
        }
    }

    /// Document URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Language identifier, e.g. `rust`.
    #[must_use]
    pub fn language_id(&self) -> &str {
        self.language_id.as_str()
    }

    /// Editor version counter.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// URI scheme, e.g. `file`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.scheme.as_str()
    }

    /// Percent-decoded path component of the URI, without query or fragment.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Identifier sent with every text document request.
    #[must_use]
    pub fn identifier(&self) -> TextDocumentIdentifier {
        TextDocumentIdentifier {
            uri: self.uri.clone(),
        }
    }

    /// Text-document-position params for a caret position.
    #[must_use]
    pub fn position_params(&self, position: Position) -> TextDocumentPositionParams {
        TextDocumentPositionParams {
            text_document: self.identifier(),
            position,
        }
    }

    /// Params shared by the goto family of requests.
    #[must_use]
    pub fn goto_params(&self, position: Position) -> GotoDefinitionParams {
        GotoDefinitionParams {
            text_document_position_params: self.position_params(position),
            work_done_progress_params: WorkDoneProgressParams::default(),
            partial_result_params: PartialResultParams::default(),
        }
    }
}

/// Scheme and decoded path of a URI; both empty when the URI does not parse.
fn split_uri(uri: &Uri) -> (String, String) {
    Url::parse(uri.as_str()).map_or_else(
        |_| (String::new(), String::new()),
        |url| {
            let path = percent_decode_str(url.path())
                .decode_utf8_lossy()
                .into_owned();
            (url.scheme().to_owned(), path)
        },
    )
}
