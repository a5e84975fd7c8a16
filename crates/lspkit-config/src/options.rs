//! Client options supplied by the editor integration.
//!
//! Options arrive as JSON (the editor's settings file or an inline object) and
//! describe which documents the client serves, which features are switched
//! off, and how logs are emitted. Every field has a default so an empty object
//! is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{default_log_filter_string, default_log_format};
use crate::features::{FeatureDirective, FeatureMatrix, FeatureOverride};
use crate::logging::LogFormat;

/// Characters that turn a plain selector string into a glob pattern.
const GLOB_METACHARACTERS: [char; 5] = ['*', '?', '[', '{', '/'];

/// One entry of the statically configured document selector.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SelectorEntry {
    /// A bare string: a language id, or a glob when it contains glob syntax.
    Name(String),
    /// An explicit filter; absent fields match anything.
    Filter {
        /// Language identifier, e.g. `rust`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        /// URI scheme, e.g. `file`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scheme: Option<String>,
        /// Glob pattern matched against the document path.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
}

/// Borrowed view of a selector entry split into filter fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterParts<'a> {
    /// Language identifier to match.
    pub language: Option<&'a str>,
    /// URI scheme to match.
    pub scheme: Option<&'a str>,
    /// Glob pattern to match.
    pub pattern: Option<&'a str>,
}

impl SelectorEntry {
    /// Builds an entry matching a language id.
    #[must_use]
    pub fn language(language: impl Into<String>) -> Self {
        Self::Filter {
            language: Some(language.into()),
            scheme: None,
            pattern: None,
        }
    }

    /// Builds an entry matching a glob pattern.
    #[must_use]
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Filter {
            language: None,
            scheme: None,
            pattern: Some(pattern.into()),
        }
    }

    /// Splits the entry into its filter fields.
    #[must_use]
    pub fn parts(&self) -> FilterParts<'_> {
        match self {
            Self::Name(name) if name.contains(GLOB_METACHARACTERS) => FilterParts {
                pattern: Some(name.as_str()),
                ..FilterParts::default()
            },
            Self::Name(name) => FilterParts {
                language: Some(name.as_str()),
                ..FilterParts::default()
            },
            Self::Filter {
                language,
                scheme,
                pattern,
            } => FilterParts {
                language: language.as_deref(),
                scheme: scheme.as_deref(),
                pattern: pattern.as_deref(),
            },
        }
    }
}

/// Errors raised while loading [`ClientOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The options file could not be read.
    #[error("failed to read client options from '{path}': {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The options document was not valid.
    #[error("failed to parse client options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Options controlling a language client session.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    /// Documents this client was activated for.
    pub document_selector: Vec<SelectorEntry>,
    /// Ordered `feature=override` directives; later entries win.
    pub features: Vec<FeatureDirective>,
    log_filter: String,
    log_format: LogFormat,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            document_selector: Vec::new(),
            features: Vec::new(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl ClientOptions {
    /// Parses options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Parse`] when the document is malformed.
    pub fn from_json_str(input: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Reads and parses options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Read`] when the file cannot be read and
    /// [`OptionsError::Parse`] when its contents are malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Replaces the document selector.
    #[must_use]
    pub fn with_document_selector(mut self, selector: Vec<SelectorEntry>) -> Self {
        self.document_selector = selector;
        self
    }

    /// Appends a directive.
    #[must_use]
    pub fn with_feature_directive(mut self, directive: FeatureDirective) -> Self {
        self.features.push(directive);
        self
    }

    /// Appends a `deny` directive for the named feature.
    #[must_use]
    pub fn with_disabled_feature(self, feature: impl Into<String>) -> Self {
        self.with_feature_directive(FeatureDirective::new(feature, FeatureOverride::Deny))
    }

    /// Effective override per feature after applying every directive.
    #[must_use]
    pub fn feature_matrix(&self) -> FeatureMatrix {
        FeatureMatrix::from_directives(&self.features)
    }

    /// Whether the named feature is switched off.
    #[must_use]
    pub fn is_feature_disabled(&self, feature: &str) -> bool {
        self.feature_matrix().is_denied(feature)
    }

    /// Log filter expression (`tracing-subscriber` `EnvFilter` syntax).
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
