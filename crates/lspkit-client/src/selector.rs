//! Document selector construction and matching.

use lsp_types::{DocumentFilter, DocumentSelector};
use lspkit_config::SelectorEntry;
use regex::Regex;
use tracing::debug;

use crate::document::TextDocument;

const SELECTOR_TARGET: &str = "lspkit_client::selector";

/// Converts configured selector entries into a protocol selector.
#[must_use]
pub fn document_selector(entries: &[SelectorEntry]) -> DocumentSelector {
    entries
        .iter()
        .map(|entry| {
            let parts = entry.parts();
            DocumentFilter {
                language: parts.language.map(str::to_owned),
                scheme: parts.scheme.map(str::to_owned),
                pattern: parts.pattern.map(str::to_owned),
            }
        })
        .collect()
}

/// Whether any filter of the selector matches the document.
///
/// An empty selector matches nothing. Globs are compiled on every call; hold a
/// [`CompiledSelector`] to match repeatedly.
#[must_use]
pub fn matches(selector: &DocumentSelector, document: &TextDocument) -> bool {
    selector
        .iter()
        .any(|filter| filter_matches(filter, document))
}

/// Whether a single filter matches the document.
///
/// Every field present on the filter must match; a filter with no fields
/// matches nothing.
#[must_use]
pub fn filter_matches(filter: &DocumentFilter, document: &TextDocument) -> bool {
    CompiledFilter::new(filter).matches(document)
}

/// A document selector with its glob patterns compiled once.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    selector: DocumentSelector,
    filters: Vec<CompiledFilter>,
}

impl CompiledSelector {
    /// Compiles every filter of `selector`.
    #[must_use]
    pub fn new(selector: DocumentSelector) -> Self {
        let filters = selector.iter().map(CompiledFilter::new).collect();
        Self { selector, filters }
    }

    /// The selector as received.
    #[must_use]
    pub fn selector(&self) -> &DocumentSelector {
        &self.selector
    }

    /// Whether any filter matches the document.
    #[must_use]
    pub fn matches(&self, document: &TextDocument) -> bool {
        self.filters.iter().any(|filter| filter.matches(document))
    }
}

/// Documents a provider may serve.
///
/// A document must match the registration's selector and, when the client
/// was configured with a selector of its own, that selector too. A server
/// cannot widen the client's reach by sending a broader selector.
#[derive(Debug, Clone)]
pub struct DocumentScope {
    selector: CompiledSelector,
    bound: Option<CompiledSelector>,
}

impl DocumentScope {
    /// A scope limited only by `selector`.
    #[must_use]
    pub fn new(selector: DocumentSelector) -> Self {
        Self {
            selector: CompiledSelector::new(selector),
            bound: None,
        }
    }

    /// Narrows the scope to documents also matching `bound`.
    ///
    /// An empty bound leaves the scope unchanged.
    #[must_use]
    pub fn bounded_by(mut self, bound: DocumentSelector) -> Self {
        self.bound = (!bound.is_empty() && bound != *self.selector.selector())
            .then(|| CompiledSelector::new(bound));
        self
    }

    /// The registration's selector.
    #[must_use]
    pub fn selector(&self) -> &DocumentSelector {
        self.selector.selector()
    }

    /// Whether the document falls inside the scope.
    #[must_use]
    pub fn matches(&self, document: &TextDocument) -> bool {
        self.selector.matches(document)
            && self
                .bound
                .as_ref()
                .is_none_or(|bound| bound.matches(document))
    }
}

impl From<DocumentSelector> for DocumentScope {
    fn from(selector: DocumentSelector) -> Self {
        Self::new(selector)
    }
}

#[derive(Debug, Clone)]
struct CompiledFilter {
    language: Option<String>,
    scheme: Option<String>,
    pattern: Option<GlobPattern>,
}

impl CompiledFilter {
    fn new(filter: &DocumentFilter) -> Self {
        Self {
            language: filter.language.clone(),
            scheme: filter.scheme.clone(),
            pattern: filter.pattern.as_deref().map(GlobPattern::new),
        }
    }

    fn matches(&self, document: &TextDocument) -> bool {
        if self.language.is_none() && self.scheme.is_none() && self.pattern.is_none() {
            return false;
        }
        let language_matches = self
            .language
            .as_deref()
            .is_none_or(|language| language == document.language_id());
        let scheme_matches = self
            .scheme
            .as_deref()
            .is_none_or(|scheme| scheme == document.scheme());
        let pattern_matches = self
            .pattern
            .as_ref()
            .is_none_or(|pattern| pattern.matches(document.path()));
        language_matches && scheme_matches && pattern_matches
    }
}

/// A glob compiled to a regex. Patterns without `/` match the file name.
#[derive(Debug, Clone)]
struct GlobPattern {
    regex: Option<Regex>,
    file_name_only: bool,
}

impl GlobPattern {
    fn new(pattern: &str) -> Self {
        let regex = Regex::new(&glob_to_regex(pattern))
            .inspect_err(|error| {
                debug!(
                    target: SELECTOR_TARGET,
                    pattern,
                    error = %error,
                    "ignoring unusable document selector pattern"
                );
            })
            .ok();
        Self {
            regex,
            file_name_only: !pattern.contains('/'),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let subject = if self.file_name_only {
            path.rsplit('/').next().unwrap_or(path)
        } else {
            path
        };
        self.regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(subject))
    }
}

/// Translates glob syntax (`**`, `*`, `?`, `{a,b}`, `[...]`) into an anchored regex.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut regex = String::from("^");
    let mut group_depth = 0_usize;
    let mut index = 0;
    while let Some(&current) = chars.get(index) {
        index += 1;
        match current {
            '*' if chars.get(index) == Some(&'*') => {
                index += 1;
                if chars.get(index) == Some(&'/') {
                    index += 1;
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '{' => {
                group_depth += 1;
                regex.push_str("(?:");
            }
            '}' if group_depth > 0 => {
                group_depth -= 1;
                regex.push(')');
            }
            ',' if group_depth > 0 => regex.push('|'),
            '[' => match character_class(&chars, index) {
                Some((class, next)) => {
                    regex.push_str(&class);
                    index = next;
                }
                None => regex.push_str(r"\["),
            },
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    for _ in 0..group_depth {
        regex.push(')');
    }
    regex.push('$');
    regex
}

/// Reads a `[...]` class starting after the `[`; returns the regex class and
/// the index after the closing `]`.
fn character_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let close = start + chars.get(start..)?.iter().position(|&c| c == ']')?;
    let body = chars.get(start..close)?;
    if body.is_empty() {
        return None;
    }
    let mut class = String::from("[");
    for (offset, &c) in body.iter().enumerate() {
        match c {
            '!' if offset == 0 => class.push('^'),
            '\\' | '[' | '^' | '&' | '~' => {
                class.push('\\');
                class.push(c);
            }
            other => class.push(other),
        }
    }
    class.push(']');
    Some((class, close + 1))
}
