//! Per-feature enablement directives.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Directive applied to a client feature before the session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FeatureOverride {
    /// Let the server's capabilities decide (default behaviour).
    #[default]
    Allow,
    /// Never advertise or register the feature, whatever the server says.
    Deny,
}

/// Errors produced when parsing [`FeatureDirective`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureDirectiveParseError {
    /// The `=` between feature name and override was missing.
    #[error("directive '{0}' is missing the override assignment '='")]
    MissingAssignment(String),
    /// The feature name was empty.
    #[error("directive '{0}' does not name a feature")]
    MissingFeature(String),
    /// The override could not be parsed.
    #[error("unsupported feature override '{0}'")]
    InvalidOverride(String),
}

/// A single `feature=override` directive, e.g. `typeDefinition=deny`.
///
/// Serialised as the directive string.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureDirective {
    /// Feature name such as `typeDefinition`.
    pub feature: String,
    /// Override applied to the feature.
    pub directive: FeatureOverride,
}

impl FeatureDirective {
    /// Creates a new directive.
    #[must_use]
    pub fn new(feature: impl Into<String>, directive: FeatureOverride) -> Self {
        Self {
            feature: feature.into(),
            directive,
        }
    }
}

impl fmt::Display for FeatureDirective {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}={}", self.feature, self.directive)
    }
}

impl FromStr for FeatureDirective {
    type Err = FeatureDirectiveParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (feature, directive) = input
            .split_once('=')
            .ok_or_else(|| FeatureDirectiveParseError::MissingAssignment(input.to_owned()))?;
        if feature.trim().is_empty() {
            return Err(FeatureDirectiveParseError::MissingFeature(input.to_owned()));
        }
        let directive = FeatureOverride::from_str(directive.trim()).map_err(|_| {
            FeatureDirectiveParseError::InvalidOverride(directive.trim().to_owned())
        })?;
        Ok(Self::new(feature.trim(), directive))
    }
}

impl TryFrom<String> for FeatureDirective {
    type Error = FeatureDirectiveParseError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl From<FeatureDirective> for String {
    fn from(directive: FeatureDirective) -> Self {
        directive.to_string()
    }
}

/// Effective overrides keyed by normalised feature name.
///
/// Built from an ordered directive list, so an `allow` can lift an earlier
/// `deny` for the same feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureMatrix {
    overrides: BTreeMap<String, FeatureOverride>,
}

impl FeatureMatrix {
    /// Builds a matrix from an iterator of directives; later directives win.
    #[must_use]
    pub fn from_directives<'a, I>(directives: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureDirective>,
    {
        let mut matrix = Self::default();
        for directive in directives {
            matrix.set_override(directive.feature.clone(), directive.directive);
        }
        matrix
    }

    /// Stores or updates the override for a feature.
    pub fn set_override(&mut self, feature: impl Into<String>, directive: FeatureOverride) {
        self.overrides
            .insert(normalise_key(&feature.into()), directive);
    }

    /// Retrieves the override for a feature, when present.
    #[must_use]
    pub fn override_for(&self, feature: &str) -> Option<FeatureOverride> {
        self.overrides.get(&normalise_key(feature)).copied()
    }

    /// Whether the feature has been denied.
    #[must_use]
    pub fn is_denied(&self, feature: &str) -> bool {
        self.override_for(feature) == Some(FeatureOverride::Deny)
    }

    /// Whether no overrides are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

// Feature names are camelCase on the wire; comparisons ignore case and padding.
fn normalise_key(key: &str) -> String {
    key.trim().to_lowercase()
}
