//! Log output settings shared by client hosts.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported log output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output, suited to an editor's output pane.
    #[default]
    Compact,
    /// Structured JSON for log collectors.
    Json,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;
