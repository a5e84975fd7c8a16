//! Configuration for language client sessions.
//!
//! Holds the options an editor integration hands to the client: the static
//! document selector, per-feature overrides, and logging settings. The
//! [`telemetry`] module turns the logging settings into a `tracing`
//! subscriber.
#![deny(missing_docs)]

mod defaults;
mod features;
mod logging;
mod options;
pub mod telemetry;

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use features::{FeatureDirective, FeatureDirectiveParseError, FeatureMatrix, FeatureOverride};
pub use logging::{LogFormat, LogFormatParseError};
pub use options::{ClientOptions, FilterParts, OptionsError, SelectorEntry};
