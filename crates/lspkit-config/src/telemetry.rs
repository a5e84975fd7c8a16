//! Structured log subscriber construction for client hosts.
//!
//! [`subscriber`] builds a subscriber from [`ClientOptions`] for any writer,
//! which lets hosts and tests scope logging with
//! `tracing::subscriber::with_default`. [`initialise`] installs one writing to
//! stderr as the process-wide default.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter, time::UtcTime};

use crate::logging::LogFormat;
use crate::options::ClientOptions;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// A boxed subscriber ready to install.
pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Handle returned once telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression did not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// The rejected expression.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// The global subscriber could not be installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Builds a subscriber honouring the options' filter and format.
///
/// ANSI colours are only used when `ansi` is set; editors usually capture
/// the stream into a plain text pane.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an invalid filter expression.
pub fn subscriber<W>(
    options: &ClientOptions,
    writer: W,
    ansi: bool,
) -> Result<BoxedSubscriber, TelemetryError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(options.log_filter()).map_err(|error| {
        TelemetryError::Filter {
            filter: options.log_filter().to_owned(),
            message: error.to_string(),
        }
    })?;
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(UtcTime::rfc_3339());
    let built: BoxedSubscriber = match options.log_format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    };
    Ok(built)
}

/// Installs a stderr subscriber as the global default on first use.
///
/// Editors reserve stdout for the protocol. Later calls return a fresh
/// [`TelemetryHandle`] without touching the global subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an invalid filter expression and
/// [`TelemetryError::Subscriber`] when another subscriber already owns the
/// process.
pub fn initialise(options: &ClientOptions) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            let installed = subscriber(options, io::stderr, io::stderr().is_terminal())?;
            tracing::subscriber::set_global_default(installed).map_err(TelemetryError::Subscriber)
        })
        .map(|_| TelemetryHandle)
}
