//! Shared fixtures and helpers for client feature tests.

mod log_capture;
mod recording_client;
mod world;

use lsp_types::{GotoDefinitionResponse, Position};
use rstest::fixture;
use serde_json::Value;

pub use log_capture::LogCapture;
pub use recording_client::{RecordingClient, Reply};
pub use world::{TestWorld, document, first_uri, location};

/// Common document used by unit tests.
#[fixture]
pub fn sample_document() -> crate::document::TextDocument {
    document("file:///workspace/main.foo")
}

/// Caret position used by unit tests.
#[fixture]
pub fn sample_position() -> Position {
    Position::new(3, 5)
}

/// Raw server result holding a single location.
#[must_use]
pub fn location_result(value: &str) -> Value {
    serde_json::to_value(GotoDefinitionResponse::Scalar(location(value)))
        .unwrap_or_else(|error| panic!("location should serialise: {error}"))
}
