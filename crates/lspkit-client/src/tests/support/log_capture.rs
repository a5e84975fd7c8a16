//! In-memory log sink built from the client's telemetry options.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use lspkit_config::ClientOptions;
use lspkit_config::telemetry;
use tracing::subscriber::DefaultGuard;

/// Collects formatted log output for assertions.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Routes this thread's events into the capture until the guard drops.
    pub fn install(&self, options: &ClientOptions) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = telemetry::subscriber(options, move || writer.clone(), false)
            .unwrap_or_else(|error| panic!("log subscriber should build: {error}"));
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything written so far.
    pub fn text(&self) -> String {
        let bytes = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
