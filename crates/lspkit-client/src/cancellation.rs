//! Per-invocation cancellation signal.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable cancellation signal handed to providers and the transport.
///
/// Every clone observes the same state. Once cancelled a token never resets.
#[derive(Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            state: Arc::new(sender),
        }
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut receiver = self.state.subscribe();
        // `self` keeps the sender alive, so the wait can only end by cancellation.
        let _fired = receiver.wait_for(|cancelled| *cancelled).await.is_ok();
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
