//! Seam between the loop and the broker client.

use std::time::Duration;

use async_trait::async_trait;

use crate::poll::PollOutcome;

/// An active subscription that can be polled for messages.
///
/// Exclusively owned by the loop that runs it; no concurrent mutation occurs.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait up to `wait` for the next message. Must never block indefinitely.
    async fn poll(&mut self, wait: Duration) -> PollOutcome;

    /// Release the underlying subscription.
    ///
    /// The loop calls this exactly once, after it leaves the running phase,
    /// on every exit path.
    fn close(&mut self);
}
