//! Dispatch target for delivered messages.

use async_trait::async_trait;

use crate::message::Message;

/// Receives each delivered message, exactly once, in poll-return order.
///
/// Dispatch is a side effect only: the broker already delivered the message,
/// so there is no retry. Returning an error stops the loop; it means the
/// output side itself is broken, not that the message was bad.
#[async_trait]
pub trait MessageHandler: Send {
    async fn handle(&mut self, message: &Message) -> anyhow::Result<()>;
}
