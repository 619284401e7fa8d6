//! Poll outcomes and failure classification.

use thiserror::Error;

use crate::message::Message;

/// Result of one bounded-wait poll attempt.
#[derive(Debug)]
pub enum PollOutcome {
    /// A message was delivered within the wait bound.
    Delivered(Message),
    /// No message arrived within the wait bound.
    ///
    /// Expected for an empty queue; not an error.
    TimedOut,
    /// The poll failed. The error carries its own recoverability.
    Failed(PollError),
}

/// A classified poll failure.
///
/// Produced by a [`MessageSource`](crate::source::MessageSource)
/// implementation from whatever error type its client library surfaces, so
/// the loop never inspects client-specific errors.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PollError {
    message: String,
    recoverable: bool,
}

impl PollError {
    /// A transient failure; the client is expected to recover internally.
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: true,
        }
    }

    /// A failure the loop cannot continue past.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: false,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }
}
