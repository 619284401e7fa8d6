use thiserror::Error;

use crate::poll::PollError;

#[derive(Debug, Error)]
pub enum Error {
    /// A poll failure classified as non-recoverable.
    #[error("poll failed: {0}")]
    Poll(#[from] PollError),

    /// The dispatch handler failed.
    ///
    /// The output side is broken (e.g. a closed pipe), so the loop cannot
    /// usefully continue.
    #[error("dispatch failed: {0}")]
    Dispatch(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
