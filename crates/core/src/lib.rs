//! Client-agnostic consumption loop for kafka-tail.
//!
//! This crate provides:
//! - The poll/dispatch loop with graceful shutdown and error classification
//! - Source and handler traits that keep the loop independent of any
//!   particular broker client library
//! - A shutdown token pair for cooperative cancellation
//!
//! # Dependency Direction
//!
//! Nothing in this crate knows about Kafka. Broker-specific crates implement
//! [`MessageSource`] and classify their client's errors into [`PollOutcome`]s,
//! so the loop logic stays testable with scripted sources and reusable across
//! clients.

pub mod error;
pub mod handler;
pub mod message;
pub mod poll;
pub mod runner;
pub mod shutdown;
pub mod source;

pub use error::{Error, Result};
pub use handler::MessageHandler;
pub use message::Message;
pub use poll::{PollError, PollOutcome};
pub use runner::{ConsumerLoop, LoopOptions, LoopState, RunSummary, StopReason};
pub use shutdown::{shutdown_channel, ShutdownController, ShutdownSignal};
pub use source::MessageSource;
