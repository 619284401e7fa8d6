//! rdkafka-backed message source for kafka-tail.
//!
//! This crate provides:
//!
//! - CLI-derivable consumer configuration with validation
//! - A [`MessageSource`](kafka_tail_core::MessageSource) implementation over
//!   an rdkafka `StreamConsumer`, with bounded-wait polling and error
//!   classification
//! - A [`run`] entry point wiring configuration to the consumption loop
//!
//! Everything client-specific lives here; the loop itself is in
//! `kafka-tail-core` and never sees an rdkafka type.

pub mod config;
pub mod error;
pub mod run;
pub mod source;

pub use config::{Config, OffsetReset};
pub use error::{Error, Result};
pub use run::run;
pub use source::KafkaSource;
