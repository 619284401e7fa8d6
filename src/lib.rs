//! kafka-tail library
//!
//! Tails Kafka topics: subscribes to literal names and regex patterns,
//! consumes messages in an at-least-once loop, and dispatches each one to a
//! handler (by default, a printer to standard output).
//!
//! The loop itself lives in `kafka-tail-core` and is client-agnostic; the
//! rdkafka binding lives in `kafka-tail-kafka`. This crate adds the stdout
//! handlers and the CLI.
//!
//! # CLI Usage
//!
//! ```bash
//! # Tail one topic from the beginning
//! kafka-tail --brokers localhost:9092 --group-id my-group --topic my-topic
//!
//! # Mix a literal topic and a regex pattern, print JSON lines
//! kafka-tail --brokers localhost:9092 --group-id my-group \
//!   --topic my-topic --topic '^metrics\..*' --format json
//!
//! # Bounded runs
//! kafka-tail --brokers localhost:9092 --group-id my-group --topic my-topic \
//!   --max-messages 100 --run-for 30
//! ```

pub mod output;

pub use output::{Format, OutputHandler};

// Re-export the loop and the Kafka binding for library consumers
pub use kafka_tail_core::{
    shutdown_channel, ConsumerLoop, Error, LoopOptions, LoopState, Message, MessageHandler,
    MessageSource, PollError, PollOutcome, RunSummary, ShutdownController, ShutdownSignal,
    StopReason,
};
pub use kafka_tail_kafka::{Config, KafkaSource, OffsetReset};
