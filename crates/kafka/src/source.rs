//! rdkafka-backed message source.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::{BorrowedMessage, Message as RdkafkaMessage};
use tracing::{debug, info};

use kafka_tail_core::{Message, MessageSource, PollError, PollOutcome};

use crate::config::Config;
use crate::error::{Error, Result};

/// An active subscription to one or more Kafka topics.
///
/// Owns the underlying `StreamConsumer` for its whole lifetime; created by
/// [`KafkaSource::connect`], released by the consumption loop via
/// [`MessageSource::close`].
pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Connects to the brokers and subscribes to the configured topics.
    ///
    /// Fails on invalid configuration or an unreachable broker; either is a
    /// setup error the caller decides what to do with. The metadata preflight
    /// exists because client creation alone never contacts the broker, and an
    /// unreachable broker should fail startup rather than surface later as a
    /// stream of transport errors.
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let brokers = config.brokers.join(",");
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", config.auto_offset_reset.as_str())
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("enable.partition.eof", "false")
            .create()?;

        consumer
            .fetch_metadata(None, config.connect_timeout())
            .map_err(|source| Error::BrokerUnreachable {
                brokers: brokers.clone(),
                source,
            })?;

        let topics: Vec<&str> = config.topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topics)?;
        info!(
            brokers = %brokers,
            group_id = %config.group_id,
            topics = ?config.topics,
            "subscribed"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn poll(&mut self, wait: Duration) -> PollOutcome {
        match tokio::time::timeout(wait, self.consumer.recv()).await {
            // No message within the wait bound; expected for an empty queue.
            Err(_) => PollOutcome::TimedOut,
            Ok(Ok(message)) => PollOutcome::Delivered(detach(&message)),
            Ok(Err(e)) => PollOutcome::Failed(classify(e)),
        }
    }

    fn close(&mut self) {
        self.consumer.unsubscribe();
        debug!("subscription released");
    }
}

/// Copies a borrowed rdkafka message into an owned record.
fn detach(message: &BorrowedMessage<'_>) -> Message {
    Message {
        topic: message.topic().to_string(),
        partition: message.partition(),
        offset: message.offset(),
        payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        key: message.key().map(<[u8]>::to_vec),
        timestamp: message.timestamp().to_millis(),
    }
}

/// Classifies an rdkafka error into a recoverable or fatal poll failure.
///
/// Transport-level failures are transient: librdkafka reconnects internally,
/// so the loop only needs to report them and keep polling. Everything else
/// (authorization, unknown topics, fatal consumer states) stops the loop.
/// Codes not listed here are treated as fatal.
fn classify(error: KafkaError) -> PollError {
    let transient = matches!(
        error.rdkafka_error_code(),
        Some(
            RDKafkaErrorCode::BrokerTransportFailure
                | RDKafkaErrorCode::AllBrokersDown
                | RDKafkaErrorCode::OperationTimedOut
                | RDKafkaErrorCode::RequestTimedOut
                | RDKafkaErrorCode::NetworkException
                | RDKafkaErrorCode::CoordinatorNotAvailable
                | RDKafkaErrorCode::NotCoordinator
                | RDKafkaErrorCode::LeaderNotAvailable
        )
    );
    if transient {
        PollError::recoverable(format!("Kafka error: {error}"))
    } else {
        PollError::fatal(format!("Kafka error: {error}"))
    }
}
