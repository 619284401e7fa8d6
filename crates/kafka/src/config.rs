//! Consumer configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{Error, Result};

/// Where to start when the consumer group has no committed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OffsetReset {
    /// Start from the beginning of each partition.
    ///
    /// Preferred when no message may be missed; replays everything the
    /// broker still retains on first run.
    Earliest,
    /// Start from the end of each partition, receiving only new messages.
    Latest,
}

impl OffsetReset {
    /// The value librdkafka expects for `auto.offset.reset`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

/// Configuration for the Kafka subscription.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(long, value_delimiter = ',', required = true, env = "KAFKA_BROKERS")]
    pub brokers: Vec<String>,

    /// Consumer group ID
    #[clap(long, env = "KAFKA_GROUP_ID")]
    pub group_id: String,

    /// Topic to subscribe to (repeatable).
    ///
    /// Entries starting with '^' are regex patterns matched against available
    /// topic names. Literal names and patterns may be mixed in one
    /// subscription; overlap resolution between them is librdkafka's
    /// documented behavior, not re-implemented here.
    #[clap(long = "topic", required = true)]
    pub topics: Vec<String>,

    /// Where to start when the group has no committed offsets
    #[clap(long, value_enum, default_value_t = OffsetReset::Earliest)]
    pub auto_offset_reset: OffsetReset,

    /// Upper bound on a single poll wait, in milliseconds
    #[clap(long, default_value_t = 1000)]
    pub poll_timeout_ms: u64,

    /// Session timeout in milliseconds
    #[clap(long, default_value = "6000")]
    pub session_timeout_ms: String,

    /// Upper bound on the broker reachability check at startup, in milliseconds
    #[clap(long, default_value_t = 10_000)]
    pub connect_timeout_ms: u64,
}

impl Config {
    /// Rejects configurations that could never subscribe successfully,
    /// before any connection attempt is made.
    pub fn validate(&self) -> Result<()> {
        if self.brokers.iter().all(|b| b.trim().is_empty()) {
            return Err(Error::InvalidConfig("no brokers given".to_string()));
        }
        if self.group_id.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "group ID must not be empty".to_string(),
            ));
        }
        if self.topics.is_empty() || self.topics.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "topic entries must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
