//! Consumed message record.

/// A message delivered from a subscribed topic.
///
/// Detached from the client library's borrowed representation so it can
/// outlive the poll that produced it. Read-only to the consumer; the broker
/// already considers it delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Topic the message was read from
    pub topic: String,
    /// Partition number within the topic
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Raw payload bytes (empty for tombstones)
    pub payload: Vec<u8>,
    /// Message key (if any)
    pub key: Option<Vec<u8>>,
    /// Message timestamp in milliseconds since epoch (if available)
    pub timestamp: Option<i64>,
}
