//! Stdout dispatch handlers.

use std::io::Write;

use async_trait::async_trait;
use base64::Engine;
use clap::ValueEnum;
use serde::Serialize;

use kafka_tail_core::{Message, MessageHandler};

/// Output format for dispatched messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One human-readable line per message
    Plain,
    /// One JSON object per line
    Json,
}

/// JSON representation of a dispatched message.
#[derive(Serialize)]
struct JsonRecord<'a> {
    topic: &'a str,
    partition: i32,
    offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    /// Base64, since keys are arbitrary bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    payload: String,
}

/// Writes each dispatched message to the wrapped writer.
///
/// Write failures propagate: a closed output pipe stops the loop rather than
/// silently dropping dispatches.
pub struct OutputHandler<W> {
    writer: W,
    format: Format,
}

impl OutputHandler<std::io::Stdout> {
    /// Handler printing to standard output.
    pub fn stdout(format: Format) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write + Send> OutputHandler<W> {
    pub fn new(writer: W, format: Format) -> Self {
        Self { writer, format }
    }
}

#[async_trait]
impl<W: Write + Send> MessageHandler for OutputHandler<W> {
    async fn handle(&mut self, message: &Message) -> anyhow::Result<()> {
        match self.format {
            Format::Plain => writeln!(
                self.writer,
                "Message on {}[{}]@{}: {}",
                message.topic,
                message.partition,
                message.offset,
                String::from_utf8_lossy(&message.payload),
            )?,
            Format::Json => {
                let record = JsonRecord {
                    topic: &message.topic,
                    partition: message.partition,
                    offset: message.offset,
                    timestamp: message.timestamp,
                    key: message
                        .key
                        .as_deref()
                        .map(|k| base64::engine::general_purpose::STANDARD.encode(k)),
                    payload: String::from_utf8_lossy(&message.payload).into_owned(),
                };
                serde_json::to_writer(&mut self.writer, &record)?;
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }
}
