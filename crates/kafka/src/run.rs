//! Entry point wiring configuration to the consumption loop.

use anyhow::{Context, Result};
use tracing::info;

use kafka_tail_core::{ConsumerLoop, LoopOptions, MessageHandler, RunSummary, ShutdownSignal};

use crate::config::Config;
use crate::source::KafkaSource;

/// Consumes from the configured subscription until shutdown, the message
/// limit, or a fatal failure, dispatching every delivered message to
/// `handler`.
///
/// Setup failures (invalid configuration, unreachable broker) surface before
/// the loop starts; the subscription is released on every exit path after it.
pub async fn run<H>(
    config: Config,
    handler: H,
    max_messages: Option<u64>,
    shutdown: ShutdownSignal,
) -> Result<RunSummary>
where
    H: MessageHandler,
{
    info!(
        topics = ?config.topics,
        group_id = %config.group_id,
        "starting consumption"
    );
    if let Some(max) = max_messages {
        info!("will stop after {max} messages");
    }

    let opts = LoopOptions {
        poll_wait: config.poll_wait(),
        max_messages,
    };
    let source = KafkaSource::connect(&config).context("Failed to set up Kafka subscription")?;

    let summary = ConsumerLoop::with_options(source, handler, opts)
        .run(shutdown)
        .await
        .context("Consumption loop failed")?;

    info!(
        dispatched = summary.dispatched,
        "consumption stopped: {:?}", summary.stop
    );
    Ok(summary)
}
