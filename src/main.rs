//! Command-line interface for kafka-tail
//!
//! # Usage Examples
//!
//! ```bash
//! # Tail a topic, printing each message to stdout
//! kafka-tail --brokers localhost:9092 --group-id my-group --topic my-topic
//!
//! # Subscribe to a literal topic plus every topic matching a pattern
//! kafka-tail --brokers localhost:9092 --group-id my-group \
//!   --topic my-topic --topic '^audit\..*'
//!
//! # JSON lines, stop after 1000 messages or 60 seconds, whichever first
//! kafka-tail --brokers kafka-1:9092,kafka-2:9092 --group-id my-group \
//!   --topic my-topic --format json --max-messages 1000 --run-for 60
//! ```
//!
//! Exit codes: 0 on clean shutdown (signal, message limit or run time
//! elapsed), 1 on a setup error or a non-recoverable runtime failure.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use kafka_tail::output::{Format, OutputHandler};
use kafka_tail_core::{shutdown_channel, ShutdownController};
use kafka_tail_kafka as kafka;

#[derive(Parser)]
#[command(name = "kafka-tail")]
#[command(about = "Tail Kafka topics to standard output")]
#[command(long_about = None)]
struct Cli {
    /// Kafka subscription configuration
    #[command(flatten)]
    config: kafka::Config,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Plain)]
    format: Format,

    /// Stop cleanly after this many messages
    #[arg(long)]
    max_messages: Option<u64>,

    /// Stop cleanly after this many seconds
    #[arg(long)]
    run_for: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (controller, signal) = shutdown_channel();
    setup_signal_handler(controller.clone());
    if let Some(seconds) = cli.run_for {
        setup_deadline(controller, Duration::from_secs(seconds));
    }

    let handler = OutputHandler::stdout(cli.format);
    kafka::run(cli.config, handler, cli.max_messages, signal).await?;

    Ok(())
}

/// Raises the shutdown signal on Ctrl+C.
fn setup_signal_handler(controller: ShutdownController) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");

        info!("Received interrupt signal (Ctrl+C)");
        controller.trigger();
    });
}

/// Raises the shutdown signal once the bounded run time elapses.
fn setup_deadline(controller: ShutdownController, run_for: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(run_for).await;
        info!("Run time limit reached ({}s)", run_for.as_secs());
        controller.trigger();
    });
}
