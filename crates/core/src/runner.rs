//! The consumption loop.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::handler::MessageHandler;
use crate::poll::PollOutcome;
use crate::shutdown::ShutdownSignal;
use crate::source::MessageSource;

/// Lifecycle of a consumption loop.
///
/// `Initializing -> Running` on successful setup, `Running -> Draining` on
/// shutdown or fatal failure, `Draining -> Closed` once the source has been
/// released. A setup failure never constructs a loop, so it goes straight to
/// `Closed` with nothing to release. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
    Draining,
    Closed,
}

/// Tunables for a consumption loop.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Upper bound on a single poll wait.
    pub poll_wait: Duration,
    /// Stop cleanly after this many dispatched messages.
    pub max_messages: Option<u64>,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            poll_wait: Duration::from_secs(1),
            max_messages: None,
        }
    }
}

/// Why a loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal was observed.
    ShutdownSignal,
    /// The configured message limit was reached.
    MessageLimit,
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages dispatched to the handler.
    pub dispatched: u64,
    pub stop: StopReason,
}

/// A sequential poll/dispatch loop over one exclusively-owned source.
///
/// Single logical thread of control: messages are dispatched in the order the
/// poll returns them, and a long-running dispatch delays shutdown until it
/// returns. The wrapped client may run background I/O threads; those are
/// opaque here.
pub struct ConsumerLoop<S, H> {
    source: S,
    handler: H,
    opts: LoopOptions,
    state: LoopState,
}

impl<S, H> ConsumerLoop<S, H>
where
    S: MessageSource,
    H: MessageHandler,
{
    pub fn new(source: S, handler: H) -> Self {
        Self::with_options(source, handler, LoopOptions::default())
    }

    pub fn with_options(source: S, handler: H, opts: LoopOptions) -> Self {
        Self {
            source,
            handler,
            opts,
            state: LoopState::Initializing,
        }
    }

    /// Runs until shutdown, the message limit, or a fatal failure.
    ///
    /// The source is released exactly once on every exit path. Consuming
    /// `self` makes the closed state terminal: no operation is valid on the
    /// loop afterwards.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> Result<RunSummary> {
        self.transition(LoopState::Running);
        let outcome = self.drive(&mut shutdown).await;

        self.transition(LoopState::Draining);
        self.source.close();
        self.transition(LoopState::Closed);

        outcome
    }

    async fn drive(&mut self, shutdown: &mut ShutdownSignal) -> Result<RunSummary> {
        let mut dispatched: u64 = 0;
        loop {
            // The shutdown arm comes first so that at most one further poll
            // happens once the signal is raised; a signal arriving during a
            // poll wait cancels the wait.
            tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    info!(dispatched, "shutdown signal observed, stopping");
                    return Ok(RunSummary {
                        dispatched,
                        stop: StopReason::ShutdownSignal,
                    });
                }
                outcome = self.source.poll(self.opts.poll_wait) => match outcome {
                    PollOutcome::Delivered(message) => {
                        debug!(
                            topic = %message.topic,
                            partition = message.partition,
                            offset = message.offset,
                            "dispatching message"
                        );
                        self.handler.handle(&message).await.map_err(Error::Dispatch)?;
                        dispatched += 1;
                        if self.opts.max_messages.is_some_and(|max| dispatched >= max) {
                            info!(dispatched, "message limit reached, stopping");
                            return Ok(RunSummary {
                                dispatched,
                                stop: StopReason::MessageLimit,
                            });
                        }
                    }
                    // Empty queue within the wait window; keep polling.
                    PollOutcome::TimedOut => {}
                    PollOutcome::Failed(e) if e.is_recoverable() => {
                        warn!("transient poll error, continuing: {e}");
                    }
                    PollOutcome::Failed(e) => return Err(Error::Poll(e)),
                }
            }
        }
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "loop state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::message::Message;
    use crate::poll::PollError;
    use crate::shutdown::{shutdown_channel, ShutdownController};

    fn message(topic: &str, offset: i64) -> Message {
        Message {
            topic: topic.to_string(),
            partition: 0,
            offset,
            payload: format!("payload-{offset}").into_bytes(),
            key: None,
            timestamp: None,
        }
    }

    /// Feeds a fixed sequence of outcomes; polls past the end report a
    /// timeout. Optionally raises shutdown after the nth poll, and counts
    /// polls and closes so tests can assert on them after the loop consumed
    /// the source.
    struct ScriptedSource {
        script: VecDeque<PollOutcome>,
        polls: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        trigger_after: Option<(usize, ShutdownController)>,
    }

    impl ScriptedSource {
        fn new(script: Vec<PollOutcome>) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let polls = Arc::new(AtomicUsize::new(0));
            let closes = Arc::new(AtomicUsize::new(0));
            let source = Self {
                script: script.into(),
                polls: Arc::clone(&polls),
                closes: Arc::clone(&closes),
                trigger_after: None,
            };
            (source, polls, closes)
        }

        fn trigger_after(mut self, polls: usize, controller: ShutdownController) -> Self {
            self.trigger_after = Some((polls, controller));
            self
        }
    }

    #[async_trait]
    impl MessageSource for ScriptedSource {
        async fn poll(&mut self, _wait: Duration) -> PollOutcome {
            let count = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            let outcome = self.script.pop_front().unwrap_or(PollOutcome::TimedOut);
            if let Some((after, controller)) = &self.trigger_after {
                if count == *after {
                    controller.trigger();
                }
            }
            outcome
        }

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Clone, Default)]
    struct RecordingHandler {
        seen: Arc<Mutex<Vec<Message>>>,
        fail: bool,
    }

    impl RecordingHandler {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn seen(&self) -> Vec<Message> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle(&mut self, message: &Message) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("output closed");
            }
            self.seen.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn limited(max_messages: u64) -> LoopOptions {
        LoopOptions {
            max_messages: Some(max_messages),
            ..LoopOptions::default()
        }
    }

    #[tokio::test]
    async fn timeouts_never_dispatch_or_stop() {
        let (controller, signal) = shutdown_channel();
        let (source, polls, closes) = ScriptedSource::new(vec![
            PollOutcome::TimedOut,
            PollOutcome::TimedOut,
            PollOutcome::TimedOut,
        ]);
        let source = source.trigger_after(3, controller);
        let handler = RecordingHandler::default();

        let summary = ConsumerLoop::new(source, handler.clone())
            .run(signal)
            .await
            .expect("timeouts must not fail the loop");

        // The loop outlived every timeout and only stopped on the signal.
        assert_eq!(summary.stop, StopReason::ShutdownSignal);
        assert_eq!(summary.dispatched, 0);
        assert!(handler.seen().is_empty());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatches_each_message_once_in_poll_order() {
        let (_controller, signal) = shutdown_channel();
        let (source, _, closes) = ScriptedSource::new(vec![
            PollOutcome::Delivered(message("orders", 1)),
            PollOutcome::Delivered(message("orders", 2)),
            PollOutcome::Delivered(message("invoices", 7)),
        ]);
        let handler = RecordingHandler::default();

        let summary = ConsumerLoop::with_options(source, handler.clone(), limited(3))
            .run(signal)
            .await
            .unwrap();

        assert_eq!(summary.stop, StopReason::MessageLimit);
        assert_eq!(summary.dispatched, 3);
        let seen = handler.seen();
        assert_eq!(
            seen,
            vec![message("orders", 1), message("orders", 2), message("invoices", 7)]
        );
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fatal_error_stops_after_dispatching_earlier_messages() {
        let (_controller, signal) = shutdown_channel();
        let (source, _, closes) = ScriptedSource::new(vec![
            PollOutcome::TimedOut,
            PollOutcome::Delivered(message("orders", 1)),
            PollOutcome::TimedOut,
            PollOutcome::Failed(PollError::fatal("consumer fenced")),
        ]);
        let handler = RecordingHandler::default();

        let err = ConsumerLoop::new(source, handler.clone())
            .run(signal)
            .await
            .expect_err("a fatal poll error must surface");

        assert!(matches!(err, Error::Poll(_)));
        assert_eq!(handler.seen(), vec![message("orders", 1)]);
        // Released exactly once despite the error path.
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recoverable_errors_do_not_stop_the_loop() {
        let (_controller, signal) = shutdown_channel();
        let (source, _, closes) = ScriptedSource::new(vec![
            PollOutcome::Failed(PollError::recoverable("broker away")),
            PollOutcome::Failed(PollError::recoverable("still away")),
            PollOutcome::Delivered(message("orders", 1)),
        ]);
        let handler = RecordingHandler::default();

        let summary = ConsumerLoop::with_options(source, handler.clone(), limited(1))
            .run(signal)
            .await
            .expect("recoverable errors must be absorbed");

        assert_eq!(summary.dispatched, 1);
        assert_eq!(handler.seen(), vec![message("orders", 1)]);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_between_messages_stops_without_further_polls() {
        let (controller, signal) = shutdown_channel();
        let (source, polls, closes) = ScriptedSource::new(vec![
            PollOutcome::Delivered(message("orders", 1)),
            PollOutcome::Delivered(message("orders", 2)),
            PollOutcome::TimedOut,
        ]);
        // Signal raised while the second message is being polled.
        let source = source.trigger_after(2, controller);
        let handler = RecordingHandler::default();

        let summary = ConsumerLoop::new(source, handler.clone())
            .run(signal)
            .await
            .unwrap();

        assert_eq!(summary.stop, StopReason::ShutdownSignal);
        assert_eq!(
            handler.seen(),
            vec![message("orders", 1), message("orders", 2)]
        );
        // The trailing timeout was never polled for.
        assert_eq!(polls.load(Ordering::SeqCst), 2);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_raised_before_run_polls_at_most_once() {
        let (controller, signal) = shutdown_channel();
        let (source, polls, closes) =
            ScriptedSource::new(vec![PollOutcome::Delivered(message("orders", 1))]);
        let handler = RecordingHandler::default();
        controller.trigger();

        let summary = ConsumerLoop::new(source, handler.clone())
            .run(signal)
            .await
            .unwrap();

        assert_eq!(summary.stop, StopReason::ShutdownSignal);
        assert!(polls.load(Ordering::SeqCst) <= 1);
        assert!(handler.seen().is_empty());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_failure_is_fatal_and_still_releases_the_source() {
        let (_controller, signal) = shutdown_channel();
        let (source, _, closes) =
            ScriptedSource::new(vec![PollOutcome::Delivered(message("orders", 1))]);

        let err = ConsumerLoop::new(source, RecordingHandler::failing())
            .run(signal)
            .await
            .expect_err("handler errors must surface");

        assert!(matches!(err, Error::Dispatch(_)));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
