use std::time::Duration;

use snafu::ensure;
use tokio::sync::{mpsc, oneshot};

use super::responder::{
    AssistantResponder, EmptyPromptSnafu, ReplyEventMapped, ReplyEventPayload, ReplyHandle,
    ReplyRequest, ResponderResult, ResponderWorker, make_reply_stream,
};

pub const SIMULATED_RESPONDER_ID: &str = "simulated";

/// Delay before the synthesized reply completes, matching the fake
/// request/response cycle of the front-end this core stands in for.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1_500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderConfig {
    pub responder_id: String,
    pub reply_delay: Duration,
}

impl ResponderConfig {
    pub fn new(responder_id: impl Into<String>, reply_delay: Duration) -> Self {
        Self {
            responder_id: responder_id.into().trim().to_string(),
            reply_delay,
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self::new(
            SIMULATED_RESPONDER_ID,
            Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
        )
    }
}

/// Locally generated echo responder.
///
/// There is no network call behind this, so once the delay elapses the
/// exchange always completes; the only way it ends without a reply is
/// cancellation through the event stream.
pub struct SimulatedResponder {
    config: ResponderConfig,
}

impl SimulatedResponder {
    pub fn new(config: ResponderConfig) -> Self {
        Self { config }
    }

    pub fn with_default_delay() -> Self {
        Self::new(ResponderConfig::default())
    }

    /// Derives the reply deterministically from the triggering prompt.
    fn synthesize_reply(prompt: &str) -> String {
        format!("This is a simulated response to: \"{prompt}\"")
    }

    async fn run_reply_worker(
        delay: Duration,
        request: ReplyRequest,
        event_tx: mpsc::UnboundedSender<ReplyEventMapped>,
        mut cancel_rx: oneshot::Receiver<()>,
    ) {
        let target = request.target;

        tokio::select! {
            _ = &mut cancel_rx => {
                // Cancelled before the timer fired: discard the pending
                // completion without emitting anything.
                tracing::debug!(?target, "reply generation cancelled");
            }
            _ = tokio::time::sleep(delay) => {
                let content = Self::synthesize_reply(&request.prompt);
                tracing::debug!(
                    ?target,
                    content_len = content.len(),
                    "simulated reply completed"
                );
                let _ = event_tx.send(ReplyEventMapped {
                    target,
                    payload: ReplyEventPayload::Completed(content),
                });
            }
        }
    }
}

impl AssistantResponder for SimulatedResponder {
    fn id(&self) -> &str {
        &self.config.responder_id
    }

    fn name(&self) -> &str {
        "Simulated Echo"
    }

    fn generate(&self, request: ReplyRequest) -> ResponderResult<ReplyHandle> {
        // The session store already rejects blank user messages; this guard
        // keeps the responder safe to call on its own.
        ensure!(
            !request.prompt.trim().is_empty(),
            EmptyPromptSnafu {
                stage: "generate-reply",
                target: request.target,
            }
        );

        let (event_tx, stream, cancel_rx) = make_reply_stream(request.target);
        let worker: ResponderWorker = Box::pin(Self::run_reply_worker(
            self.config.reply_delay,
            request,
            event_tx,
            cancel_rx,
        ));

        Ok(ReplyHandle { stream, worker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{ReplyTarget, ResponderError};

    fn request(prompt: &str) -> ReplyRequest {
        ReplyRequest::new(ReplyTarget::new(1, 1), prompt)
    }

    #[test]
    fn blank_prompts_are_rejected_before_any_timer_starts() {
        let responder = SimulatedResponder::with_default_delay();
        let error = responder
            .generate(request("   "))
            .err()
            .expect("blank prompt must not start an exchange");
        assert!(matches!(error, ResponderError::EmptyPrompt { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_arrives_only_after_the_configured_delay() {
        let responder = SimulatedResponder::with_default_delay();
        let handle = responder.generate(request("hello")).expect("exchange starts");
        let ReplyHandle { mut stream, worker } = handle;
        let worker = tokio::spawn(worker);

        tokio::time::advance(Duration::from_millis(DEFAULT_REPLY_DELAY_MS - 1)).await;
        assert!(stream.try_recv().is_none());

        tokio::time::advance(Duration::from_millis(1)).await;
        let event = stream.recv().await.expect("completion event");
        assert_eq!(event.target, ReplyTarget::new(1, 1));
        let ReplyEventPayload::Completed(content) = event.payload;
        assert_eq!(content, "This is a simulated response to: \"hello\"");

        // Exactly one event per exchange.
        assert!(stream.recv().await.is_none());
        worker.await.expect("worker finishes cleanly");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_discards_the_pending_completion() {
        let responder = SimulatedResponder::with_default_delay();
        let handle = responder.generate(request("hello")).expect("exchange starts");
        let ReplyHandle { mut stream, worker } = handle;
        let worker = tokio::spawn(worker);

        assert!(stream.cancel());
        worker.await.expect("worker exits on cancel");
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_cancels_the_worker() {
        let responder = SimulatedResponder::with_default_delay();
        let handle = responder.generate(request("hello")).expect("exchange starts");
        let ReplyHandle { stream, worker } = handle;
        let worker = tokio::spawn(worker);

        drop(stream);
        // The worker observes the cancel signal without the timer firing.
        worker.await.expect("worker exits after stream drop");
    }

    #[tokio::test(start_paused = true)]
    async fn custom_delay_is_respected() {
        let responder = SimulatedResponder::new(ResponderConfig::new(
            "simulated",
            Duration::from_millis(250),
        ));
        let handle = responder.generate(request("quick")).expect("exchange starts");
        let ReplyHandle { mut stream, worker } = handle;
        tokio::spawn(worker);

        tokio::time::advance(Duration::from_millis(250)).await;
        let event = stream.recv().await.expect("completion event");
        let ReplyEventPayload::Completed(content) = event.payload;
        assert_eq!(content, "This is a simulated response to: \"quick\"");
    }
}
