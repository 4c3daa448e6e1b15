use std::future::Future;
use std::pin::Pin;

use snafu::Snafu;
use tokio::sync::{mpsc, oneshot};

/// Wire-level reply routing key.
///
/// Raw ids on purpose: responders stay decoupled from the session model,
/// and the coordinator converts at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTarget {
    pub conversation_id: u64,
    pub session_id: u64,
}

impl ReplyTarget {
    pub const fn new(conversation_id: u64, session_id: u64) -> Self {
        Self {
            conversation_id,
            session_id,
        }
    }
}

/// One reply generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub target: ReplyTarget,
    pub prompt: String,
}

impl ReplyRequest {
    pub fn new(target: ReplyTarget, prompt: impl Into<String>) -> Self {
        Self {
            target,
            prompt: prompt.into(),
        }
    }
}

/// Responder payload mapped into chat domain language.
///
/// The simulated exchange always succeeds, so completion is the only
/// terminal payload; the enum leaves room for richer responders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEventPayload {
    Completed(String),
}

/// Emitted after responder output is mapped into domain events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyEventMapped {
    pub target: ReplyTarget,
    pub payload: ReplyEventPayload,
}

pub type ResponderWorker = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
pub type ResponderResult<T> = Result<T, ResponderError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResponderError {
    #[snafu(display("reply request for {target:?} has an empty prompt"))]
    EmptyPrompt {
        stage: &'static str,
        target: ReplyTarget,
    },
}

/// Receiving side of one reply exchange.
///
/// Dropping the stream cancels the worker, so an unmounted view discards
/// its pending completion instead of applying it to a disposed store.
pub struct ReplyEventStream {
    target: ReplyTarget,
    events: mpsc::UnboundedReceiver<ReplyEventMapped>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

/// Stream plus the worker future that feeds it. The caller decides where
/// the worker runs.
pub struct ReplyHandle {
    pub stream: ReplyEventStream,
    pub worker: ResponderWorker,
}

impl ReplyEventStream {
    pub(crate) fn new(
        target: ReplyTarget,
        events: mpsc::UnboundedReceiver<ReplyEventMapped>,
        cancel_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            target,
            events,
            cancel_tx: Some(cancel_tx),
        }
    }

    pub fn target(&self) -> ReplyTarget {
        self.target
    }

    pub async fn recv(&mut self) -> Option<ReplyEventMapped> {
        self.events.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ReplyEventMapped> {
        self.events.try_recv().ok()
    }

    /// Cancels the pending exchange. Returns false when the worker already
    /// finished or cancellation was requested before.
    pub fn cancel(&mut self) -> bool {
        self.cancel_tx
            .take()
            .map(|tx| tx.send(()).is_ok())
            .unwrap_or(false)
    }
}

impl Drop for ReplyEventStream {
    fn drop(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

/// Reply generation boundary.
pub trait AssistantResponder: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn generate(&self, request: ReplyRequest) -> ResponderResult<ReplyHandle>;
}

pub(crate) fn make_reply_stream(
    target: ReplyTarget,
) -> (
    mpsc::UnboundedSender<ReplyEventMapped>,
    ReplyEventStream,
    oneshot::Receiver<()>,
) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    (
        event_tx,
        ReplyEventStream::new(target, event_rx, cancel_tx),
        cancel_rx,
    )
}
