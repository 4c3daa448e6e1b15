use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use mira_assistant::{
    AssistantResponder, ReplyEventMapped, ReplyEventPayload, ReplyEventStream, ReplyHandle,
    ReplyRequest, ReplyTarget as ResponderReplyTarget,
};
use mira_session::{
    ConversationId, ConversationSummary, Message, MessageId, ReplySessionId, ReplyTarget, Role,
    Session,
};

use crate::events::SessionEvent;

/// Coordinator-level bookkeeping for one in-flight reply exchange.
struct PendingReply {
    target: ReplyTarget,
    worker: JoinHandle<()>,
    reader: JoinHandle<()>,
}

struct ControllerInner {
    session: Session,
    pending: HashMap<ConversationId, PendingReply>,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl ControllerInner {
    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// Owner of the session for the lifetime of the application run.
///
/// The controller serializes every mutation through one state container,
/// keys in-flight replies per conversation id, and routes each completion
/// back to the conversation that originated it regardless of the current
/// selection. Spawned completion tasks hold only a weak reference to the
/// state, so a completion racing teardown is discarded rather than applied
/// to a disposed store.
///
/// `send_message` spawns tokio tasks and must be called from within a
/// runtime.
pub struct ChatController {
    inner: Arc<Mutex<ControllerInner>>,
    responder: Arc<dyn AssistantResponder>,
}

impl ChatController {
    pub fn new(session: Session, responder: Arc<dyn AssistantResponder>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ControllerInner {
                session,
                pending: HashMap::new(),
                subscribers: Vec::new(),
            })),
            responder,
        }
    }

    /// Registers a change-notification subscriber. Closed receivers are
    /// pruned on the next emit.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock_inner(&self.inner).subscribers.push(tx);
        rx
    }

    /// Creates a conversation at the front of the directory and makes it
    /// active. The new conversation starts idle.
    pub fn create_conversation(&self) -> ConversationId {
        let mut inner = lock_inner(&self.inner);
        let id = inner.session.create_conversation();
        inner.emit(SessionEvent::ConversationsChanged);
        inner.emit(SessionEvent::MessagesChanged {
            conversation_id: id,
        });
        id
    }

    /// Switches the active conversation. Unknown ids are a silent no-op.
    /// An in-flight reply elsewhere keeps running and will land in its own
    /// conversation.
    pub fn select_conversation(&self, id: ConversationId) {
        let mut inner = lock_inner(&self.inner);
        let before = inner.session.active_conversation_id();
        inner.session.select_conversation(id);
        let after = inner.session.active_conversation_id();

        if before != after
            && let Some(active) = after
        {
            inner.emit(SessionEvent::MessagesChanged {
                conversation_id: active,
            });
        }
    }

    pub fn list_conversations(&self) -> Vec<ConversationSummary> {
        lock_inner(&self.inner).session.list_conversations()
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        lock_inner(&self.inner).session.active_conversation_id()
    }

    pub fn active_messages(&self) -> Vec<Message> {
        lock_inner(&self.inner).session.active_messages().to_vec()
    }

    /// Typing indicator for the active conversation.
    pub fn is_assistant_typing(&self) -> bool {
        lock_inner(&self.inner).session.is_assistant_typing()
    }

    /// Sends a user message on the active conversation and starts the
    /// simulated reply exchange.
    ///
    /// Only actionable while the active conversation is idle: a send during
    /// an in-flight reply is a silent no-op, mirroring the disabled
    /// composer. Blank content is rejected by the store. Returns the id of
    /// the appended user message.
    pub fn send_message(&self, content: impl Into<String>) -> Option<MessageId> {
        let content = content.into();
        let mut inner = lock_inner(&self.inner);

        let Some(conversation_id) = inner.session.active_conversation_id() else {
            tracing::debug!("no active conversation; send is not actionable");
            return None;
        };
        if inner.session.is_awaiting_reply(conversation_id) {
            tracing::debug!(
                conversation_id = %conversation_id,
                "reply in flight; send is not actionable"
            );
            return None;
        }

        let message_id =
            inner
                .session
                .append_message(conversation_id, Role::User, content.clone())?;
        let Some(target) = inner.session.begin_reply(conversation_id) else {
            // Unreachable after the idle check above; the appended message
            // stays either way.
            return Some(message_id);
        };

        inner.emit(SessionEvent::MessagesChanged { conversation_id });
        inner.emit(SessionEvent::TypingChanged {
            conversation_id,
            is_typing: true,
        });

        let request = ReplyRequest::new(reply_target_to_responder(target), content);
        match self.responder.generate(request) {
            Ok(handle) => self.spawn_reply_pipeline(&mut inner, target, handle),
            Err(error) => {
                tracing::error!(
                    conversation_id = %conversation_id,
                    error = %error,
                    "responder rejected the reply request"
                );
                inner.session.cancel_reply(target);
                inner.emit(SessionEvent::TypingChanged {
                    conversation_id,
                    is_typing: false,
                });
            }
        }

        Some(message_id)
    }

    /// Aborts every in-flight exchange and returns their conversations to
    /// idle. Called on teardown; safe to call repeatedly.
    pub fn shutdown(&self) {
        let mut inner = lock_inner(&self.inner);
        let pending: Vec<PendingReply> = inner.pending.drain().map(|(_, reply)| reply).collect();
        for reply in &pending {
            inner.session.cancel_reply(reply.target);
            inner.emit(SessionEvent::TypingChanged {
                conversation_id: reply.target.conversation_id,
                is_typing: false,
            });
        }
        drop(inner);

        for reply in pending {
            reply.worker.abort();
            reply.reader.abort();
        }
    }

    fn spawn_reply_pipeline(
        &self,
        inner: &mut MutexGuard<'_, ControllerInner>,
        target: ReplyTarget,
        handle: ReplyHandle,
    ) {
        let ReplyHandle { stream, worker } = handle;
        let worker = tokio::spawn(worker);
        let reader = self.spawn_reply_reader(stream);
        inner.pending.insert(
            target.conversation_id,
            PendingReply {
                target,
                worker,
                reader,
            },
        );
    }

    fn spawn_reply_reader(&self, mut stream: ReplyEventStream) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(event) = stream.recv().await {
                if !apply_reply_event(&weak, event) {
                    break;
                }
            }
        })
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Applies one responder event to the store. Returns false when the store
/// is gone and the reader should stop.
fn apply_reply_event(weak: &Weak<Mutex<ControllerInner>>, event: ReplyEventMapped) -> bool {
    let Some(inner) = weak.upgrade() else {
        tracing::debug!(
            target = ?event.target,
            "session store dropped before reply completion; discarding"
        );
        return false;
    };
    let mut inner = lock_inner(&inner);

    let target = responder_target_to_reply(event.target);
    match event.payload {
        ReplyEventPayload::Completed(content) => {
            let conversation_id = target.conversation_id;
            if inner.session.complete_reply(target, content).is_some() {
                inner.pending.remove(&conversation_id);
                inner.emit(SessionEvent::MessagesChanged { conversation_id });
                inner.emit(SessionEvent::TypingChanged {
                    conversation_id,
                    is_typing: false,
                });
            }
            // Stale completions are logged and discarded by the store.
        }
    }

    true
}

fn lock_inner(inner: &Mutex<ControllerInner>) -> MutexGuard<'_, ControllerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reply_target_to_responder(target: ReplyTarget) -> ResponderReplyTarget {
    ResponderReplyTarget::new(target.conversation_id.raw(), target.session_id.raw())
}

fn responder_target_to_reply(target: ResponderReplyTarget) -> ReplyTarget {
    ReplyTarget::new(
        ConversationId::new(target.conversation_id),
        ReplySessionId::new(target.session_id),
    )
}
