use crate::conversation::{Conversation, ConversationSummary, DEFAULT_CONVERSATION_TITLE};
use crate::ids::{ConversationId, MessageId, ReplySessionId};
use crate::message::{Message, Role, current_unix_timestamp_seconds};
use crate::reply::{ReplyTarget, ReplyTransition};

/// Single source of truth for conversations and the active selection.
///
/// The session is created once per application run and torn down with it;
/// nothing here survives a restart. Conversations are held newest-created
/// first, which is also the thread directory's display order. All id
/// allocation happens here, from monotonic counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    conversations: Vec<Conversation>,
    active_conversation_id: Option<ConversationId>,
    next_conversation_id: u64,
    next_message_id: u64,
    next_reply_session_id: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session with no active conversation.
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            active_conversation_id: None,
            next_conversation_id: 1,
            next_message_id: 1,
            next_reply_session_id: 1,
        }
    }

    /// Creates the startup session: two seeded conversations with the
    /// first one active.
    pub fn with_seed_history() -> Self {
        let mut session = Self::new();
        let now = current_unix_timestamp_seconds();

        for title in ["Chat about AI", "Web development help"] {
            let id = session.allocate_conversation_id();
            // Seeds keep their given order; only user-created conversations
            // go to the front.
            session.conversations.push(Conversation::new(id, title, now));
        }

        session.active_conversation_id = session
            .conversations
            .first()
            .map(|conversation| conversation.id);
        session
    }

    /// Creates a conversation with the placeholder title, inserts it at the
    /// front of the directory, and makes it active.
    pub fn create_conversation(&mut self) -> ConversationId {
        let id = self.allocate_conversation_id();
        let conversation = Conversation::new(
            id,
            DEFAULT_CONVERSATION_TITLE,
            current_unix_timestamp_seconds(),
        );

        self.conversations.insert(0, conversation);
        self.active_conversation_id = Some(id);
        tracing::debug!(conversation_id = %id, "created conversation");
        id
    }

    /// Makes the given conversation active. Unknown ids are a silent no-op
    /// so stale references can never clear or corrupt the selection.
    pub fn select_conversation(&mut self, id: ConversationId) {
        if self.conversation(id).is_some() {
            self.active_conversation_id = Some(id);
        } else {
            tracing::debug!(conversation_id = %id, "ignoring selection of unknown conversation");
        }
    }

    /// Appends a message to the given conversation.
    ///
    /// Empty or whitespace-only content is rejected for user messages;
    /// assistant messages are synthesized and therefore exempt. Unknown
    /// conversation ids are a silent no-op. Returns the id of the appended
    /// message.
    pub fn append_message(
        &mut self,
        conversation_id: ConversationId,
        role: Role,
        content: impl Into<String>,
    ) -> Option<MessageId> {
        let content = content.into();
        if matches!(role, Role::User) && content.trim().is_empty() {
            tracing::debug!(conversation_id = %conversation_id, "rejecting empty user message");
            return None;
        }

        let message_id = MessageId::new(self.next_message_id);
        let conversation = match self.conversation_mut(conversation_id) {
            Some(conversation) => conversation,
            None => {
                tracing::debug!(
                    conversation_id = %conversation_id,
                    "ignoring message append for unknown conversation"
                );
                return None;
            }
        };

        let message = match role {
            Role::User => Message::user(message_id, content),
            Role::Assistant => Message::assistant(message_id, content),
        };
        conversation.push_message(message);
        self.next_message_id += 1;
        Some(message_id)
    }

    /// Starts a reply exchange for the given conversation.
    ///
    /// Allocates a fresh reply session id and moves the conversation to
    /// `Awaiting`. Returns `None` when the conversation is unknown or a
    /// reply is already in flight, serializing one exchange per
    /// conversation.
    pub fn begin_reply(&mut self, conversation_id: ConversationId) -> Option<ReplyTarget> {
        let session_id = ReplySessionId::new(self.next_reply_session_id);
        let target = ReplyTarget::new(conversation_id, session_id);

        let conversation = self.conversation_mut(conversation_id)?;
        match conversation.apply_reply_transition(ReplyTransition::Begin(target)) {
            Ok(_) => {
                self.next_reply_session_id += 1;
                Some(target)
            }
            Err(rejection) => {
                tracing::debug!(
                    conversation_id = %conversation_id,
                    ?rejection,
                    "reply already in flight; send is not actionable"
                );
                None
            }
        }
    }

    /// Completes a reply exchange: appends the assistant message into the
    /// target's own conversation and returns the conversation to idle.
    ///
    /// The completion is routed by the target, never by the active
    /// selection, so a reply always lands in the conversation that
    /// originated it. Stale or mismatched targets are discarded.
    pub fn complete_reply(
        &mut self,
        target: ReplyTarget,
        content: impl Into<String>,
    ) -> Option<MessageId> {
        let conversation = match self.conversation_mut(target.conversation_id) {
            Some(conversation) => conversation,
            None => {
                tracing::debug!(
                    conversation_id = %target.conversation_id,
                    "discarding reply completion for unknown conversation"
                );
                return None;
            }
        };

        if let Err(rejection) = conversation.apply_reply_transition(ReplyTransition::Complete(target))
        {
            tracing::debug!(
                conversation_id = %target.conversation_id,
                ?rejection,
                "discarding stale reply completion"
            );
            return None;
        }

        self.append_message(target.conversation_id, Role::Assistant, content)
    }

    /// Cancels a pending reply exchange, returning the conversation to idle
    /// without appending anything.
    pub fn cancel_reply(&mut self, target: ReplyTarget) {
        let Some(conversation) = self.conversation_mut(target.conversation_id) else {
            return;
        };

        if let Err(rejection) = conversation.apply_reply_transition(ReplyTransition::Cancel(target))
        {
            tracing::debug!(
                conversation_id = %target.conversation_id,
                ?rejection,
                "ignoring cancel for inactive reply"
            );
        }
    }

    /// Returns directory rows, newest-created first.
    pub fn list_conversations(&self) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .map(ConversationSummary::from)
            .collect()
    }

    pub fn conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == id)
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.active_conversation_id
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation_id
            .and_then(|id| self.conversation(id))
    }

    /// Messages of the active conversation, in creation order. Empty when
    /// no conversation is active.
    pub fn active_messages(&self) -> &[Message] {
        self.active_conversation()
            .map(|conversation| conversation.messages.as_slice())
            .unwrap_or_default()
    }

    pub fn is_awaiting_reply(&self, id: ConversationId) -> bool {
        self.conversation(id)
            .is_some_and(Conversation::is_awaiting_reply)
    }

    /// Projection of the typing indicator: true while the active
    /// conversation awaits its reply. Reply state itself is kept per
    /// conversation, so in-flight exchanges elsewhere do not show here.
    pub fn is_assistant_typing(&self) -> bool {
        self.active_conversation()
            .is_some_and(Conversation::is_awaiting_reply)
    }

    fn conversation_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|conversation| conversation.id == id)
    }

    fn allocate_conversation_id(&mut self) -> ConversationId {
        let id = ConversationId::new(self.next_conversation_id);
        self.next_conversation_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_count(session: &Session, id: ConversationId) -> usize {
        session
            .conversation(id)
            .map(|conversation| conversation.messages.len())
            .unwrap_or(0)
    }

    #[test]
    fn seed_history_matches_the_startup_fixture() {
        let session = Session::with_seed_history();
        let summaries = session.list_conversations();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Chat about AI");
        assert_eq!(summaries[1].title, "Web development help");
        assert_eq!(
            session.active_conversation_id(),
            Some(ConversationId::new(1))
        );
        assert!(!session.is_assistant_typing());
    }

    #[test]
    fn create_conversation_twice_yields_distinct_ids_newest_first() {
        let mut session = Session::new();
        let first = session.create_conversation();
        let second = session.create_conversation();

        assert_ne!(first, second);
        let summaries = session.list_conversations();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, second);
        assert_eq!(summaries[1].id, first);
        assert_eq!(session.active_conversation_id(), Some(second));
        assert!(
            summaries
                .iter()
                .all(|summary| summary.title == DEFAULT_CONVERSATION_TITLE)
        );
    }

    #[test]
    fn append_grows_only_the_target_conversation() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);
        let second = ConversationId::new(2);

        let appended = session.append_message(first, Role::User, "Hello there");
        assert!(appended.is_some());
        assert_eq!(message_count(&session, first), 1);
        assert_eq!(message_count(&session, second), 0);
    }

    #[test]
    fn empty_and_whitespace_user_messages_are_rejected() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);

        assert_eq!(session.append_message(first, Role::User, ""), None);
        assert_eq!(session.append_message(first, Role::User, "   "), None);
        assert_eq!(message_count(&session, first), 0);
    }

    #[test]
    fn assistant_messages_are_exempt_from_emptiness_validation() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);

        assert!(session.append_message(first, Role::Assistant, "").is_some());
        assert_eq!(message_count(&session, first), 1);
    }

    #[test]
    fn append_to_unknown_conversation_is_a_silent_no_op() {
        let mut session = Session::with_seed_history();
        assert_eq!(
            session.append_message(ConversationId::new(99), Role::User, "hello"),
            None
        );
    }

    #[test]
    fn message_order_equals_call_order() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);

        session.append_message(first, Role::User, "one");
        session.append_message(first, Role::Assistant, "two");
        session.append_message(first, Role::User, "three");

        let contents: Vec<&str> = session
            .conversation(first)
            .expect("seed conversation")
            .messages
            .iter()
            .map(|message| message.content.as_str())
            .collect();
        assert_eq!(contents, ["one", "two", "three"]);

        let ids: Vec<u64> = session
            .conversation(first)
            .expect("seed conversation")
            .messages
            .iter()
            .map(|message| message.id.raw())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn selecting_unknown_conversation_keeps_the_active_one() {
        let mut session = Session::with_seed_history();
        session.select_conversation(ConversationId::new(42));
        assert_eq!(
            session.active_conversation_id(),
            Some(ConversationId::new(1))
        );
    }

    #[test]
    fn selecting_another_conversation_switches_the_message_view() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);
        let second = ConversationId::new(2);

        session.append_message(first, Role::User, "kept on one");
        session.select_conversation(second);

        assert_eq!(session.active_conversation_id(), Some(second));
        assert!(session.active_messages().is_empty());

        session.select_conversation(first);
        assert_eq!(session.active_messages().len(), 1);
    }

    #[test]
    fn begin_reply_serializes_one_exchange_per_conversation() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);

        let target = session.begin_reply(first).expect("first exchange starts");
        assert!(session.is_awaiting_reply(first));
        assert_eq!(session.begin_reply(first), None);

        // A different conversation is unaffected by the in-flight exchange.
        let second = ConversationId::new(2);
        let other = session.begin_reply(second).expect("independent exchange");
        assert_ne!(target.session_id, other.session_id);
    }

    #[test]
    fn complete_reply_lands_in_the_originating_conversation() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);
        let second = ConversationId::new(2);

        let target = session.begin_reply(first).expect("exchange starts");
        session.select_conversation(second);

        let appended = session.complete_reply(target, "echoed");
        assert!(appended.is_some());
        assert_eq!(message_count(&session, first), 1);
        assert_eq!(message_count(&session, second), 0);
        assert!(!session.is_awaiting_reply(first));
        // The active conversation never saw the exchange, so no typing.
        assert!(!session.is_assistant_typing());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);

        let target = session.begin_reply(first).expect("exchange starts");
        session.cancel_reply(target);
        assert!(!session.is_awaiting_reply(first));

        assert_eq!(session.complete_reply(target, "late echo"), None);
        assert_eq!(message_count(&session, first), 0);
    }

    #[test]
    fn typing_projection_follows_the_active_conversation() {
        let mut session = Session::with_seed_history();
        let first = ConversationId::new(1);
        let second = ConversationId::new(2);

        session.begin_reply(first).expect("exchange starts");
        assert!(session.is_assistant_typing());

        session.select_conversation(second);
        assert!(!session.is_assistant_typing());
        assert!(session.is_awaiting_reply(first));
    }
}
