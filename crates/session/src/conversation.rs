use crate::ids::ConversationId;
use crate::message::Message;
use crate::reply::{ReplyState, ReplyTransition, ReplyTransitionResult};

/// Placeholder title for conversations created from the thread directory.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Conversation aggregate root for chat state.
///
/// Owns its message sequence exclusively; messages are kept in creation
/// order and only ever appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at_unix_seconds: u64,
    pub messages: Vec<Message>,
    pub reply_state: ReplyState,
}

impl Conversation {
    /// Creates an empty conversation in idle reply state.
    pub fn new(id: ConversationId, title: impl Into<String>, created_at_unix_seconds: u64) -> Self {
        let mut title = title.into();
        if title.trim().is_empty() {
            title = DEFAULT_CONVERSATION_TITLE.to_string();
        }

        Self {
            id,
            title,
            created_at_unix_seconds,
            messages: Vec::new(),
            reply_state: ReplyState::Idle,
        }
    }

    /// Returns true while this conversation awaits a simulated reply.
    pub fn is_awaiting_reply(&self) -> bool {
        self.reply_state.is_awaiting()
    }

    /// Applies a deterministic reply transition.
    pub fn apply_reply_transition(&mut self, transition: ReplyTransition) -> ReplyTransitionResult {
        let next_state = self.reply_state.apply(transition)?;
        self.reply_state = next_state;
        Ok(next_state)
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Directory row for one conversation, in display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub created_at_unix_seconds: u64,
}

impl ConversationSummary {
    pub fn new(id: ConversationId, title: impl Into<String>, created_at_unix_seconds: u64) -> Self {
        Self {
            id,
            title: title.into(),
            created_at_unix_seconds,
        }
    }
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        Self::new(
            conversation.id,
            conversation.title.clone(),
            conversation.created_at_unix_seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_falls_back_to_the_placeholder() {
        let conversation = Conversation::new(ConversationId::new(1), "   ", 0);
        assert_eq!(conversation.title, DEFAULT_CONVERSATION_TITLE);
    }

    #[test]
    fn new_conversation_starts_idle_and_empty() {
        let conversation = Conversation::new(ConversationId::new(1), "Chat about AI", 0);
        assert!(conversation.messages.is_empty());
        assert_eq!(conversation.reply_state, ReplyState::Idle);
        assert!(!conversation.is_awaiting_reply());
    }
}
