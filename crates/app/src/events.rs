use mira_session::ConversationId;

/// Emitted by the controller whenever observable session state changes.
///
/// The presentation layer re-reads the store on receipt; events carry ids,
/// not data, so a slow subscriber can never render stale message bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The thread directory changed (a conversation was created).
    ConversationsChanged,
    /// A conversation's message sequence grew or became the active view.
    MessagesChanged { conversation_id: ConversationId },
    /// A conversation entered or left the awaiting-reply state.
    TypingChanged {
        conversation_id: ConversationId,
        is_typing: bool,
    },
}
