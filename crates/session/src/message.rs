use std::time::{SystemTime, UNIX_EPOCH};

use crate::ids::MessageId;

/// Chat speaker role, fixed at message creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

/// Core immutable message model.
///
/// Messages are append-only: once inserted into a conversation they are
/// never edited, reordered, or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub created_at_unix_seconds: u64,
}

impl Message {
    /// Creates a message with an explicit timestamp.
    pub fn new(
        id: MessageId,
        role: Role,
        content: impl Into<String>,
        created_at_unix_seconds: u64,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at_unix_seconds,
        }
    }

    /// Creates a user-authored message stamped with the current time.
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content, current_unix_timestamp_seconds())
    }

    /// Creates a synthesized assistant message stamped with the current time.
    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(
            id,
            Role::Assistant,
            content,
            current_unix_timestamp_seconds(),
        )
    }
}

pub(crate) fn current_unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
