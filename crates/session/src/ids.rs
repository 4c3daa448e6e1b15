use std::fmt;

// Macro keeps all ID wrappers structurally identical, so new id kinds stay predictable.
macro_rules! define_session_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Creates a typed identifier from its raw value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            pub const fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_session_id!(
    /// Stable identifier for one conversation.
    ConversationId
);
define_session_id!(
    /// Stable identifier for one message.
    MessageId
);
define_session_id!(
    /// Identifier for one simulated reply exchange.
    ///
    /// This must change on every send so stale completions can be rejected.
    ReplySessionId
);
