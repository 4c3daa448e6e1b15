use crate::ids::{ConversationId, ReplySessionId};

/// Reply routing key used for stale-completion rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTarget {
    pub conversation_id: ConversationId,
    pub session_id: ReplySessionId,
}

impl ReplyTarget {
    /// Builds a full reply target from conversation and session IDs.
    pub const fn new(conversation_id: ConversationId, session_id: ReplySessionId) -> Self {
        Self {
            conversation_id,
            session_id,
        }
    }
}

/// Reply lifecycle boundary for one conversation.
///
/// A conversation is either idle or awaiting exactly one simulated reply.
/// The simulated exchange has no failure mode, so unlike a real provider
/// stream there are no error or partial states: completion and cancellation
/// both return to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyState {
    #[default]
    Idle,
    Awaiting(ReplyTarget),
}

/// State transition input for the reply lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTransition {
    Begin(ReplyTarget),
    Complete(ReplyTarget),
    Cancel(ReplyTarget),
}

/// Rejection reason for illegal reply transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTransitionRejection {
    ReplyInFlight {
        active: ReplyTarget,
        attempted: ReplyTarget,
    },
    NoPendingReply,
    SessionMismatch {
        active: ReplyTarget,
        attempted: ReplyTarget,
    },
}

/// Result type for reply transition application.
pub type ReplyTransitionResult = Result<ReplyState, ReplyTransitionRejection>;

impl ReplyState {
    /// Returns the awaited target if and only if a reply is in flight.
    pub fn awaiting_target(&self) -> Option<ReplyTarget> {
        match self {
            Self::Awaiting(target) => Some(*target),
            Self::Idle => None,
        }
    }

    /// Returns true while a reply is in flight.
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::Awaiting(_))
    }

    /// Returns true when a completion matches the awaited exchange.
    pub fn accepts_completion(&self, target: ReplyTarget) -> bool {
        matches!(self, Self::Awaiting(active) if *active == target)
    }

    /// Applies one transition deterministically.
    ///
    /// `Begin` is only legal from `Idle` (re-beginning the active target is
    /// a no-op). `Complete` and `Cancel` must name the awaited target
    /// exactly; anything else is rejected so a stale timer can never finish
    /// another exchange.
    pub fn apply(&self, transition: ReplyTransition) -> ReplyTransitionResult {
        match transition {
            ReplyTransition::Begin(target) => self.apply_begin(target),
            ReplyTransition::Complete(target) => self.apply_complete(target),
            ReplyTransition::Cancel(target) => self.apply_cancel(target),
        }
    }

    fn apply_begin(&self, target: ReplyTarget) -> ReplyTransitionResult {
        match self {
            Self::Awaiting(active) if *active == target => Ok(*self),
            Self::Awaiting(active) => Err(ReplyTransitionRejection::ReplyInFlight {
                active: *active,
                attempted: target,
            }),
            Self::Idle => Ok(Self::Awaiting(target)),
        }
    }

    fn apply_complete(&self, target: ReplyTarget) -> ReplyTransitionResult {
        match self {
            Self::Awaiting(active) if *active == target => Ok(Self::Idle),
            Self::Awaiting(active) => Err(ReplyTransitionRejection::SessionMismatch {
                active: *active,
                attempted: target,
            }),
            Self::Idle => Err(ReplyTransitionRejection::NoPendingReply),
        }
    }

    fn apply_cancel(&self, target: ReplyTarget) -> ReplyTransitionResult {
        match self {
            Self::Awaiting(active) if *active == target => Ok(Self::Idle),
            Self::Awaiting(active) => Err(ReplyTransitionRejection::SessionMismatch {
                active: *active,
                attempted: target,
            }),
            Self::Idle => Err(ReplyTransitionRejection::NoPendingReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ConversationId, ReplySessionId};

    fn target(conversation: u64, session: u64) -> ReplyTarget {
        ReplyTarget::new(ConversationId::new(conversation), ReplySessionId::new(session))
    }

    #[test]
    fn begin_moves_idle_to_awaiting() {
        let state = ReplyState::Idle;
        let next = state.apply(ReplyTransition::Begin(target(1, 1)));
        assert_eq!(next, Ok(ReplyState::Awaiting(target(1, 1))));
    }

    #[test]
    fn begin_is_idempotent_for_the_active_target() {
        let state = ReplyState::Awaiting(target(1, 1));
        let next = state.apply(ReplyTransition::Begin(target(1, 1)));
        assert_eq!(next, Ok(ReplyState::Awaiting(target(1, 1))));
    }

    #[test]
    fn begin_rejects_second_exchange_while_awaiting() {
        let state = ReplyState::Awaiting(target(1, 1));
        let next = state.apply(ReplyTransition::Begin(target(1, 2)));
        assert_eq!(
            next,
            Err(ReplyTransitionRejection::ReplyInFlight {
                active: target(1, 1),
                attempted: target(1, 2),
            })
        );
    }

    #[test]
    fn complete_returns_to_idle_only_for_the_awaited_target() {
        let state = ReplyState::Awaiting(target(1, 1));
        assert_eq!(
            state.apply(ReplyTransition::Complete(target(1, 1))),
            Ok(ReplyState::Idle)
        );
        assert_eq!(
            state.apply(ReplyTransition::Complete(target(1, 9))),
            Err(ReplyTransitionRejection::SessionMismatch {
                active: target(1, 1),
                attempted: target(1, 9),
            })
        );
    }

    #[test]
    fn terminal_transitions_from_idle_are_rejected() {
        let state = ReplyState::Idle;
        assert_eq!(
            state.apply(ReplyTransition::Complete(target(1, 1))),
            Err(ReplyTransitionRejection::NoPendingReply)
        );
        assert_eq!(
            state.apply(ReplyTransition::Cancel(target(1, 1))),
            Err(ReplyTransitionRejection::NoPendingReply)
        );
    }

    #[test]
    fn cancel_discards_the_awaited_exchange() {
        let state = ReplyState::Awaiting(target(3, 7));
        assert_eq!(
            state.apply(ReplyTransition::Cancel(target(3, 7))),
            Ok(ReplyState::Idle)
        );
    }

    #[test]
    fn completion_acceptance_requires_exact_session_match() {
        let state = ReplyState::Awaiting(target(2, 4));
        assert!(state.accepts_completion(target(2, 4)));
        assert!(!state.accepts_completion(target(2, 5)));
        assert!(!ReplyState::Idle.accepts_completion(target(2, 4)));
    }
}
