#![deny(unsafe_code)]

/// Assistant responder boundary.
///
/// The session core treats reply generation as a pluggable collaborator:
/// a responder takes a prompt and hands back an event stream plus a worker
/// future the caller spawns. The only implementation here synthesizes a
/// deterministic echo after a fixed delay; a real backend would implement
/// the same trait without touching the session model.
pub mod responder;
pub mod simulated;

pub use responder::{
    AssistantResponder, ReplyEventMapped, ReplyEventPayload, ReplyEventStream, ReplyHandle,
    ReplyRequest, ReplyTarget, ResponderError, ResponderResult, ResponderWorker,
};
pub use simulated::{
    DEFAULT_REPLY_DELAY_MS, ResponderConfig, SIMULATED_RESPONDER_ID, SimulatedResponder,
};
