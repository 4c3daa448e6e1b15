#![deny(unsafe_code)]

/// Stub credential-acceptance boundary.
///
/// There is no real verification here and deliberately so: the gate checks
/// that required fields are present, waits a fixed delay, and accepts. A
/// real implementation would replace the `AuthGate` trait object without
/// touching the session core.
pub mod forms;
pub mod gate;
pub mod stub;

pub use forms::{Gender, LoginCredentials, SignupFlow, SignupForm, SignupStep};
pub use gate::{AuthError, AuthGate, AuthOutcome, AuthRequest, AuthResult};
pub use stub::{DEFAULT_AUTH_DELAY_MS, STUB_GATE_ID, StubAuthGate};
