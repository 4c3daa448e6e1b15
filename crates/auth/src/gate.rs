use futures::future::BoxFuture;
use snafu::Snafu;

use crate::forms::{LoginCredentials, SignupForm};

/// One submission to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login(LoginCredentials),
    Signup(SignupForm),
}

/// Gate decision. The stub only ever accepts; a real verifier would add
/// rejection kinds (and a retry policy) behind the same trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Accepted,
}

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuthError {
    #[snafu(display("required field '{field}' is missing"))]
    MissingField {
        stage: &'static str,
        field: &'static str,
    },
}

/// Credential-acceptance boundary.
///
/// Submission is asynchronous: the returned future resolves after the
/// gate's (simulated) round trip. Dropping the future abandons the pending
/// submission.
pub trait AuthGate: Send + Sync {
    fn id(&self) -> &str;
    fn submit(&self, request: AuthRequest) -> BoxFuture<'static, AuthResult<AuthOutcome>>;
}
