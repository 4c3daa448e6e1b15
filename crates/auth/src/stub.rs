use std::time::Duration;

use futures::future::BoxFuture;

use crate::forms::require_field;
use crate::gate::{AuthGate, AuthOutcome, AuthRequest, AuthResult};

pub const STUB_GATE_ID: &str = "stub";

/// Delay before the stub resolves, standing in for a round trip.
pub const DEFAULT_AUTH_DELAY_MS: u64 = 1_500;

/// Gate that accepts any present credentials after a fixed delay.
///
/// No verification, no token issuance, no persistence. The only rejection
/// is a missing required field, checked before the delay starts.
pub struct StubAuthGate {
    delay: Duration,
}

impl Default for StubAuthGate {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTH_DELAY_MS))
    }
}

impl StubAuthGate {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn validate(request: &AuthRequest) -> AuthResult<()> {
        match request {
            AuthRequest::Login(credentials) => {
                require_field("email", &credentials.email, "login-submit")?;
                require_field("password", &credentials.password, "login-submit")?;
            }
            AuthRequest::Signup(form) => {
                require_field("email", &form.email, "signup-submit")?;
                require_field("phone number", &form.phone_number, "signup-submit")?;
                require_field("username", &form.username, "signup-submit")?;
                require_field("password", &form.password, "signup-submit")?;
            }
        }
        Ok(())
    }
}

impl AuthGate for StubAuthGate {
    fn id(&self) -> &str {
        STUB_GATE_ID
    }

    fn submit(&self, request: AuthRequest) -> BoxFuture<'static, AuthResult<AuthOutcome>> {
        let delay = self.delay;
        Box::pin(async move {
            Self::validate(&request)?;

            tokio::time::sleep(delay).await;
            match &request {
                AuthRequest::Login(credentials) => {
                    tracing::info!(email = %credentials.email, "stub gate accepted sign-in");
                }
                AuthRequest::Signup(form) => {
                    tracing::info!(username = %form.username, "stub gate accepted signup");
                }
            }
            Ok(AuthOutcome::Accepted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{LoginCredentials, SignupFlow};
    use crate::gate::AuthError;

    #[tokio::test(start_paused = true)]
    async fn login_with_any_present_credentials_is_accepted_after_the_delay() {
        let gate = StubAuthGate::default();
        let request = AuthRequest::Login(LoginCredentials::new("name@example.com", "anything"));

        let started = tokio::time::Instant::now();
        let outcome = gate.submit(request).await.expect("stub always accepts");
        assert_eq!(outcome, AuthOutcome::Accepted);
        assert_eq!(
            started.elapsed(),
            Duration::from_millis(DEFAULT_AUTH_DELAY_MS)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_fields_are_rejected_before_the_delay() {
        let gate = StubAuthGate::default();
        let request = AuthRequest::Login(LoginCredentials::new("name@example.com", ""));

        let started = tokio::time::Instant::now();
        let error = gate.submit(request).await.expect_err("password is missing");
        assert!(matches!(
            error,
            AuthError::MissingField {
                field: "password",
                ..
            }
        ));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_signup_flow_is_accepted() {
        let mut flow = SignupFlow::new();
        flow.form_mut().email = "name@example.com".to_string();
        flow.form_mut().phone_number = "+1234567890".to_string();
        flow.form_mut().username = "name".to_string();
        flow.advance().expect("profile step passes");
        flow.form_mut().password = "secret".to_string();
        flow.advance().expect("security step passes");

        let gate = StubAuthGate::default();
        let outcome = gate
            .submit(AuthRequest::Signup(flow.into_form()))
            .await
            .expect("stub always accepts");
        assert_eq!(outcome, AuthOutcome::Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_submission_discards_it() {
        let gate = StubAuthGate::default();
        let request = AuthRequest::Login(LoginCredentials::new("name@example.com", "anything"));

        // Poll once so the timer registers, then drop before it fires.
        let mut submission = gate.submit(request);
        assert!(futures::poll!(&mut submission).is_pending());
        drop(submission);

        // Nothing to observe afterwards: the future owned the whole
        // exchange, so dropping it is the cancellation.
        tokio::time::advance(Duration::from_millis(DEFAULT_AUTH_DELAY_MS)).await;
    }
}
