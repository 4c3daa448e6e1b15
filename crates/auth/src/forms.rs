use crate::gate::{AuthResult, MissingFieldSnafu};

/// Gender selection offered during signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

/// Login form fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Completed signup form, assembled across both steps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignupForm {
    pub email: String,
    pub phone_number: String,
    pub username: String,
    pub gender: Gender,
    pub password: String,
}

/// Signup collection steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    /// Email, phone number, and username.
    Profile,
    /// Gender and password.
    Security,
}

/// Two-step signup collection.
///
/// Each `advance` validates only the fields its current step collects, so
/// the user sees missing-field feedback per step rather than all at once.
/// Going back never discards entered values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupFlow {
    step: SignupStep,
    form: SignupForm,
}

impl Default for SignupFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SignupFlow {
    pub fn new() -> Self {
        Self {
            step: SignupStep::Profile,
            form: SignupForm::default(),
        }
    }

    pub fn step(&self) -> SignupStep {
        self.step
    }

    pub fn form(&self) -> &SignupForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SignupForm {
        &mut self.form
    }

    /// Validates the current step's required fields and moves forward.
    /// Returns true when the flow is ready to submit.
    pub fn advance(&mut self) -> AuthResult<bool> {
        match self.step {
            SignupStep::Profile => {
                require_field("email", &self.form.email, "signup-profile")?;
                require_field("phone number", &self.form.phone_number, "signup-profile")?;
                require_field("username", &self.form.username, "signup-profile")?;
                self.step = SignupStep::Security;
                Ok(false)
            }
            SignupStep::Security => {
                require_field("password", &self.form.password, "signup-security")?;
                Ok(true)
            }
        }
    }

    /// Steps back to the previous screen, keeping entered values.
    pub fn back(&mut self) {
        if self.step == SignupStep::Security {
            self.step = SignupStep::Profile;
        }
    }

    /// Consumes the flow once both steps validated.
    pub fn into_form(self) -> SignupForm {
        self.form
    }
}

pub(crate) fn require_field(
    field: &'static str,
    value: &str,
    stage: &'static str,
) -> AuthResult<()> {
    if value.trim().is_empty() {
        return MissingFieldSnafu { stage, field }.fail();
    }
    Ok(())
}
