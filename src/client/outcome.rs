//! Request and outcome types of the caller-facing operations.
//!
//! Callers pattern-match on these instead of probing optional response
//! fields; each operation returns exactly one of them or a typed
//! [`AuthError`](crate::error::AuthError).

use chrono::{DateTime, Utc};

use crate::factor::FactorKind;
use crate::session::{AuthenticatedSession, ChallengeOverview};

/// Primary login input. Consumed by the single login call, never stored.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

/// What the primary login call produced.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Single-factor fast path: the account has no second factor and is
    /// fully authenticated.
    SignedIn { session: AuthenticatedSession },
    /// A second factor is required; pick one from `challenge.factors`.
    ChallengeRequired { challenge: ChallengeOverview },
}

/// Acknowledgement that a one-time code was dispatched.
#[derive(Debug, Clone, Copy)]
pub struct DispatchOutcome {
    pub factor: FactorKind,
    pub dispatched_at: DateTime<Utc>,
}

/// Successful completion of a verification step.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub session: AuthenticatedSession,
}

/// Result of adding a second factor to an authenticated account.
#[derive(Debug, Clone, Copy)]
pub struct EnrollOutcome {
    /// Whether the provider accepted the enrollment.
    pub accepted: bool,
}

/// Factor-specific enrollment payload. Requires an authenticated session;
/// enrollment never uses the challenge token.
#[derive(Debug, Clone)]
pub enum EnrollmentRequest {
    /// Register a phone number for SMS one-time codes.
    Sms { phone_number: String },
    /// Configure security questions with their answers.
    SecurityQuestions { answers: Vec<SecurityAnswer> },
    /// Begin authenticator-app setup; the provider issues the QR/manual
    /// entry material out of band.
    AuthenticatorApp,
}

impl EnrollmentRequest {
    /// The factor this request enrolls.
    pub fn factor(&self) -> FactorKind {
        match self {
            Self::Sms { .. } => FactorKind::SmsOtp,
            Self::SecurityQuestions { .. } => FactorKind::SecurityQuestions,
            Self::AuthenticatorApp => FactorKind::AuthenticatorApp,
        }
    }
}

/// One answered security question, for verification or enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityAnswer {
    pub question_id: String,
    pub answer: String,
}

impl SecurityAnswer {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}
