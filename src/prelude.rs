//! Convenience re-exports for common use.

pub use crate::client::{
    AuthClient, Credentials, DispatchOutcome, EnrollOutcome, EnrollmentRequest, LoginOutcome,
    SecurityAnswer, VerifyOutcome,
};
pub use crate::config::AuthConfig;
pub use crate::error::{AuthError, Result};
pub use crate::factor::FactorKind;
pub use crate::session::{AuthState, AuthenticatedSession, ChallengeOverview, SecurityQuestion};
