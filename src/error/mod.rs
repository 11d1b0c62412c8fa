//! Error types for twofold.

use thiserror::Error;

use crate::factor::FactorKind;
use crate::session::AuthState;
use crate::transport::TransportError;

/// Primary error type for all twofold operations.
///
/// Precondition violations (`InvalidSelection`, `DispatchRequiredFirst`,
/// `InvalidState`, `Unauthorized`) are rejected locally before any network
/// call and never mutate the session. Everything else reflects a provider
/// interaction; [`AuthError::is_retryable`] tells the caller whether
/// repeating the same operation can succeed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Second-factor challenge expired")]
    ChallengeExpired,

    #[error("Factor {0} is not offered for this challenge")]
    InvalidSelection(FactorKind),

    #[error("A one-time code must be requested before verifying {0}")]
    DispatchRequiredFirst(FactorKind),

    #[error("Provider rejected the code")]
    InvalidCode,

    #[error("Provider declined to dispatch a one-time code: {0}")]
    DispatchFailed(String),

    #[error("Challenge offers no usable second factor")]
    NoFactorsEnrolled,

    #[error("{operation} is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: AuthState,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse grouping used to decide retry vs. restart-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong credentials or code; the user can try different input.
    Rejection,
    /// The challenge is no longer usable; restart from `login`.
    Challenge,
    /// The call was invalid where it was made; a client bug, not provider state.
    Precondition,
    /// The provider could not be reached or failed; the same call may succeed.
    Transport,
    /// The provider answered with something uninterpretable.
    Protocol,
    /// Local configuration or storage problem.
    Local,
}

impl AuthError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCredentials | Self::InvalidCode => ErrorCategory::Rejection,
            Self::ChallengeExpired | Self::NoFactorsEnrolled | Self::DispatchFailed(_) => {
                ErrorCategory::Challenge
            }
            Self::InvalidSelection(_)
            | Self::DispatchRequiredFirst(_)
            | Self::InvalidState { .. }
            | Self::Unauthorized => ErrorCategory::Precondition,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::MalformedResponse(_) => ErrorCategory::Protocol,
            Self::Configuration(_) | Self::Io(_) | Self::Serialization(_) => ErrorCategory::Local,
        }
    }

    /// Whether re-invoking the same operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Rejection | ErrorCategory::Transport
        )
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;
