use std::fmt;

use crate::factor::FactorKind;

/// Position in the login sequence.
///
/// `Failed` is terminal for the current attempt; `login` or `logout` leave
/// it. There is no separate logged-out state: `logout` resets to
/// `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// Primary credentials accepted; a second factor is required.
    ChallengeIssued,
    /// A factor was chosen but not yet completed.
    FactorSelected(FactorKind),
    /// A one-time code was dispatched and awaits verification.
    OtpPending(FactorKind),
    Authenticated,
    Failed,
}

impl AuthState {
    /// Whether a live challenge is expected to exist in this state.
    pub fn in_challenge(self) -> bool {
        matches!(
            self,
            Self::ChallengeIssued | Self::FactorSelected(_) | Self::OtpPending(_)
        )
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::ChallengeIssued => write!(f, "ChallengeIssued"),
            Self::FactorSelected(factor) => write!(f, "FactorSelected({factor})"),
            Self::OtpPending(factor) => write!(f, "OtpPending({factor})"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
