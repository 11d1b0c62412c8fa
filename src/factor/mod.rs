//! Second-factor methods and enrollment derivation.

pub mod registry;

use strum::{Display, EnumIter};

/// A second-factor method an account may be enrolled in.
///
/// Variants are declared in selection-priority order, so the derived [`Ord`]
/// is the order factors are offered to the caller regardless of how the
/// provider lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum FactorKind {
    /// One-time code delivered to the account's email address.
    EmailOtp,
    /// One-time code delivered to the phone number on file.
    SmsOtp,
    /// Time-based code from an authenticator app.
    AuthenticatorApp,
    /// Answers to the account's configured security questions.
    SecurityQuestions,
}

impl FactorKind {
    /// Whether completing this factor requires a provider-dispatched
    /// one-time code before verification.
    pub fn requires_dispatch(self) -> bool {
        matches!(self, Self::EmailOtp | Self::SmsOtp)
    }
}
