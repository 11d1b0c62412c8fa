//! Maps provider enrollment flags to the factor set.
//!
//! The provider reports enrollment through a handful of loosely named
//! booleans and presence checks inside the second-factor block. This module
//! is the only place that knows those field semantics; the orchestrator and
//! callers only ever see [`FactorKind`] values.

use std::collections::BTreeSet;

use crate::client::wire::SecondFactorBlock;

use super::FactorKind;

/// Derive the set of selectable factors from a provider challenge payload.
///
/// A factor is offered when the provider either marks it verified or has the
/// delivery target on file (an email address for email OTP, a phone number
/// for SMS OTP, a question list for security questions). The returned set
/// iterates in fixed priority order.
pub(crate) fn derive_factors(block: &SecondFactorBlock) -> BTreeSet<FactorKind> {
    let mut factors = BTreeSet::new();
    if block.email_otp_verified || !block.email.is_empty() || block.email_otp_status.is_some() {
        factors.insert(FactorKind::EmailOtp);
    }
    if block.sms_otp_verified || has_text(&block.otp_phone_no) {
        factors.insert(FactorKind::SmsOtp);
    }
    if block.authenticator_verified || block.google_authenticator_verified {
        factors.insert(FactorKind::AuthenticatorApp);
    }
    if block.security_questions_set || !block.security_questions.is_empty() {
        factors.insert(FactorKind::SecurityQuestions);
    }
    factors
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
