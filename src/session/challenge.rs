use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::error::AuthError;
use crate::factor::FactorKind;

/// A live second-factor challenge.
///
/// Owned exclusively by the session store; the raw `token` never crosses the
/// crate boundary. Callers see a [`ChallengeOverview`] instead.
#[derive(Debug, Clone)]
pub struct SecondFactorChallenge {
    pub(crate) token: String,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) enrolled: BTreeSet<FactorKind>,
    pub(crate) manual_entry_code: Option<String>,
    pub(crate) qr_payload: Option<String>,
    pub(crate) phone_hint: Option<String>,
    pub(crate) email_hint: Option<String>,
    pub(crate) security_questions: Vec<SecurityQuestion>,
}

impl SecondFactorChallenge {
    pub(crate) fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub(crate) fn overview(&self) -> ChallengeOverview {
        ChallengeOverview {
            expires_at: self.expires_at,
            factors: self.enrolled.iter().copied().collect(),
            manual_entry_code: self.manual_entry_code.clone(),
            qr_payload: self.qr_payload.clone(),
            phone_hint: self.phone_hint.clone(),
            email_hint: self.email_hint.clone(),
            security_questions: self.security_questions.clone(),
        }
    }
}

/// Caller-facing view of a challenge: everything a factor-selection screen
/// needs, without the challenge token.
#[derive(Debug, Clone)]
pub struct ChallengeOverview {
    pub expires_at: DateTime<Utc>,
    /// Selectable factors in fixed priority order.
    pub factors: Vec<FactorKind>,
    /// Authenticator-app setup code, when the provider supplied one.
    pub manual_entry_code: Option<String>,
    /// Authenticator-app QR payload, when the provider supplied one.
    pub qr_payload: Option<String>,
    /// Masked phone number the SMS code would go to.
    pub phone_hint: Option<String>,
    /// Email address the email code would go to.
    pub email_hint: Option<String>,
    /// Question prompts for the security-questions factor.
    pub security_questions: Vec<SecurityQuestion>,
}

/// A provider-supplied security question prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityQuestion {
    pub question_id: String,
    pub question: String,
}

/// Record of a one-time code having been requested.
#[derive(Debug, Clone, Copy)]
pub struct OtpDispatch {
    pub factor: FactorKind,
    pub dispatched_at: DateTime<Utc>,
}

/// Parse the provider's challenge expiry.
///
/// The wire value is a string that is either an RFC 3339 timestamp or a
/// number of seconds the challenge stays valid from receipt; both occur in
/// this provider family.
pub(crate) fn parse_expire_in(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Ok(Utc::now() + Duration::seconds(seconds));
    }
    Err(AuthError::MalformedResponse(format!(
        "unparseable challenge expiry: {trimmed:?}"
    )))
}
