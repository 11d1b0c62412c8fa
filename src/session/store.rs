use chrono::{DateTime, Utc};

use crate::factor::FactorKind;

use super::challenge::{ChallengeOverview, OtpDispatch, SecondFactorChallenge};
use super::state::AuthState;

/// The fully authenticated session artifact.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Opaque bearer token for subsequent authorized calls. The only piece
    /// of state worth persisting across restarts.
    pub access_token: String,
    /// Provider-supplied profile payload, passed through untouched.
    pub profile: Option<serde_json::Value>,
}

/// Mutable authentication state for one logical session.
///
/// The orchestrator is the only writer; mutators are crate-private and each
/// corresponds to one state-machine transition. Read accessors expose
/// derived views only — in particular the raw challenge token stays inside
/// the crate.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: AuthState,
    identifier: Option<String>,
    challenge: Option<SecondFactorChallenge>,
    dispatch: Option<OtpDispatch>,
    session: Option<AuthenticatedSession>,
    verify_attempts: u32,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    /// The identifier used for the in-progress (or completed) login.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Enrolled factors of the live challenge, in priority order.
    pub fn enrolled_factors(&self) -> Option<Vec<FactorKind>> {
        self.challenge
            .as_ref()
            .map(|c| c.enrolled.iter().copied().collect())
    }

    pub fn challenge_expires_at(&self) -> Option<DateTime<Utc>> {
        self.challenge.as_ref().map(|c| c.expires_at)
    }

    pub fn challenge_overview(&self) -> Option<ChallengeOverview> {
        self.challenge.as_ref().map(SecondFactorChallenge::overview)
    }

    pub(crate) fn challenge(&self) -> Option<&SecondFactorChallenge> {
        self.challenge.as_ref()
    }

    pub(crate) fn dispatch(&self) -> Option<&OtpDispatch> {
        self.dispatch.as_ref()
    }

    /// Begin a challenge flow: replaces any prior challenge, dispatch and
    /// session wholesale.
    pub(crate) fn install_challenge(
        &mut self,
        identifier: String,
        challenge: SecondFactorChallenge,
    ) {
        self.state = AuthState::ChallengeIssued;
        self.identifier = Some(identifier);
        self.challenge = Some(challenge);
        self.dispatch = None;
        self.session = None;
        self.verify_attempts = 0;
    }

    pub(crate) fn select_factor(&mut self, factor: FactorKind) {
        self.state = AuthState::FactorSelected(factor);
        self.dispatch = None;
        self.verify_attempts = 0;
    }

    pub(crate) fn record_dispatch(&mut self, dispatch: OtpDispatch) {
        self.state = AuthState::OtpPending(dispatch.factor);
        self.dispatch = Some(dispatch);
    }

    /// Complete authentication: installs the session and consumes the
    /// challenge and any dispatch record.
    pub(crate) fn install_session(&mut self, identifier: Option<String>, session: AuthenticatedSession) {
        self.state = AuthState::Authenticated;
        if identifier.is_some() {
            self.identifier = identifier;
        }
        self.challenge = None;
        self.dispatch = None;
        self.session = Some(session);
        self.verify_attempts = 0;
    }

    /// Count a rejected verification attempt; returns the running total.
    pub(crate) fn record_failed_verify(&mut self) -> u32 {
        self.verify_attempts += 1;
        self.verify_attempts
    }

    /// Unrecoverable failure: drop everything, land in `Failed`.
    pub(crate) fn fail(&mut self) {
        self.state = AuthState::Failed;
        self.identifier = None;
        self.challenge = None;
        self.dispatch = None;
        self.session = None;
        self.verify_attempts = 0;
    }

    /// Full reset to `Unauthenticated`. Idempotent.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn sample_challenge() -> SecondFactorChallenge {
        SecondFactorChallenge {
            token: "C1".to_string(),
            expires_at: Utc::now() + Duration::minutes(5),
            enrolled: BTreeSet::from([FactorKind::SmsOtp, FactorKind::EmailOtp]),
            manual_entry_code: None,
            qr_payload: None,
            phone_hint: None,
            email_hint: None,
            security_questions: Vec::new(),
        }
    }

    fn sample_session() -> AuthenticatedSession {
        AuthenticatedSession {
            access_token: "T1".to_string(),
            profile: None,
        }
    }

    #[test]
    fn new_store_is_unauthenticated_and_empty() {
        let store = SessionStore::new();
        assert_eq!(store.state(), AuthState::Unauthenticated);
        assert!(store.access_token().is_none());
        assert!(store.enrolled_factors().is_none());
    }

    #[test]
    fn install_challenge_replaces_prior_session() {
        let mut store = SessionStore::new();
        store.install_session(Some("old@b.com".to_string()), sample_session());
        store.install_challenge("a@b.com".to_string(), sample_challenge());

        assert_eq!(store.state(), AuthState::ChallengeIssued);
        assert!(store.access_token().is_none());
        assert_eq!(store.identifier(), Some("a@b.com"));
        assert_eq!(
            store.enrolled_factors(),
            Some(vec![FactorKind::EmailOtp, FactorKind::SmsOtp])
        );
    }

    #[test]
    fn install_session_consumes_challenge_and_dispatch() {
        let mut store = SessionStore::new();
        store.install_challenge("a@b.com".to_string(), sample_challenge());
        store.select_factor(FactorKind::EmailOtp);
        store.record_dispatch(OtpDispatch {
            factor: FactorKind::EmailOtp,
            dispatched_at: Utc::now(),
        });
        store.install_session(None, sample_session());

        assert_eq!(store.state(), AuthState::Authenticated);
        assert_eq!(store.access_token(), Some("T1"));
        assert!(store.challenge().is_none());
        assert!(store.dispatch().is_none());
        assert_eq!(store.identifier(), Some("a@b.com"));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut store = SessionStore::new();
        store.install_challenge("a@b.com".to_string(), sample_challenge());
        store.reset();
        store.reset();
        assert_eq!(store.state(), AuthState::Unauthenticated);
        assert!(store.identifier().is_none());
        assert!(store.challenge().is_none());
    }

    #[test]
    fn failed_verify_attempts_accumulate_until_reset() {
        let mut store = SessionStore::new();
        store.install_challenge("a@b.com".to_string(), sample_challenge());
        store.select_factor(FactorKind::EmailOtp);
        assert_eq!(store.record_failed_verify(), 1);
        assert_eq!(store.record_failed_verify(), 2);
        store.select_factor(FactorKind::SmsOtp);
        assert_eq!(store.record_failed_verify(), 1);
    }
}
