//! The authentication orchestrator.
//!
//! [`AuthClient`] owns one logical session and drives the login state
//! machine: primary credentials, second-factor challenge, factor selection,
//! one-time-code dispatch/verification, enrollment, and logout. All
//! provider I/O goes through the [`Transport`] gateway; all state lives in
//! the crate-private [`SessionStore`].
//!
//! Endpoint conventions: challenge-scoped calls (`/auth/login/2fa/...`)
//! carry the challenge token as the `secondfactorauthenticationtoken` query
//! parameter; account-scoped calls (`/auth/account/...`) carry an
//! `Authorization: Bearer` header.

pub mod outcome;
pub(crate) mod wire;

pub use outcome::{
    Credentials, DispatchOutcome, EnrollOutcome, EnrollmentRequest, LoginOutcome, SecurityAnswer,
    VerifyOutcome,
};

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::factor::{registry, FactorKind};
use crate::session::challenge::parse_expire_in;
use crate::session::{
    AuthState, AuthenticatedSession, ChallengeOverview, OtpDispatch, SecondFactorChallenge,
    SecurityQuestion, SessionStore,
};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport, TransportError};

use wire::{LoginResponse, PostedResponse, ProviderErrorBody, VerifyResponse};

const LOGIN_PATH: &str = "/identity/v2/auth/login/2fa";
const OTP_EMAIL_PATH: &str = "/identity/v2/auth/login/2fa/otp/email";
const OTP_SMS_PATH: &str = "/identity/v2/auth/login/2fa/otp/sms";
const VERIFY_OTP_EMAIL_PATH: &str = "/identity/v2/auth/login/2fa/verification/otp/email";
const VERIFY_OTP_SMS_PATH: &str = "/identity/v2/auth/login/2fa/verification/otp/sms";
const VERIFY_AUTHENTICATOR_PATH: &str = "/identity/v2/auth/login/2fa/verification/authenticator";
const VERIFY_SECURITY_QUESTIONS_PATH: &str =
    "/identity/v2/auth/login/2fa/verification/securityquestions";
const ENROLL_SMS_PATH: &str = "/identity/v2/auth/account/2fa";
const ENROLL_SECURITY_QUESTIONS_PATH: &str = "/identity/v2/auth/account/2fa/securityquestions";
const ENROLL_AUTHENTICATOR_PATH: &str = "/identity/v2/auth/account/2fa/authenticator";

const CHALLENGE_TOKEN_PARAM: &str = "secondfactorauthenticationtoken";

/// Orchestrates the multi-factor login sequence for one logical session.
///
/// Operations serialize on an internal lock held across the provider call,
/// so a `logout` racing an in-flight verification can never resurrect an
/// authenticated state. Independent sessions (e.g. multiple tabs) use
/// independent `AuthClient` values; there is no shared global state.
///
/// # Example
/// ```no_run
/// use twofold::client::{AuthClient, Credentials, LoginOutcome};
/// use twofold::config::AuthConfig;
///
/// # async fn example() -> twofold::error::Result<()> {
/// let config = AuthConfig::new("https://api.example.com", "app-api-key");
/// let client = AuthClient::new(&config)?;
/// match client.login(Credentials::new("a@b.com", "hunter2")).await? {
///     LoginOutcome::SignedIn { session } => {
///         println!("signed in, token {}", session.access_token);
///     }
///     LoginOutcome::ChallengeRequired { challenge } => {
///         println!("second factor needed: {:?}", challenge.factors);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct AuthClient {
    transport: Arc<dyn Transport>,
    store: Mutex<SessionStore>,
    max_verify_attempts: Option<NonZeroU32>,
}

impl AuthClient {
    /// Build a client over an HTTP transport for the configured provider.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.base_url, &config.api_key, config.timeout)
            .map_err(|e| AuthError::Configuration(e.to_string()))?;
        Ok(Self {
            transport: Arc::new(transport),
            store: Mutex::new(SessionStore::new()),
            max_verify_attempts: config.max_verify_attempts,
        })
    }

    /// Build a client over a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            store: Mutex::new(SessionStore::new()),
            max_verify_attempts: None,
        }
    }

    /// Cap the number of rejected verification attempts before the session
    /// fails. Unlimited when unset; the provider stays the rate-limiting
    /// authority either way.
    pub fn with_max_verify_attempts(mut self, limit: NonZeroU32) -> Self {
        self.max_verify_attempts = Some(limit);
        self
    }

    /// Seed the session from a previously persisted access token.
    ///
    /// The token is trusted on read; whether it is still valid is the
    /// provider's concern at next use.
    pub fn restored(mut self, access_token: impl Into<String>) -> Self {
        self.store.get_mut().install_session(
            None,
            AuthenticatedSession {
                access_token: access_token.into(),
                profile: None,
            },
        );
        self
    }

    /// Convenience: [`AuthClient::new`] followed by [`AuthClient::restored`].
    pub fn restore(config: &AuthConfig, access_token: impl Into<String>) -> Result<Self> {
        Ok(Self::new(config)?.restored(access_token))
    }

    pub async fn current_state(&self) -> AuthState {
        self.store.lock().await.state()
    }

    pub async fn current_token(&self) -> Option<String> {
        self.store.lock().await.access_token().map(str::to_string)
    }

    /// The identifier used for the in-progress or completed login.
    pub async fn identifier(&self) -> Option<String> {
        self.store.lock().await.identifier().map(str::to_string)
    }

    /// Display view of the live challenge, if any. Never exposes the raw
    /// challenge token.
    pub async fn challenge_overview(&self) -> Option<ChallengeOverview> {
        self.store.lock().await.challenge_overview()
    }

    /// Primary credential check.
    ///
    /// Accepted from any state: a login while authenticated or mid-challenge
    /// is a fresh attempt whose success replaces the prior session and
    /// challenge. Invalid credentials reset to `Unauthenticated` for retry;
    /// transport or shape failures land in `Failed` with nothing partial
    /// stored.
    pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome> {
        let mut store = self.store.lock().await;
        let request = ApiRequest::new(Method::Post, LOGIN_PATH).with_body(json!({
            "email": credentials.identifier,
            "password": credentials.secret,
        }));
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                store.fail();
                return Err(error.into());
            }
        };

        if !response.is_success() {
            return match response.status {
                400 | 401 | 403 => {
                    store.reset();
                    Err(AuthError::InvalidCredentials)
                }
                status => {
                    store.fail();
                    Err(status_failure(status, &response))
                }
            };
        }

        let parsed: LoginResponse = match parse_body(&response) {
            Ok(parsed) => parsed,
            Err(error) => {
                store.fail();
                return Err(error);
            }
        };

        if let Some(block) = parsed.second_factor_authentication {
            let expires_at = match parse_expire_in(&block.expire_in) {
                Ok(expires_at) => expires_at,
                Err(error) => {
                    store.fail();
                    return Err(error);
                }
            };
            let enrolled = registry::derive_factors(&block);
            let challenge = SecondFactorChallenge {
                token: block.token,
                expires_at,
                enrolled,
                manual_entry_code: block.manual_entry_code,
                qr_payload: block.qr_code,
                phone_hint: block.otp_phone_no,
                email_hint: block
                    .email_otp_status
                    .map(|status| status.email)
                    .or_else(|| block.email.first().cloned()),
                security_questions: block
                    .security_questions
                    .into_iter()
                    .map(|entry| SecurityQuestion {
                        question_id: entry.question_id,
                        question: entry.question,
                    })
                    .collect(),
            };
            let overview = challenge.overview();
            store.install_challenge(credentials.identifier, challenge);
            tracing::debug!(factors = ?overview.factors, "second factor required");
            return Ok(LoginOutcome::ChallengeRequired {
                challenge: overview,
            });
        }

        match parsed.access_token.filter(|token| !token.is_empty()) {
            Some(access_token) => {
                let session = AuthenticatedSession {
                    access_token,
                    profile: parsed.profile,
                };
                store.install_session(Some(credentials.identifier), session.clone());
                tracing::debug!("single-factor login complete");
                Ok(LoginOutcome::SignedIn { session })
            }
            None => {
                store.fail();
                Err(AuthError::MalformedResponse(
                    "login response carried neither a challenge nor an access token".to_string(),
                ))
            }
        }
    }

    /// Factors the caller may select, in fixed priority order.
    pub async fn list_selectable_factors(&self) -> Result<Vec<FactorKind>> {
        let mut store = self.store.lock().await;
        if store.state() != AuthState::ChallengeIssued {
            return Err(AuthError::InvalidState {
                operation: "list_selectable_factors",
                state: store.state(),
            });
        }
        let factors = store.enrolled_factors().unwrap_or_default();
        if factors.is_empty() {
            // A challenge that offers nothing is provider-side inconsistency.
            store.fail();
            return Err(AuthError::NoFactorsEnrolled);
        }
        Ok(factors)
    }

    /// Choose one of the offered factors.
    pub async fn select_factor(&self, factor: FactorKind) -> Result<()> {
        let mut store = self.store.lock().await;
        if store.state() != AuthState::ChallengeIssued {
            return Err(AuthError::InvalidState {
                operation: "select_factor",
                state: store.state(),
            });
        }
        let offered = store.enrolled_factors().unwrap_or_default();
        if !offered.contains(&factor) {
            return Err(AuthError::InvalidSelection(factor));
        }
        store.select_factor(factor);
        tracing::debug!(%factor, "factor selected");
        Ok(())
    }

    /// Ask the provider to dispatch a one-time code for the selected factor.
    ///
    /// The provider correlates the dispatch to the pending challenge, so the
    /// challenge token travels with the request rather than a bearer token.
    pub async fn request_otp(&self) -> Result<DispatchOutcome> {
        let mut store = self.store.lock().await;
        let factor = match store.state() {
            AuthState::FactorSelected(factor) if factor.requires_dispatch() => factor,
            AuthState::FactorSelected(factor) => {
                return Err(AuthError::InvalidSelection(factor));
            }
            state => {
                return Err(AuthError::InvalidState {
                    operation: "request_otp",
                    state,
                });
            }
        };
        let Some(expired) = store.challenge().map(|c| c.is_expired()) else {
            return Err(AuthError::InvalidState {
                operation: "request_otp",
                state: store.state(),
            });
        };
        if expired {
            store.fail();
            return Err(AuthError::ChallengeExpired);
        }
        let challenge_token = store
            .challenge()
            .map(|c| c.token.clone())
            .unwrap_or_default();
        let identifier = store.identifier().unwrap_or_default().to_string();

        let path = match factor {
            FactorKind::EmailOtp => OTP_EMAIL_PATH,
            _ => OTP_SMS_PATH,
        };
        let request = ApiRequest::new(Method::Post, path)
            .with_query(CHALLENGE_TOKEN_PARAM, challenge_token)
            .with_body(json!({ "emailid": identifier }));
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                store.fail();
                return Err(error.into());
            }
        };

        if !response.is_success() {
            store.fail();
            let detail = rejection_detail(&response)
                .unwrap_or_else(|| format!("status {}", response.status));
            return Err(AuthError::DispatchFailed(detail));
        }
        let posted: PostedResponse = parse_body(&response)?;
        if !posted.is_posted {
            store.fail();
            return Err(AuthError::DispatchFailed(
                "provider did not post the code".to_string(),
            ));
        }

        let dispatched_at = Utc::now();
        store.record_dispatch(OtpDispatch {
            factor,
            dispatched_at,
        });
        tracing::debug!(%factor, "one-time code dispatched");
        Ok(DispatchOutcome {
            factor,
            dispatched_at,
        })
    }

    /// Verify a dispatched one-time code.
    ///
    /// Requires a matching dispatch record; the challenge expiry is
    /// re-checked here because codes can arrive after the challenge dies.
    /// A rejected code leaves the state untouched so the caller can retry.
    pub async fn verify_otp(&self, code: &str) -> Result<VerifyOutcome> {
        let mut store = self.store.lock().await;
        let factor = match store.state() {
            AuthState::OtpPending(factor) => factor,
            AuthState::FactorSelected(factor) if factor.requires_dispatch() => {
                return Err(AuthError::DispatchRequiredFirst(factor));
            }
            state => {
                return Err(AuthError::InvalidState {
                    operation: "verify_otp",
                    state,
                });
            }
        };
        if store.dispatch().map(|d| d.factor) != Some(factor) {
            return Err(AuthError::DispatchRequiredFirst(factor));
        }

        let identifier = store.identifier().unwrap_or_default().to_string();
        let path = match factor {
            FactorKind::EmailOtp => VERIFY_OTP_EMAIL_PATH,
            _ => VERIFY_OTP_SMS_PATH,
        };
        let body = json!({ "emailid": identifier, "Otp": code });
        self.complete_verification(&mut store, "verify_otp", path, body)
            .await
    }

    /// Verify an authenticator-app code. No dispatch step exists for this
    /// factor; valid directly after selection.
    pub async fn verify_factor_code(&self, code: &str) -> Result<VerifyOutcome> {
        let mut store = self.store.lock().await;
        match store.state() {
            AuthState::FactorSelected(FactorKind::AuthenticatorApp) => {}
            state => {
                return Err(AuthError::InvalidState {
                    operation: "verify_factor_code",
                    state,
                });
            }
        }
        let body = json!({ "GoogleAuthenticatorCode": code });
        self.complete_verification(
            &mut store,
            "verify_factor_code",
            VERIFY_AUTHENTICATOR_PATH,
            body,
        )
        .await
    }

    /// Verify security-question answers. No dispatch step exists for this
    /// factor; valid directly after selection.
    pub async fn verify_security_answers(
        &self,
        answers: &[SecurityAnswer],
    ) -> Result<VerifyOutcome> {
        let mut store = self.store.lock().await;
        match store.state() {
            AuthState::FactorSelected(FactorKind::SecurityQuestions) => {}
            state => {
                return Err(AuthError::InvalidState {
                    operation: "verify_security_answers",
                    state,
                });
            }
        }
        let mut map = serde_json::Map::new();
        for answer in answers {
            map.insert(
                answer.question_id.clone(),
                Value::String(answer.answer.clone()),
            );
        }
        let body = json!({ "securityanswer": map });
        self.complete_verification(
            &mut store,
            "verify_security_answers",
            VERIFY_SECURITY_QUESTIONS_PATH,
            body,
        )
        .await
    }

    /// Add a second factor to the authenticated account.
    ///
    /// Bearer-authenticated; rejected locally with [`AuthError::Unauthorized`]
    /// when no session is live. Failures never disturb the session state.
    pub async fn enroll_factor(&self, request: EnrollmentRequest) -> Result<EnrollOutcome> {
        let store = self.store.lock().await;
        if store.state() != AuthState::Authenticated {
            return Err(AuthError::Unauthorized);
        }
        let access_token = store.access_token().unwrap_or_default().to_string();

        let (path, body) = match &request {
            EnrollmentRequest::Sms { phone_number } => {
                (ENROLL_SMS_PATH, json!({ "phoneno2fa": phone_number }))
            }
            EnrollmentRequest::SecurityQuestions { answers } => {
                let mut map = serde_json::Map::new();
                for answer in answers {
                    map.insert(
                        answer.question_id.clone(),
                        Value::String(answer.answer.clone()),
                    );
                }
                (
                    ENROLL_SECURITY_QUESTIONS_PATH,
                    json!({ "securityquestionanswer": map }),
                )
            }
            EnrollmentRequest::AuthenticatorApp => (ENROLL_AUTHENTICATOR_PATH, json!({})),
        };

        let api_request = ApiRequest::new(Method::Put, path)
            .with_bearer(&access_token)
            .with_body(body);
        let response = self.transport.send(api_request).await?;

        if !response.is_success() {
            if matches!(response.status, 401 | 403) {
                return Err(AuthError::Unauthorized);
            }
            return Err(status_failure(response.status, &response));
        }
        let posted: PostedResponse = parse_body(&response)?;
        tracing::debug!(factor = %request.factor(), accepted = posted.is_posted, "enrollment response");
        Ok(EnrollOutcome {
            accepted: posted.is_posted,
        })
    }

    /// Clear the session, challenge and dispatch record. Idempotent and
    /// infallible, valid from any state.
    pub async fn logout(&self) {
        let mut store = self.store.lock().await;
        store.reset();
        tracing::debug!("session cleared");
    }

    /// Shared tail of the three verification operations: expiry re-check,
    /// challenge-scoped call, response interpretation.
    async fn complete_verification(
        &self,
        store: &mut SessionStore,
        operation: &'static str,
        path: &'static str,
        body: Value,
    ) -> Result<VerifyOutcome> {
        let Some(expired) = store.challenge().map(|c| c.is_expired()) else {
            return Err(AuthError::InvalidState {
                operation,
                state: store.state(),
            });
        };
        if expired {
            store.fail();
            return Err(AuthError::ChallengeExpired);
        }
        let challenge_token = store
            .challenge()
            .map(|c| c.token.clone())
            .unwrap_or_default();

        let request = ApiRequest::new(Method::Put, path)
            .with_query(CHALLENGE_TOKEN_PARAM, challenge_token)
            .with_body(body);
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                store.fail();
                return Err(error.into());
            }
        };

        if response.is_success() {
            let parsed: VerifyResponse = parse_body(&response)?;
            if let Some(access_token) = parsed.access_token.filter(|token| !token.is_empty()) {
                let session = AuthenticatedSession {
                    access_token,
                    profile: parsed.profile,
                };
                store.install_session(None, session.clone());
                tracing::debug!(operation, "verification accepted");
                return Ok(VerifyOutcome { session });
            }
            return self.reject_code(store);
        }

        match response.status {
            400 | 401 | 403 if rejection_detail(&response).is_some() => self.reject_code(store),
            status => {
                store.fail();
                Err(status_failure(status, &response))
            }
        }
    }

    fn reject_code(&self, store: &mut SessionStore) -> Result<VerifyOutcome> {
        let attempts = store.record_failed_verify();
        if let Some(limit) = self.max_verify_attempts {
            if attempts >= limit.get() {
                tracing::warn!(attempts, "verification attempt limit exhausted");
                store.fail();
                return Err(AuthError::InvalidCode);
            }
        }
        Err(AuthError::InvalidCode)
    }
}

fn parse_body<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_value(response.body.clone())
        .map_err(|error| AuthError::MalformedResponse(error.to_string()))
}

/// Extract the provider's error envelope, when the body carries one.
fn rejection_detail(response: &ApiResponse) -> Option<String> {
    let body: ProviderErrorBody = serde_json::from_value(response.body.clone()).ok()?;
    if body.error_code.is_none() && body.description.is_none() && body.message.is_none() {
        return None;
    }
    Some(body.detail())
}

fn status_failure(status: u16, response: &ApiResponse) -> AuthError {
    AuthError::Transport(TransportError::Status {
        status,
        message: rejection_detail(response).unwrap_or_default(),
    })
}
