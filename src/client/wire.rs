//! Response shapes of the identity provider.
//!
//! The provider mixes PascalCase envelopes with snake_case OAuth fields;
//! every rename lives here so the rest of the crate works with clean names.

use serde::Deserialize;
use serde_json::Value;

/// Response of the primary login call. Carries either a bare access token
/// (single-factor accounts) or a second-factor block, never both.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(rename = "SecondFactorAuthentication")]
    pub second_factor_authentication: Option<SecondFactorBlock>,
    #[serde(rename = "Profile")]
    pub profile: Option<Value>,
    pub access_token: Option<String>,
}

/// The second-factor block: challenge token, expiry, enrollment flags and
/// display hints.
#[derive(Debug, Deserialize)]
pub(crate) struct SecondFactorBlock {
    #[serde(rename = "SecondFactorAuthenticationToken")]
    pub token: String,
    #[serde(rename = "ExpireIn")]
    pub expire_in: String,
    #[serde(rename = "QRCode")]
    pub qr_code: Option<String>,
    #[serde(rename = "ManualEntryCode")]
    pub manual_entry_code: Option<String>,
    #[serde(rename = "IsGoogleAuthenticatorVerified", default)]
    pub google_authenticator_verified: bool,
    #[serde(rename = "IsAuthenticatorVerified", default)]
    pub authenticator_verified: bool,
    #[serde(rename = "IsEmailOtpAuthenticatorVerified", default)]
    pub email_otp_verified: bool,
    #[serde(rename = "IsOTPAuthenticatorVerified", default)]
    pub sms_otp_verified: bool,
    #[serde(rename = "OTPPhoneNo")]
    pub otp_phone_no: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Vec<String>,
    #[serde(rename = "EmailOTPStatus")]
    pub email_otp_status: Option<EmailOtpStatus>,
    #[serde(rename = "IsSecurityQuestionAuthenticatorVerified", default)]
    pub security_questions_set: bool,
    #[serde(rename = "SecurityQuestions", default)]
    pub security_questions: Vec<SecurityQuestionEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailOtpStatus {
    #[serde(rename = "Email")]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecurityQuestionEntry {
    #[serde(rename = "QuestionId")]
    pub question_id: String,
    #[serde(rename = "Question")]
    pub question: String,
}

/// Acknowledgement for OTP dispatch and enrollment calls.
#[derive(Debug, Deserialize)]
pub(crate) struct PostedResponse {
    #[serde(rename = "IsPosted", default)]
    pub is_posted: bool,
}

/// Response of any verification call. A present, non-empty `access_token`
/// means the factor was accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct VerifyResponse {
    pub access_token: Option<String>,
    #[serde(rename = "Profile")]
    pub profile: Option<Value>,
}

/// Error envelope the provider attaches to 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderErrorBody {
    #[serde(rename = "ErrorCode")]
    pub error_code: Option<i64>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

impl ProviderErrorBody {
    pub fn detail(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| format!("provider error code {:?}", self.error_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_response_parses_second_factor_block() {
        let payload = json!({
            "SecondFactorAuthentication": {
                "SecondFactorAuthenticationToken": "C1",
                "ExpireIn": "600",
                "QRCode": null,
                "ManualEntryCode": "ABCD-EFGH",
                "IsGoogleAuthenticatorVerified": false,
                "IsAuthenticatorVerified": true,
                "IsEmailOtpAuthenticatorVerified": true,
                "IsOTPAuthenticatorVerified": false,
                "OTPPhoneNo": "+1555***0100",
                "OTPStatus": null,
                "Email": ["a@b.com"],
                "EmailOTPStatus": { "Email": "a@b.com" },
                "IsSecurityQuestionAuthenticatorVerified": false,
                "SecurityQuestions": [
                    { "QuestionId": "q1", "Question": "First pet?" }
                ]
            },
            "Profile": null,
            "access_token": null
        });

        let parsed: LoginResponse = serde_json::from_value(payload).expect("parse login");
        let block = parsed.second_factor_authentication.expect("block");
        assert_eq!(block.token, "C1");
        assert_eq!(block.expire_in, "600");
        assert_eq!(block.manual_entry_code.as_deref(), Some("ABCD-EFGH"));
        assert!(block.authenticator_verified);
        assert_eq!(block.security_questions.len(), 1);
        assert_eq!(block.email_otp_status.expect("status").email, "a@b.com");
    }

    #[test]
    fn login_response_tolerates_missing_flags() {
        let payload = json!({
            "SecondFactorAuthentication": {
                "SecondFactorAuthenticationToken": "C1",
                "ExpireIn": "2030-01-01T00:00:00Z"
            }
        });
        let parsed: LoginResponse = serde_json::from_value(payload).expect("parse sparse login");
        let block = parsed.second_factor_authentication.expect("block");
        assert!(!block.email_otp_verified);
        assert!(block.email.is_empty());
        assert!(block.security_questions.is_empty());
    }

    #[test]
    fn verify_response_parses_token_and_profile() {
        let parsed: VerifyResponse =
            serde_json::from_value(json!({ "access_token": "T1", "Profile": {"Uid": "u"} }))
                .expect("parse verify");
        assert_eq!(parsed.access_token.as_deref(), Some("T1"));
        assert!(parsed.profile.is_some());
    }

    #[test]
    fn error_body_prefers_description() {
        let body: ProviderErrorBody = serde_json::from_value(json!({
            "ErrorCode": 1067,
            "Description": "Invalid OTP",
            "Message": "OTP is invalid"
        }))
        .expect("parse error body");
        assert_eq!(body.detail(), "Invalid OTP");
    }
}
