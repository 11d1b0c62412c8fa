#![allow(dead_code)]

use std::num::NonZeroU32;

use serde_json::{json, Value};
use twofold::client::AuthClient;
use twofold::config::AuthConfig;
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";

pub fn client_for(server: &MockServer) -> AuthClient {
    AuthClient::new(&AuthConfig::new(server.uri(), API_KEY)).expect("build client")
}

pub fn client_with_attempt_limit(server: &MockServer, limit: u32) -> AuthClient {
    let config = AuthConfig::new(server.uri(), API_KEY)
        .with_max_verify_attempts(NonZeroU32::new(limit).expect("nonzero limit"));
    AuthClient::new(&config).expect("build client")
}

/// Login response for a single-factor account.
pub fn signed_in_body(access_token: &str) -> Value {
    json!({
        "Profile": { "Uid": "user-1" },
        "access_token": access_token,
        "expires_in": "3600"
    })
}

/// A second-factor block with nothing enrolled; tests flip on what they need.
pub fn challenge_block(challenge_token: &str, expire_in: &str) -> Value {
    json!({
        "SecondFactorAuthenticationToken": challenge_token,
        "ExpireIn": expire_in,
        "QRCode": null,
        "ManualEntryCode": null,
        "IsGoogleAuthenticatorVerified": false,
        "IsAuthenticatorVerified": false,
        "IsEmailOtpAuthenticatorVerified": false,
        "IsOTPAuthenticatorVerified": false,
        "OTPPhoneNo": null,
        "OTPStatus": null,
        "Email": [],
        "EmailOTPStatus": null,
        "IsSecurityQuestionAuthenticatorVerified": false,
        "SecurityQuestions": []
    })
}

pub fn with_field(mut block: Value, key: &str, value: Value) -> Value {
    block[key] = value;
    block
}

/// Wrap a second-factor block into a full login response.
pub fn challenge_login_body(block: Value) -> Value {
    json!({
        "SecondFactorAuthentication": block,
        "Profile": null,
        "access_token": null
    })
}

/// Verification response carrying the final access token.
pub fn verified_body(access_token: &str) -> Value {
    json!({ "access_token": access_token, "Profile": { "Uid": "user-1" } })
}

pub fn posted_body(is_posted: bool) -> Value {
    json!({ "IsPosted": is_posted })
}

/// Provider error envelope, as attached to 4xx responses.
pub fn provider_error(error_code: i64, description: &str) -> Value {
    json!({
        "ErrorCode": error_code,
        "Description": description,
        "Message": description
    })
}
