//! HTTP transport gateway for the identity provider.
//!
//! The orchestrator talks to the provider exclusively through the
//! [`Transport`] trait: a request description in, a status/body pair out.
//! Non-2xx statuses are returned as responses, not errors — interpreting
//! them is the orchestrator's job. [`TransportError`] is reserved for the
//! network layer itself.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Transport-level failures (the provider was never meaningfully reached).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// HTTP method subset used by the provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request to the identity provider.
///
/// Challenge-scoped calls attach the challenge token as a query parameter;
/// account-scoped calls attach a bearer header. Both placements are
/// supported because different endpoints in the same provider family use
/// different conventions.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A structured provider response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Gateway to the identity provider.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Reqwest-backed transport.
///
/// Appends the provider API key as the `apikey` query parameter on every
/// call, which is how this provider family authenticates the application
/// itself (user credentials travel in the body or challenge token).
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        builder = builder.query(&[("apikey", self.api_key.as_str())]);
        for (key, value) in &request.query {
            builder = builder.query(&[(key.as_str(), value.as_str())]);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| {
                tracing::warn!(status, "provider returned a non-JSON body");
                Value::Null
            })
        };
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builder_accumulates_query_and_headers() {
        let request = ApiRequest::new(Method::Post, "/identity/v2/auth/login/2fa")
            .with_query("secondfactorauthenticationtoken", "C1")
            .with_bearer("T1")
            .with_body(json!({"email": "a@b.com"}));

        assert_eq!(request.path, "/identity/v2/auth/login/2fa");
        assert_eq!(
            request.query,
            vec![(
                "secondfactorauthenticationtoken".to_string(),
                "C1".to_string()
            )]
        );
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Bearer T1".to_string())]
        );
        assert!(request.body.is_some());
    }

    #[test]
    fn success_statuses_are_2xx_only() {
        let ok = ApiResponse {
            status: 200,
            body: Value::Null,
        };
        let forbidden = ApiResponse {
            status: 403,
            body: Value::Null,
        };
        assert!(ok.is_success());
        assert!(!forbidden.is_success());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let transport = HttpTransport::new(
            "https://api.example.com/",
            "key",
            Duration::from_secs(30),
        )
        .expect("build transport");
        assert_eq!(transport.base_url, "https://api.example.com");
    }
}
