use serde::{Deserialize, Serialize};

use crate::shared::AppError;

/// Single-use code the identity provider appends to the callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Validates the raw `code` query parameter before any network call is made.
    pub fn parse(raw: Option<String>) -> Result<Self, AppError> {
        match raw {
            Some(code) if !code.trim().is_empty() => Ok(Self(code)),
            _ => Err(AppError::InvalidRequest(
                "The \"code\" parameter is not passed to the safe page".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token introspection result. Only `active` is guaranteed by the protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Introspection {
    pub active: bool,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}
