use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

use authcode_site::identity::{
    AuthorizationCode, IdentityError, IdentityProvider, Introspection, TokenResponse,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Identity provider stand-in: issues a fixed token or rejects every exchange.
pub struct StubIdentityProvider {
    token: Option<String>,
    introspection_fails: bool,
    exchanged_codes: Mutex<Vec<String>>,
    redirect_uris: Mutex<Vec<String>>,
    introspected: Mutex<Vec<String>>,
}

impl StubIdentityProvider {
    pub fn issuing(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            introspection_fails: false,
            exchanged_codes: Mutex::new(Vec::new()),
            redirect_uris: Mutex::new(Vec::new()),
            introspected: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            token: None,
            introspection_fails: false,
            exchanged_codes: Mutex::new(Vec::new()),
            redirect_uris: Mutex::new(Vec::new()),
            introspected: Mutex::new(Vec::new()),
        }
    }

    /// Makes every introspection call fail with a provider error.
    pub fn with_failing_introspection(mut self) -> Self {
        self.introspection_fails = true;
        self
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().unwrap().clone()
    }

    pub fn redirect_uris(&self) -> Vec<String> {
        self.redirect_uris.lock().unwrap().clone()
    }

    pub fn introspected_tokens(&self) -> Vec<String> {
        self.introspected.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn exchange_code(
        &self,
        code: &AuthorizationCode,
        redirect_uri: &Url,
    ) -> Result<TokenResponse, IdentityError> {
        self.exchanged_codes
            .lock()
            .unwrap()
            .push(code.as_str().to_string());
        self.redirect_uris
            .lock()
            .unwrap()
            .push(redirect_uri.to_string());

        match &self.token {
            Some(token) => Ok(TokenResponse {
                access_token: token.clone(),
                token_type: Some("Bearer".to_string()),
                expires_in: Some(3600),
                refresh_token: None,
                scope: Some("openid".to_string()),
            }),
            None => Err(IdentityError::Rejected {
                operation: "token exchange",
                status: 400,
                detail: "invalid_grant".to_string(),
            }),
        }
    }

    async fn introspect(&self, access_token: &str) -> Result<Introspection, IdentityError> {
        self.introspected
            .lock()
            .unwrap()
            .push(access_token.to_string());

        if self.introspection_fails {
            return Err(IdentityError::Rejected {
                operation: "token introspection",
                status: 503,
                detail: "introspection unavailable".to_string(),
            });
        }

        Ok(Introspection {
            active: self.token.is_some(),
            scope: None,
            client_id: None,
            sub: None,
            exp: None,
        })
    }

    fn authorize_url(&self, redirect_uri: &Url) -> Url {
        let mut url = Url::parse("https://identity.test/oauth/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri.as_str());
        url
    }
}
