use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use super::{AuthorizationCode, IdentityError, IdentityProvider, Introspection, TokenResponse};
use crate::config::{AppConfig, SecretString};

/// OAuth2 client registration and provider endpoints.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    client_id: String,
    client_secret: SecretString,
    authorize_url: Url,
    token_url: Url,
    introspect_url: Url,
    scopes: Vec<String>,
}

impl IdentityConfig {
    /// Derives the provider endpoints from its base URL.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        base_url: &Url,
    ) -> Result<Self, IdentityError> {
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client_id: client_id.into(),
            client_secret,
            authorize_url: base.join("oauth/authorize")?,
            token_url: base.join("oauth/token")?,
            introspect_url: base.join("oauth/introspect")?,
            scopes: vec!["openid".to_string()],
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, IdentityError> {
        Self::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            &config.identity_base_url,
        )
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    pub fn introspect_url(&self) -> &Url {
        &self.introspect_url
    }
}

/// reqwest-backed identity provider client.
pub struct HttpIdentityClient {
    config: IdentityConfig,
    http: reqwest::Client,
}

impl HttpIdentityClient {
    /// Every outbound call is bounded by `timeout`.
    pub fn new(config: IdentityConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { config, http })
    }

    /// Returns the response on 2xx, otherwise an error carrying the provider's body.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, IdentityError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(IdentityError::Rejected {
            operation,
            status,
            detail,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityClient {
    #[instrument(skip(self, code))]
    async fn exchange_code(
        &self,
        code: &AuthorizationCode,
        redirect_uri: &Url,
    ) -> Result<TokenResponse, IdentityError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
        ];

        debug!(token_url = %self.config.token_url, "Exchanging authorization code");

        let response = self
            .http
            .post(self.config.token_url.clone())
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose()),
            )
            .form(&params)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token exchange").await?;
        response.json::<TokenResponse>().await.map_err(Into::into)
    }

    #[instrument(skip(self, access_token))]
    async fn introspect(&self, access_token: &str) -> Result<Introspection, IdentityError> {
        let response = self
            .http
            .post(self.config.introspect_url.clone())
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose()),
            )
            .form(&[("token", access_token)])
            .send()
            .await?;

        let response = Self::ensure_success(response, "token introspection").await?;
        response.json::<Introspection>().await.map_err(Into::into)
    }

    fn authorize_url(&self, redirect_uri: &Url) -> Url {
        let mut url = self.config.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn redirect_uri() -> Url {
        "http://localhost:3000/safepage".parse().unwrap()
    }

    fn client_for(base: &str) -> HttpIdentityClient {
        let config = IdentityConfig::new(
            "test-client",
            SecretString::new("test-secret"),
            &base.parse().unwrap(),
        )
        .unwrap();
        HttpIdentityClient::new(config, Duration::from_secs(5)).unwrap()
    }

    fn code(value: &str) -> AuthorizationCode {
        AuthorizationCode::parse(Some(value.to_string())).unwrap()
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let config = IdentityConfig::new(
            "id",
            SecretString::new("secret"),
            &"https://identity.example.com/api".parse().unwrap(),
        )
        .unwrap();

        assert_eq!(
            config.token_url().as_str(),
            "https://identity.example.com/api/oauth/token"
        );
        assert_eq!(
            config.introspect_url().as_str(),
            "https://identity.example.com/api/oauth/introspect"
        );
    }

    #[test]
    fn test_authorize_url_carries_redirect_uri() {
        let client = client_for("https://identity.example.com");
        let url = client.authorize_url(&redirect_uri());

        assert_eq!(url.path(), "/oauth/authorize");
        let query = url.query().unwrap();
        assert!(query.contains("client_id=test-client"));
        assert!(query.contains("response_type=code"));
        assert!(query.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fsafepage"));
        assert!(query.contains("scope=openid"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains(
                "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fsafepage",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-123",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let token = client
            .exchange_code(&code("the-code"), &redirect_uri())
            .await
            .unwrap();

        assert_eq!(token.access_token, "access-123");
        assert_eq!(token.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .exchange_code(&code("expired"), &redirect_uri())
            .await
            .unwrap_err();

        match err {
            IdentityError::Rejected {
                operation,
                status,
                detail,
            } => {
                assert_eq!(operation, "token exchange");
                assert_eq!(status, 400);
                assert_eq!(detail, "invalid_grant");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_network_failure() {
        // Nothing listens on the discard port.
        let client = client_for("http://127.0.0.1:9");
        let err = client
            .exchange_code(&code("any"), &redirect_uri())
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::Http(_)));
    }

    #[tokio::test]
    async fn test_introspect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/introspect"))
            .and(body_string_contains("token=access-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": true,
                "sub": "user-1",
                "client_id": "test-client"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result = client.introspect("access-123").await.unwrap();

        assert!(result.active);
        assert_eq!(result.sub.as_deref(), Some("user-1"));
    }
}
