use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use authcode_site::{routes, AppConfig, AppState, InMemorySessionRepository};

use super::mocks::StubIdentityProvider;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub identity: Arc<StubIdentityProvider>,
    pub repository: Arc<InMemorySessionRepository>,
}

/// What a test needs from a response, with the body already collected
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `name=value` pair of the Set-Cookie header, ready to send back as a Cookie header
    pub fn cookie(&self) -> Option<String> {
        self.set_cookie
            .as_deref()
            .and_then(|c| c.split(';').next())
            .map(|pair| pair.trim().to_string())
    }
}

pub struct TestAppBuilder {
    environment: &'static str,
    identity: StubIdentityProvider,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            environment: "test",
            identity: StubIdentityProvider::issuing("access-token-1"),
        }
    }

    pub fn issuing_token(mut self, token: &str) -> Self {
        self.identity = StubIdentityProvider::issuing(token);
        self
    }

    pub fn rejecting_exchanges(mut self) -> Self {
        self.identity = StubIdentityProvider::rejecting();
        self
    }

    pub fn failing_introspection(mut self) -> Self {
        self.identity = self.identity.with_failing_introspection();
        self
    }

    pub fn in_environment(mut self, environment: &'static str) -> Self {
        self.environment = environment;
        self
    }

    pub fn build(self) -> TestApp {
        let environment = self.environment;
        let config = AppConfig::from_lookup(|name| {
            let value = match name {
                "APP_ENV" => Some(environment),
                "APP_PORT" => Some("3000"),
                "OAUTH_CLIENT_ID" => Some("test-client"),
                "OAUTH_CLIENT_SECRET" => Some("test-secret"),
                "IDENTITY_BASE_URL" => Some("https://identity.test"),
                "SESSION_SECRET" => Some("integration-test-session-secret"),
                _ => None,
            };
            value.map(str::to_string)
        })
        .unwrap();

        let identity = Arc::new(self.identity);
        let repository = Arc::new(InMemorySessionRepository::new());
        let state = AppState::new(&config, repository.clone(), identity.clone()).unwrap();

        TestApp {
            router: routes(state),
            identity,
            repository,
        }
    }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            set_cookie,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, cookie).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, cookie).await
    }

    /// Runs a successful callback and returns the session cookie it issued
    pub async fn login(&self) -> String {
        let response = self.get("/safepage?code=valid-code", None).await;
        assert_eq!(response.status, StatusCode::OK);
        response.cookie().expect("login should issue a session cookie")
    }

    /// Tokens currently held by stored sessions
    pub async fn stored_tokens(&self) -> Vec<Option<String>> {
        self.repository
            .all_sessions()
            .await
            .into_iter()
            .map(|s| s.token)
            .collect()
    }
}
