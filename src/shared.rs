use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::Key;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};
use url::Url;

use crate::config::{AppConfig, ConfigError, Environment};
use crate::error_page::ErrorDetail;
use crate::identity::{IdentityError, IdentityProvider};
use crate::session::{self, repository::SessionRepository, SessionService, SessionSettings};
use crate::views::Views;

/// Static application metadata shown on the landing page
#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

impl AppInfo {
    pub fn from_package() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
        }
    }
}

/// Site-wide settings the handlers read
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub app: AppInfo,
    pub environment: Environment,
    /// Redirect URI registered with the identity provider
    pub callback_uri: Url,
    pub public_dir: PathBuf,
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub identity: Arc<dyn IdentityProvider + Send + Sync>,
    pub views: Arc<Views>,
    pub site: Arc<SiteSettings>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
    ) -> Result<Self, StartupError> {
        let app = AppInfo::from_package();

        let session_service = SessionService::new(
            session_repository,
            SessionSettings {
                cookie_name: session::cookie_name(app.name),
                ttl: config.session_ttl,
                secure_cookies: config.secure_cookies(),
            },
        );

        let site = SiteSettings {
            app,
            environment: config.environment,
            callback_uri: config.callback_uri()?,
            public_dir: config.public_dir.clone(),
        };

        Ok(Self {
            session_service: Arc::new(session_service),
            identity,
            views: Arc::new(Views::new()?),
            site: Arc::new(site),
            cookie_key: session::signing_key(&config.session_secret),
        })
    }
}

// SignedCookieJar pulls its key from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token exchange failed: {0}")]
    UpstreamExchange(String),

    #[error("Invalid route: {0}")]
    NotFound(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Unhandled error: {0}")]
    Unhandled(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamExchange(_)
            | AppError::Session(_)
            | AppError::SessionNotFound(_)
            | AppError::Template(_)
            | AppError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        AppError::UpstreamExchange(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %error_message, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %error_message, "Request rejected");
        }

        let body = Json(json!({
            "error": error_message
        }));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(ErrorDetail {
            status,
            message: error_message,
        });
        response
    }
}

/// Failures that stop the server from starting
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Identity client error: {0}")]
    Identity(#[from] IdentityError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
