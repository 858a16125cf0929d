use serde::{Deserialize, Serialize};

use crate::shared::{AppInfo, SiteSettings};

/// How long the confirmation window stays open before closing itself
pub const CLOSE_TIMEOUT_MS: u64 = 2000;

/// Query parameters the identity provider appends to the callback URL
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// View model for the landing page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexView {
    pub app: AppInfo,
    pub environment: &'static str,
    pub logged_in: bool,
    pub login_url: String,
}

impl IndexView {
    pub fn new(site: &SiteSettings, logged_in: bool, login_url: String) -> Self {
        Self {
            app: site.app.clone(),
            environment: site.environment.as_str(),
            logged_in,
            login_url,
        }
    }
}

/// View model for the post-login confirmation page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafePageView {
    pub close_timeout: u64,
}

impl Default for SafePageView {
    fn default() -> Self {
        Self {
            close_timeout: CLOSE_TIMEOUT_MS,
        }
    }
}

/// View model for the token inspection page. Holds only what the page displays.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPageView {
    pub logged_in: bool,
    pub token: Option<String>,
}

impl TokenPageView {
    pub fn new(token: Option<String>) -> Self {
        Self {
            logged_in: token.is_some(),
            token,
        }
    }
}
