//! Identity provider seam.
//!
//! The flow controller only talks to [`IdentityProvider`]; the production
//! implementation is [`HttpIdentityClient`], tests inject stubs.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

mod client;
mod types;

pub use client::{HttpIdentityClient, IdentityConfig};
pub use types::{AuthorizationCode, Introspection, TokenResponse};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} rejected with status {status}: {detail}")]
    Rejected {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Operations the login flow needs from the identity provider.
#[async_trait]
pub trait IdentityProvider {
    /// Exchanges an authorization code for an access token. `redirect_uri` must match
    /// the one used when the authorization was requested.
    async fn exchange_code(
        &self,
        code: &AuthorizationCode,
        redirect_uri: &Url,
    ) -> Result<TokenResponse, IdentityError>;

    async fn introspect(&self, access_token: &str) -> Result<Introspection, IdentityError>;

    /// Where the browser is sent to start the login.
    fn authorize_url(&self, redirect_uri: &Url) -> Url;
}
