use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::types::{CallbackParams, IndexView, SafePageView, TokenPageView};
use crate::identity::{AuthorizationCode, IdentityProvider};
use crate::session::Session;
use crate::shared::{AppError, AppState};
use crate::views::View;

/// GET /
/// Landing page showing whether this browser is logged in
#[instrument(name = "home", skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let login_url = state.identity.authorize_url(&state.site.callback_uri);
    let view = IndexView::new(&state.site, session.is_authenticated(), login_url.into());

    state.views.render(View::Index, &view)
}

/// GET /safepage?code=<authorization code>
/// Callback from the identity provider: exchanges the code and stores the access token
#[instrument(name = "authorization_callback", skip_all)]
pub async fn authorization_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>, AppError> {
    let code = AuthorizationCode::parse(params.code)?;

    info!(session_id = %session.id(), "Exchanging authorization code");

    let token = state
        .identity
        .exchange_code(&code, &state.site.callback_uri)
        .await
        .map_err(|e| {
            error!(error = %e, "Token exchange failed");
            AppError::from(e)
        })?;

    log_introspection(Arc::clone(&state.identity), token.access_token.clone());

    info!(
        session_id = %session.id(),
        token_length = token.access_token.len(),
        "Login completed, storing access token in session"
    );
    session.set_token(token.access_token);

    state.views.render(View::SafePage, &SafePageView::default())
}

/// GET /tokenpage
/// Diagnostic page showing the token held by this session
#[instrument(name = "token_page", skip_all)]
pub async fn token_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    state
        .views
        .render(View::TokenPage, &TokenPageView::new(session.token()))
}

/// DELETE /session
/// Logs the browser out. The session layer deletes the record and clears the cookie.
#[instrument(name = "logout", skip_all)]
pub async fn logout(session: Session) -> StatusCode {
    info!(session_id = %session.id(), authenticated = session.is_authenticated(), "Logging out");
    session.destroy();
    StatusCode::NO_CONTENT
}

// Introspection is informational only; the login does not wait for or depend on it.
fn log_introspection(identity: Arc<dyn IdentityProvider + Send + Sync>, access_token: String) {
    tokio::spawn(async move {
        match identity.introspect(&access_token).await {
            Ok(result) => info!(
                active = result.active,
                sub = ?result.sub,
                scope = ?result.scope,
                exp = ?result.exp,
                "Token introspection"
            ),
            Err(e) => warn!(error = %e, "Token introspection failed"),
        }
    });
}
