use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;
use tracing::instrument;

use crate::shared::{AppError, AppState};

/// Session middleware - resolves the browser's session from its signed cookie and
/// makes it available to handlers as a [`Session`](super::Session) extension.
/// Once the handler returns, changes are saved and the cookie is set or cleared.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::session_layer))
#[instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn session_layer(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let service = &state.session_service;

    let session = service.load(&jar).await?;
    req.extensions_mut().insert(session.clone());

    let response = next.run(req).await;

    let jar = service.commit(&session, jar).await?;
    Ok((jar, response).into_response())
}
