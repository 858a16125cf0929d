//! Login session flow: the routes a browser walks through to log in and out.

use axum::{
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue},
    middleware,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::CALLBACK_PATH;
use crate::error_page::{not_found, panic_response, render_error_pages};
use crate::session::session_layer;
use crate::shared::AppState;

mod handlers;
pub mod types;

pub use handlers::{authorization_callback, home, logout, token_page};

/// Builds the application router with its full middleware stack.
///
/// Layer order, outermost first: tracing, security headers, error pages, sessions,
/// panic catching. Error pages therefore see session cookies set by the session
/// layer, and panics become ordinary error responses.
pub fn routes(state: AppState) -> Router {
    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    // Missing assets and wrong methods on known paths are unknown routes too
    let assets =
        ServeDir::new(&state.site.public_dir).not_found_service(not_found.into_service());

    Router::new()
        .route("/", get(home).fallback(not_found))
        .route(
            CALLBACK_PATH,
            get(authorization_callback).fallback(not_found),
        )
        .route("/tokenpage", get(token_page).fallback(not_found))
        .route("/session", delete(logout).fallback(not_found))
        .nest_service("/public", assets)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            render_error_pages,
        ))
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
