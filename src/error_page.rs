//! Generic error renderer.
//!
//! Every [`AppError`] response carries an [`ErrorDetail`] extension. The
//! [`render_error_pages`] middleware swaps such responses' bodies for the `error`
//! view, so handlers, the route fallback and caught panics all end up on the same page.

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::any::Any;
use tracing::{error, instrument};

use crate::shared::{AppError, AppState};
use crate::views::View;

/// Attached to error responses for the page renderer.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub status: u16,
    pub message: String,
}

impl ErrorView {
    /// Server error messages are replaced with the generic reason phrase when
    /// `expose_detail` is false.
    pub fn new(detail: &ErrorDetail, expose_detail: bool) -> Self {
        let message = if detail.status.is_server_error() && !expose_detail {
            detail
                .status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            detail.message.clone()
        };

        Self {
            status: detail.status.as_u16(),
            message,
        }
    }
}

#[instrument(skip_all)]
pub async fn render_error_pages(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let view = ErrorView::new(&detail, !state.site.environment.is_production());
    match state.views.render(View::Error, &view) {
        Ok(html) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            Response::from_parts(parts, Body::from(html.0))
        }
        Err(e) => {
            // Keep the JSON body rather than failing twice.
            error!(error = %e, "Could not render error page");
            response
        }
    }
}

/// Route fallback: every unknown path is a `NotFound`.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    AppError::NotFound(path)
}

/// Converts a caught handler panic into an `Unhandled` error response.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Unhandled(detail).into_response()
}
