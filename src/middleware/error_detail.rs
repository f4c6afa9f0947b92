use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ErrorDetail;

/// Render internal error detail for development configs only.
///
/// Error responses are built without `detail`; the full body travels as an
/// `ErrorDetail` extension, which is always stripped here.
pub async fn render_error_detail(State(config): State<Arc<AppConfig>>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorDetail(body)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !config.is_development() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(body)).into_response()
}
