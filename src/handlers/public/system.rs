use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - service name, version and endpoint listing
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Family Finance API",
            "version": version,
            "description": "Household expenses, savings, goals and shared tasks",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "categories": "/api/categories (public)",
                "ai": "/api/ai/ask (public)",
                "users": "/api/users[/:id] (protected)",
                "expenses": "/api/expenses[/:id] (protected)",
                "savings": "/api/savings[/:id] (protected)",
                "goals": "/api/goals[/:id] (protected)",
                "tasks": "/api/tasks[/:id] (protected)",
            }
        }
    }))
}

/// GET /health - liveness probe; 503 when the store does not answer
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.store.backend();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "message": "Family Finance API is running",
                "timestamp": now,
                "store": store
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "message": "Document store unavailable",
                    "timestamp": now,
                    "store": store
                })),
            )
        }
    }
}

/// Fallback for unmatched routes
pub async fn route_not_found(uri: Uri) -> ApiError {
    tracing::debug!("No route for {}", uri.path());
    ApiError::not_found("Route not found")
}
