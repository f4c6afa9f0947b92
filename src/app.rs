use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put, MethodRouter},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::ai::{CompletionClient, OpenAiClient};
use crate::config::AppConfig;
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{
    jwt_auth_middleware, rate_limit_middleware, render_error_detail, with_security_headers, RateLimiter,
};

/// Process-scoped state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub assistant: Arc<dyn CompletionClient>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let assistant = Arc::new(OpenAiClient::new(config.ai.clone()));
        Self::with_assistant(config, store, assistant)
    }

    /// State with a caller-supplied completion client.
    pub fn with_assistant(config: AppConfig, store: Arc<dyn Store>, assistant: Arc<dyn CompletionClient>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.api.rate_limit_requests,
            Duration::from_secs(config.api.rate_limit_window_secs),
        ));
        Self {
            config: Arc::new(config),
            store,
            assistant,
            rate_limiter,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", routes(get(public::root)))
        .route("/health", routes(get(public::health)))
        .merge(categories_routes())
        .merge(ai_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .fallback(public::route_not_found)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(cors_layer(&state.config));

    // Global middleware
    harden(router, state.config.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Panic catcher, error detail rendering and security headers, in that
/// order from the inside out.
fn harden<S>(router: Router<S>, config: Arc<AppConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    with_security_headers(
        router
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn_with_state(config, render_error_detail)),
    )
}

/// A known path with an unsupported method answers like an unknown path.
fn routes(methods: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods.fallback(public::route_not_found)
}

fn categories_routes() -> Router<AppState> {
    Router::new().route("/api/categories", routes(get(public::categories_list)))
}

fn ai_routes() -> Router<AppState> {
    Router::new().route("/api/ai/ask", routes(post(public::ai_ask)))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(users_routes())
        .merge(expenses_routes())
        .merge(savings_routes())
        .merge(goals_routes())
        .merge(tasks_routes())
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn users_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", routes(get(users::users_list)))
        .route("/api/users/:id", routes(get(users::user_get).put(users::user_update)))
}

fn expenses_routes() -> Router<AppState> {
    use protected::expenses;

    Router::new()
        .route("/api/expenses", routes(get(expenses::expenses_list).post(expenses::expense_create)))
        .route(
            "/api/expenses/:id",
            routes(put(expenses::expense_update).delete(expenses::expense_delete)),
        )
}

fn savings_routes() -> Router<AppState> {
    use protected::savings;

    Router::new()
        .route("/api/savings", routes(get(savings::savings_list).post(savings::savings_create)))
        .route(
            "/api/savings/:id",
            routes(put(savings::savings_update).delete(savings::savings_delete)),
        )
}

fn goals_routes() -> Router<AppState> {
    use protected::goals;

    Router::new()
        .route("/api/goals", routes(get(goals::goals_list).post(goals::goal_create)))
        .route(
            "/api/goals/:id",
            routes(put(goals::goal_update).delete(goals::goal_delete)),
        )
}

fn tasks_routes() -> Router<AppState> {
    use protected::tasks;

    Router::new()
        .route("/api/tasks", routes(get(tasks::tasks_list).post(tasks::task_create)))
        .route(
            "/api/tasks/:id",
            routes(put(tasks::task_update).delete(tasks::task_delete)),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    // Origins are checked in AppConfig::validate; anything unparseable is skipped here
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    ApiError::internal_with_detail("Internal server error", detail).into_response()
}
