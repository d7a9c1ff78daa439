pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Build the full HTTP application for the given state
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected (token auth)
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/token", post(auth::token_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, entries};

    Router::new()
        .route("/auth/whoami", get(auth::whoami_get))
        // Collection
        .route("/entries", get(entries::entries_get).post(entries::entries_post))
        // Day query
        .route("/entries/day", get(entries::entries_day_get))
        .route("/entries/get_day_entries", get(entries::entries_day_get))
        // Single entry
        .route(
            "/entries/:id",
            get(entries::entry_get)
                .put(entries::entry_put)
                .patch(entries::entry_patch)
                .delete(entries::entry_delete),
        )
        .route_layer(from_fn_with_state(state, middleware::token_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "BuJo API",
        "version": version,
        "description": "Bullet journal backend: token auth and per-user journal entries",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "public_auth": "/auth/register, /auth/token (public - token acquisition)",
            "auth": "/auth/whoami (protected)",
            "entries": "/entries[/:id] (protected)",
            "day": "/entries/day?day=YYYY-MM-DD (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
