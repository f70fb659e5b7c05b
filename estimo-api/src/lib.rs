use axum::{
    extract::State,
    http::{header, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod app_config;
pub mod error;
pub mod estimates;
pub mod options;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // The browser form is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::USER_AGENT])
        .expose_headers([estimates::ESTIMATE_SOURCE_HEADER]);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(estimates::routes())
        .merge(options::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "Estimo Price Estimator API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "ai_enabled": state.estimator.ai_enabled(),
    }))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
