use axum::{
    extract::State,
    http::HeaderName,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use estimo_core::{NameplateOrder, Order, PriceEstimate, Priceable, PrintJob};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Tells the caller whether the model or the rule tables produced the estimate
pub const ESTIMATE_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-estimate-source");

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/estimates", post(create_estimate))
        .route("/v1/estimates/print", post(estimate_print))
        .route("/v1/estimates/nameplate", post(estimate_nameplate))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/estimates
/// Estimate any order, tagged by `variant`
pub async fn create_estimate(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<impl IntoResponse, AppError> {
    run_estimate(&state, order).await
}

/// POST /v1/estimates/print
pub async fn estimate_print(
    State(state): State<AppState>,
    Json(job): Json<PrintJob>,
) -> Result<impl IntoResponse, AppError> {
    run_estimate(&state, Order::Print(job)).await
}

/// POST /v1/estimates/nameplate
pub async fn estimate_nameplate(
    State(state): State<AppState>,
    Json(order): Json<NameplateOrder>,
) -> Result<impl IntoResponse, AppError> {
    run_estimate(&state, Order::Nameplate(order)).await
}

async fn run_estimate(
    state: &AppState,
    order: Order,
) -> Result<([(HeaderName, &'static str); 1], Json<PriceEstimate>), AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("estimate", %request_id, variant = %order.variant());

    let (estimate, source) = state
        .estimator
        .estimate_with_source(&order)
        .instrument(span)
        .await?;

    tracing::info!(
        %request_id,
        source = source.as_str(),
        total = estimate.total_price,
        "Estimate ready"
    );

    Ok(([(ESTIMATE_SOURCE_HEADER, source.as_str())], Json(estimate)))
}
