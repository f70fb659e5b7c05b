use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use estimo_catalog::OptionSets;
use estimo_core::ProductVariant;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/options", get(list_options))
        .route("/v1/options/{variant}", get(variant_options))
}

/// GET /v1/options
/// Option sets for every product variant
pub async fn list_options(State(state): State<AppState>) -> Json<Vec<OptionSets>> {
    Json(state.catalog.all_option_sets())
}

/// GET /v1/options/{variant}
pub async fn variant_options(
    State(state): State<AppState>,
    Path(variant): Path<String>,
) -> Result<Json<OptionSets>, AppError> {
    let variant: ProductVariant = variant.parse().map_err(AppError::NotFoundError)?;
    Ok(Json(state.catalog.option_sets(variant)))
}
