use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use estimo_core::CoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFoundError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Anyhow(err) => match err.downcast_ref::<CoreError>() {
                Some(CoreError::InvalidQuantity(_)) => (StatusCode::BAD_REQUEST, err.to_string()),
                _ => {
                    tracing::error!("Price computation failed: {}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Error calculating price".to_string())
                }
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
