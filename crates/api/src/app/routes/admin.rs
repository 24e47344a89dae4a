use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};

use gudang_core::SessionContext;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/reset", post(reset_movements))
}

/// Clear pending requests and history. Master items and users survive.
pub async fn reset_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    match services.stock.reset_movements(&session) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "reset": true })),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}
