use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use chrono::Utc;

use gudang_core::SessionContext;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/approve", post(approve_batch))
        .route("/reject", post(reject_batch))
}

/// Apply an approval batch. Per-id outcomes come back in input order; a
/// partial failure (insufficient stock, vanished request) never aborts the
/// remaining ids.
pub async fn approve_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::BatchRequest>,
) -> axum::response::Response {
    let ids = match common::parse_request_ids(&body.ids) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    match services.stock.approve_batch(&session, &ids, Utc::now()) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn reject_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::BatchRequest>,
) -> axum::response::Response {
    let ids = match common::parse_request_ids(&body.ids) {
        Ok(ids) => ids,
        Err(resp) => return resp,
    };

    match services.stock.reject_batch(&session, &ids, Utc::now()) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}
