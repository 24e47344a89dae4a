use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use gudang_core::SessionContext;
use gudang_infra::export;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/export", get(export_items))
        .route("/template", get(upload_template))
        .route("/import", post(import_items))
        .route("/:code", get(get_item))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    match services
        .stock
        .list_items(query.category.as_deref(), query.q.as_deref())
    {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match common::parse_item_code(&code) {
        Ok(code) => code,
        Err(resp) => return resp,
    };

    match services.stock.item(&code) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    match services.stock.add_item(
        &session,
        &body.code,
        &body.name,
        &body.unit,
        &body.category,
        body.initial_qty,
        Utc::now(),
    ) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

/// Bulk upload: CSV body in the template format, validated row-by-row.
pub async fn import_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Bytes,
) -> axum::response::Response {
    let import = match export::parse_catalog_csv(&body) {
        Ok(import) => import,
        Err(e) => return errors::stock_error_to_response(e),
    };

    let mut report = match services.stock.bulk_add_items(&session, import.rows, Utc::now()) {
        Ok(report) => report,
        Err(e) => return errors::stock_error_to_response(e),
    };

    // Parse-level problems join the service-level skips.
    report.skipped.extend(import.errors);

    (StatusCode::OK, Json(report)).into_response()
}

pub async fn export_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    if let Err(e) = session.require_admin() {
        return errors::stock_error_to_response(e);
    }

    let items = match services
        .stock
        .list_items(query.category.as_deref(), query.q.as_deref())
    {
        Ok(items) => items,
        Err(e) => return errors::stock_error_to_response(e),
    };

    match export::items_to_csv(&items) {
        Ok(bytes) => common::csv_response("stock_items.csv", bytes),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn upload_template() -> axum::response::Response {
    match export::catalog_template_csv() {
        Ok(bytes) => common::csv_response("catalog_template.csv", bytes),
        Err(e) => errors::stock_error_to_response(e),
    }
}
