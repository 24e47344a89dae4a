use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use gudang_core::SessionContext;
use gudang_infra::export;
use gudang_ledger::LedgerEntry;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_history))
        .route("/export", get(export_history))
}

pub async fn list_history(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::HistoryQuery>,
) -> axum::response::Response {
    let entries = match filtered(&services, &query) {
        Ok(entries) => entries,
        Err(resp) => return resp,
    };
    (StatusCode::OK, Json(entries)).into_response()
}

pub async fn export_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<dto::HistoryQuery>,
) -> axum::response::Response {
    if let Err(e) = session.require_admin() {
        return errors::stock_error_to_response(e);
    }

    let entries = match filtered(&services, &query) {
        Ok(entries) => entries,
        Err(resp) => return resp,
    };

    match export::history_to_csv(&entries) {
        Ok(bytes) => common::csv_response("stock_history.csv", bytes),
        Err(e) => errors::stock_error_to_response(e),
    }
}

fn filtered(
    services: &AppServices,
    query: &dto::HistoryQuery,
) -> Result<Vec<LedgerEntry>, axum::response::Response> {
    let range = common::parse_range(query.from.as_deref(), query.to.as_deref())?;

    let mut entries = services
        .stock
        .history()
        .map_err(errors::stock_error_to_response)?;

    entries.retain(|e| range.contains(e.effective_date()));
    if let Some(actor) = query.actor.as_deref() {
        entries.retain(|e| e.actor == actor);
    }
    if let Some(action) = query.action.as_deref() {
        entries.retain(|e| e.action.as_str() == action);
    }
    if let Some(item) = query.item.as_deref() {
        let needle = item.to_lowercase();
        entries.retain(|e| e.item_name.to_lowercase().contains(&needle));
    }

    Ok(entries)
}
