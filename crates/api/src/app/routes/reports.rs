use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use gudang_reporting as reporting;
use gudang_requests::MovementKind;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/stock-card/:name", get(stock_card))
        .route("/monthly", get(monthly))
        .route("/days-of-cover/:code", get(days_of_cover))
}

/// Headline numbers plus the three monthly series and the top movers, all in
/// one round trip the way the dashboard consumes them.
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DateRangeQuery>,
) -> axum::response::Response {
    let range = match common::parse_range(query.from.as_deref(), query.to.as_deref()) {
        Ok(range) => range,
        Err(resp) => return resp,
    };

    let items = match services.stock.list_items(None, None) {
        Ok(items) => items,
        Err(e) => return errors::stock_error_to_response(e),
    };
    let entries = match services.stock.history() {
        Ok(entries) => entries,
        Err(e) => return errors::stock_error_to_response(e),
    };

    let summary = reporting::dashboard_summary(&items, &entries, range);
    let monthly_in = reporting::monthly_aggregate(MovementKind::In, range, &entries);
    let monthly_out = reporting::monthly_aggregate(MovementKind::Out, range, &entries);
    let monthly_return = reporting::monthly_aggregate(MovementKind::Return, range, &entries);
    let top_items = reporting::top_by_balance(&items, 10);
    let top_events = reporting::top_events_by_out(&entries, range, 5);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "summary": summary,
            "monthly_in": monthly_in,
            "monthly_out": monthly_out,
            "monthly_return": monthly_return,
            "top_items": top_items,
            "top_events": top_events,
        })),
    )
        .into_response()
}

/// Running-balance replay for one item. A snapshot mismatch is reported in
/// the payload and logged, never an error.
pub async fn stock_card(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let entries = match services.stock.history() {
        Ok(entries) => entries,
        Err(e) => return errors::stock_error_to_response(e),
    };

    let card = reporting::stock_card(&name, &entries);
    let violations = card.integrity_violations();
    if violations > 0 {
        tracing::warn!(
            item = name,
            violations,
            "stock card replay disagrees with stored balance snapshots"
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "item_name": card.item_name,
            "rows": card.rows,
            "integrity_violations": violations,
        })),
    )
        .into_response()
}

pub async fn monthly(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::MonthlyQuery>,
) -> axum::response::Response {
    let kind = match query.kind.trim().to_uppercase().as_str() {
        "IN" => MovementKind::In,
        "OUT" => MovementKind::Out,
        "RETURN" => MovementKind::Return,
        other => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_kind",
                format!("kind must be IN, OUT or RETURN, got: {other}"),
            )
        }
    };
    let range = match common::parse_range(query.from.as_deref(), query.to.as_deref()) {
        Ok(range) => range,
        Err(resp) => return resp,
    };

    let entries = match services.stock.history() {
        Ok(entries) => entries,
        Err(e) => return errors::stock_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(reporting::monthly_aggregate(kind, range, &entries)),
    )
        .into_response()
}

pub async fn days_of_cover(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
    Query(query): Query<dto::DaysOfCoverQuery>,
) -> axum::response::Response {
    let code = match gudang_core::ItemCode::from_str(&code) {
        Ok(code) => code,
        Err(e) => return errors::stock_error_to_response(e),
    };

    let item = match services.stock.item(&code) {
        Ok(item) => item,
        Err(e) => return errors::stock_error_to_response(e),
    };
    let entries = match services.stock.history() {
        Ok(entries) => entries,
        Err(e) => return errors::stock_error_to_response(e),
    };

    let window = query.window.unwrap_or(30);
    let days = reporting::days_of_cover(
        item.balance,
        &item.code,
        &entries,
        Utc::now().date_naive(),
        window,
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "item_code": item.code,
            "balance": item.balance,
            "window_days": window,
            "days_of_cover": days,
        })),
    )
        .into_response()
}
