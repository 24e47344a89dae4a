use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gudang_core::StockError;

pub fn stock_error_to_response(err: StockError) -> axum::response::Response {
    match err {
        StockError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        StockError::DuplicateCode(code) => json_error(
            StatusCode::CONFLICT,
            "duplicate_code",
            format!("item code already exists: {code}"),
        ),
        StockError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StockError::InsufficientStock {
            requested,
            available,
        } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_stock",
            format!("requested {requested}, available {available}"),
        ),
        StockError::DataIntegrity(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "data_integrity", msg)
        }
        StockError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
        StockError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
