//! Shared parsing/response helpers for handlers.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;

use gudang_core::{ItemCode, RequestId};
use gudang_reporting::DateRange;

use crate::app::errors;

pub fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, Response> {
    match value {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_date",
                    format!("{field} must be YYYY-MM-DD"),
                )
            }),
    }
}

pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange, Response> {
    Ok(DateRange::new(
        parse_date(from, "from")?,
        parse_date(to, "to")?,
    ))
}

pub fn parse_item_code(raw: &str) -> Result<ItemCode, Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_code", "invalid item code")
    })
}

pub fn parse_request_ids(raw: &[String]) -> Result<Vec<RequestId>, Response> {
    raw.iter()
        .map(|s| {
            s.parse::<RequestId>().map_err(|_| {
                errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid request id: {s}"),
                )
            })
        })
        .collect()
}

/// A CSV download response.
pub fn csv_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
