use std::str::FromStr;
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

use gudang_core::{AttachmentRef, SessionContext};
use gudang_infra::{StockInDraft, StockOutDraft, StockReturnDraft};
use gudang_requests::TransactionType;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_pending))
        .route("/in", post(submit_in))
        .route("/out", post(submit_out))
        .route("/return", post(submit_return))
        .route("/attachments", post(upload_attachment))
        .route("/attachments/:key", get(download_attachment))
}

/// Current queue, in submission order. Re-reads state on every call.
pub async fn list_pending(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.stock.list_pending() {
        Ok(requests) => (StatusCode::OK, Json(requests.collect::<Vec<_>>())).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn submit_in(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::SubmitInRequest>,
) -> axum::response::Response {
    let item_code = match common::parse_item_code(&body.item_code) {
        Ok(code) => code,
        Err(resp) => return resp,
    };

    let draft = StockInDraft {
        item_code,
        quantity: body.quantity,
        delivery_reference: body.delivery_reference,
        attachment: AttachmentRef::new(body.attachment),
    };

    match services.stock.submit_in(&session, draft, Utc::now()) {
        Ok(id) => created(id),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn submit_out(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::SubmitOutRequest>,
) -> axum::response::Response {
    let item_code = match common::parse_item_code(&body.item_code) {
        Ok(code) => code,
        Err(resp) => return resp,
    };
    let transaction_type = match TransactionType::from_str(&body.transaction_type) {
        Ok(t) => t,
        Err(e) => return errors::stock_error_to_response(e),
    };

    let draft = StockOutDraft {
        item_code,
        quantity: body.quantity,
        transaction_type,
        event: body.event,
    };

    match services.stock.submit_out(&session, draft, Utc::now()) {
        Ok(id) => created(id),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn submit_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<dto::SubmitReturnRequest>,
) -> axum::response::Response {
    let item_code = match common::parse_item_code(&body.item_code) {
        Ok(code) => code,
        Err(resp) => return resp,
    };

    let draft = StockReturnDraft {
        item_code,
        quantity: body.quantity,
        event: body.event,
    };

    match services.stock.submit_return(&session, draft, Utc::now()) {
        Ok(id) => created(id),
        Err(e) => errors::stock_error_to_response(e),
    }
}

fn created(id: gudang_core::RequestId) -> axum::response::Response {
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}

/// Store an IN delivery document; the returned reference goes into the
/// subsequent `POST /requests/in` body.
pub async fn upload_attachment(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AttachmentUploadQuery>,
    body: Bytes,
) -> axum::response::Response {
    if body.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "empty_attachment",
            "attachment body is empty",
        );
    }

    let filename = query.filename.as_deref().unwrap_or("delivery-order.pdf");
    match services.attachments.put(filename, &body) {
        Ok(reference) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "attachment": reference })),
        )
            .into_response(),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            e.to_string(),
        ),
    }
}

pub async fn download_attachment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    match services.attachments.open(&AttachmentRef::new(key)) {
        Ok(bytes) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "application/octet-stream",
            )],
            bytes,
        )
            .into_response(),
        Err(_) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "attachment not found"),
    }
}
