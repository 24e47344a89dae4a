use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use gudang_core::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "username": session.username(),
        "role": session.role().as_str(),
    }))
}
