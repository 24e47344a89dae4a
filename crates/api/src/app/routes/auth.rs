use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::middleware::extract_bearer;

pub fn protected_router() -> Router {
    Router::new().route("/logout", post(logout))
}

/// Login gate. Wrong username and wrong password are indistinguishable.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.users.get(body.username.trim()) {
        Ok(user) => user,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
        }
    };

    let session = match gudang_auth::authenticate(user, &body.password) {
        Ok(session) => session,
        Err(_) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid username or password",
            )
        }
    };

    tracing::info!(username = session.username(), "login");
    let token = services.sessions.issue(session.clone());

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "username": session.username(),
            "role": session.role().as_str(),
        })),
    )
        .into_response()
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let Ok(token) = extract_bearer(&headers) else {
        // The middleware already validated this; unreachable in practice.
        return StatusCode::UNAUTHORIZED.into_response();
    };

    services.sessions.revoke(token);
    StatusCode::NO_CONTENT.into_response()
}
