use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionRegistry>,
}

/// Resolve the bearer token into a [`gudang_core::SessionContext`] and make
/// it available to every protected handler as a request extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let session = state
        .sessions
        .resolve(token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
