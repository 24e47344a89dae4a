use axum::{routing::get, Router};

pub mod admin;
pub mod approvals;
pub mod auth;
pub mod common;
pub mod history;
pub mod items;
pub mod reports;
pub mod requests;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/items", items::router())
        .nest("/requests", requests::router())
        .nest("/approvals", approvals::router())
        .nest("/history", history::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
        .nest("/auth", auth::protected_router())
}
