//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: storage wiring (in-memory or Postgres) + shared handles
//! - `routes/`: HTTP routes + handlers (one file per screen area)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app() -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services().await?);
    build_app_with(services)
}

/// Router over pre-built services; black-box tests wire their own.
pub fn build_app_with(services: Arc<services::AppServices>) -> anyhow::Result<Router> {
    let auth_state = middleware::AuthState {
        sessions: services.sessions.clone(),
    };

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services.clone()));

    // Protected routes: everything else requires a resolved session.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new().merge(public).merge(protected))
}
