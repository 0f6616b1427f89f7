//! Router assembly and service wiring.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use chrono::{DateTime, Utc};
use tower::ServiceBuilder;

use labtrack_infra::services::ServiceError;
use labtrack_infra::{AppConfig, Mailer, TracingMailer};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router, mailing through the log.
pub async fn build_app(config: AppConfig, now: DateTime<Utc>) -> Result<Router, ServiceError> {
    build_app_with_mailer(config, Arc::new(TracingMailer), now).await
}

/// Build the router around `mailer`, seeding the first admin if the user
/// store is empty.
pub async fn build_app_with_mailer(
    config: AppConfig,
    mailer: Arc<dyn Mailer>,
    now: DateTime<Utc>,
) -> Result<Router, ServiceError> {
    let services = Arc::new(services::AppServices::build(&config, mailer));
    services.seed(&config, now).await?;

    let auth_state = middleware::AuthState {
        jwt: services.jwt.clone(),
    };

    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware));

    let public = routes::public_router().layer(Extension(services));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
        .layer(ServiceBuilder::new()))
}
