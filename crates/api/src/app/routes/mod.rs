use axum::Router;

pub mod auth;
pub mod equipment;
pub mod invitations;
pub mod issues;
pub mod maintenance;
pub mod notifications;
pub mod system;
pub mod users;

/// Routes that need a bearer token.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", axum::routing::get(system::whoami))
        .nest("/equipment", equipment::router())
        .nest("/maintenance", maintenance::router())
        .nest("/issues", issues::router())
        .nest("/users", users::router())
        .nest("/notifications", notifications::router())
}

/// Routes reachable without a session: login and the token flows.
pub fn public_router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/invitations", invitations::router())
}
