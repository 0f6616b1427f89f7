use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use chrono::Utc;

use labtrack_core::NotificationId;
use labtrack_equipment::NewNotification;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route("/:id", delete(delete_notification))
        .route("/:id/read", put(mark_read))
}

pub async fn list_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.notifications.list(ctx.actor()))
}

pub async fn create_notification(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewNotification>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, services.notifications.create(ctx.actor(), body, Utc::now()))
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: NotificationId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.notifications.mark_read(ctx.actor(), id))
}

pub async fn delete_notification(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: NotificationId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::no_content(services.notifications.delete(ctx.actor(), id))
}
