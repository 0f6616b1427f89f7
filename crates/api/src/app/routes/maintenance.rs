use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use labtrack_core::MaintenanceRecordId;
use labtrack_equipment::MaintenanceRecordDraft;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/:id", get(get_record).put(update_record).delete(delete_record))
}

pub async fn list_records(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.maintenance.list(ctx.actor()))
}

pub async fn get_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MaintenanceRecordId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.maintenance.get(ctx.actor(), id))
}

pub async fn create_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<MaintenanceRecordDraft>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, services.maintenance.create(ctx.actor(), body))
}

pub async fn update_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<MaintenanceRecordDraft>,
) -> axum::response::Response {
    let id: MaintenanceRecordId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.maintenance.update(ctx.actor(), id, body))
}

pub async fn delete_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MaintenanceRecordId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::no_content(services.maintenance.delete(ctx.actor(), id))
}
