use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use labtrack_core::EquipmentId;
use labtrack_equipment::EquipmentDraft;

use crate::app::dto::ExistsResponse;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_equipment).post(create_equipment))
        .route("/exists/:institutional_id", get(institutional_id_exists))
        .route("/:id", get(get_equipment).put(update_equipment).delete(delete_equipment))
        .route("/:id/maintenance", get(list_maintenance))
        .route("/:id/issues", get(list_issues))
}

pub async fn list_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.equipment.list(ctx.actor(), Utc::now()))
}

pub async fn get_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EquipmentId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.equipment.get(ctx.actor(), id, Utc::now()))
}

pub async fn create_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<EquipmentDraft>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, services.equipment.create(ctx.actor(), body, Utc::now()))
}

pub async fn update_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<EquipmentDraft>,
) -> axum::response::Response {
    let id: EquipmentId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.equipment.update(ctx.actor(), id, body, Utc::now()))
}

/// Also removes the equipment's maintenance records and issue reports.
pub async fn delete_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EquipmentId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::no_content(services.equipment.delete(ctx.actor(), id))
}

pub async fn institutional_id_exists(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(institutional_id): Path<String>,
) -> axum::response::Response {
    let exists = services
        .equipment
        .exists_by_institutional_id(ctx.actor(), &institutional_id)
        .map(|exists| ExistsResponse { exists });
    errors::respond(StatusCode::OK, exists)
}

pub async fn list_maintenance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EquipmentId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.maintenance.list_for_equipment(ctx.actor(), id))
}

pub async fn list_issues(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EquipmentId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.issues.list_for_equipment(ctx.actor(), id))
}
