use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use labtrack_core::IssueReportId;
use labtrack_equipment::IssueReportDraft;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/:id", get(get_report).put(update_report).delete(delete_report))
}

pub async fn list_reports(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.issues.list(ctx.actor()))
}

pub async fn get_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: IssueReportId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.issues.get(ctx.actor(), id))
}

/// Files the report and publishes a notification about it.
pub async fn create_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<IssueReportDraft>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, services.issues.create(ctx.actor(), body, Utc::now()))
}

pub async fn update_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<IssueReportDraft>,
) -> axum::response::Response {
    let id: IssueReportId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.issues.update(ctx.actor(), id, body))
}

pub async fn delete_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: IssueReportId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::no_content(services.issues.delete(ctx.actor(), id))
}
