use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto::WhoAmIResponse;
use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<ActorContext>) -> Json<WhoAmIResponse> {
    let actor = ctx.actor();
    Json(WhoAmIResponse {
        user_id: actor.id,
        email: ctx.email().to_string(),
        role: actor.role,
        unit: actor.unit.clone(),
    })
}
