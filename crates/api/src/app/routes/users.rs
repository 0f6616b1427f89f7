use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use labtrack_auth::{NewUser, UserUpdate};
use labtrack_core::UserId;

use crate::app::dto::{ChangePasswordRequest, CreatedUserResponse, DeliveryView, UserView};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/change-password", post(change_password))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/resend-invitation", post(resend_invitation))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    let users = services
        .users
        .list(ctx.actor())
        .map(|users| users.into_iter().map(UserView::from).collect::<Vec<_>>());
    errors::respond(StatusCode::OK, users)
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.users.get(ctx.actor(), id).map(UserView::from))
}

/// The account starts disabled; the invitation outcome is reported alongside.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewUser>,
) -> axum::response::Response {
    let created = services
        .users
        .create(ctx.actor(), body, Utc::now())
        .await
        .map(|created| CreatedUserResponse {
            user: UserView::from(created.user),
            invitation: DeliveryView::from(created.delivery),
        });
    errors::respond(StatusCode::CREATED, created)
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<UserUpdate>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.users.update(ctx.actor(), id, body).map(UserView::from))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::no_content(services.users.delete(ctx.actor(), id))
}

pub async fn resend_invitation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let delivery = services
        .users
        .resend_invitation(ctx.actor(), id, Utc::now())
        .await
        .map(DeliveryView::from);
    errors::respond(StatusCode::OK, delivery)
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> axum::response::Response {
    errors::no_content(
        services
            .credentials
            .change_password(ctx.actor(), &body.current_password, &body.new_password),
    )
}
