use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use labtrack_auth::TokenKind;

use crate::app::dto::{SetPasswordRequest, TokenOwnerView, TokenQuery, UserView};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/validate", get(validate_invitation))
        .route("/activate", post(activate))
}

pub async fn validate_invitation(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<TokenQuery>,
) -> axum::response::Response {
    let owner = services
        .credentials
        .validate_token(TokenKind::Invitation, &query.token, Utc::now())
        .map(TokenOwnerView::from);
    errors::respond(StatusCode::OK, owner)
}

pub async fn activate(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SetPasswordRequest>,
) -> axum::response::Response {
    let user = services
        .credentials
        .activate(&body.token, &body.password, Utc::now())
        .map(UserView::from);
    errors::respond(StatusCode::OK, user)
}
