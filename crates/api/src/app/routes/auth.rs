use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use labtrack_auth::{JwtClaims, TokenKind};
use labtrack_infra::Delivery;

use crate::app::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, SetPasswordRequest, TokenOwnerView, TokenQuery, UserView,
};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/reset-password/validate", get(validate_reset_token))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let user = match services.credentials.login(&body.email, &body.password) {
        Ok(user) => user,
        Err(e) => return errors::service_error_to_response(e),
    };

    let claims = JwtClaims::for_user(&user, Utc::now(), services.jwt_ttl);
    let token = match services.jwt.issue(&claims) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "session token not issued");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue session");
        }
    };

    Json(LoginResponse {
        token,
        expires_at: claims.expires_at,
        user: UserView::from(user),
    })
    .into_response()
}

/// 202 whether or not the address is known, so the answer does not reveal
/// which accounts exist. A failed reset mail is logged here.
pub async fn forgot_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> axum::response::Response {
    match services.credentials.request_password_reset(&body.email, Utc::now()).await {
        Ok(Some(Delivery::Failed(reason))) => {
            tracing::warn!(%reason, "password reset mail not delivered");
            StatusCode::ACCEPTED.into_response()
        }
        Ok(_) => StatusCode::ACCEPTED.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn validate_reset_token(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<TokenQuery>,
) -> axum::response::Response {
    let owner = services
        .credentials
        .validate_token(TokenKind::PasswordReset, &query.token, Utc::now())
        .map(TokenOwnerView::from);
    errors::respond(StatusCode::OK, owner)
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SetPasswordRequest>,
) -> axum::response::Response {
    let user = services
        .credentials
        .reset_password(&body.token, &body.password, Utc::now())
        .map(UserView::from);
    errors::respond(StatusCode::OK, user)
}
