use core::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use labtrack_infra::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ServiceError::PermissionDenied(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        ServiceError::InvalidOrExpiredToken => {
            json_error(StatusCode::BAD_REQUEST, "invalid_or_expired_token", err.to_string())
        }
        ServiceError::WeakCredential { .. } => json_error(StatusCode::BAD_REQUEST, "weak_password", err.to_string()),
        ServiceError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", err.to_string())
        }
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
        ServiceError::Credential(msg) => {
            tracing::error!(error = %msg, "credential processing failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "credential_error", "credential processing failure")
        }
    }
}

/// `status` with a JSON body on success, the mapped error otherwise.
pub fn respond<T: Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub fn no_content(result: Result<(), ServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_to_response(e),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path identifier, answering 400 when it is not one.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}
