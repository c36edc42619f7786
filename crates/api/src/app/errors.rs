use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use backoffice_core::DomainError;
use backoffice_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::AlreadyExists(msg) => json_error(StatusCode::CONFLICT, "already_exists", msg),
        ServiceError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        ServiceError::ArithmeticFault(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "arithmetic_fault", msg)
        }
        ServiceError::StoreUnavailable(msg) => {
            tracing::error!(error = %msg, "store unavailable");
            json_error(StatusCode::GATEWAY_TIMEOUT, "store_unavailable", msg)
        }
        ServiceError::Store(msg) => {
            tracing::error!(error = %msg, "store error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    service_error_to_response(err.into())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
