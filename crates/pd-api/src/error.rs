//! API error handling
//!
//! Turns domain errors into JSON error bodies with a matching status code.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pd_auth::JwtError;
use pd_core::error::ValidationErrors;
use pd_core::PdError;
use serde::Serialize;
use tracing::error;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound { resource: &'static str, id: String },
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "urn:projectdesk:api:errors:NotFound",
            ApiError::Validation(_) => "urn:projectdesk:api:errors:PropertyConstraintViolation",
            ApiError::Unauthorized(_) => "urn:projectdesk:api:errors:Unauthenticated",
            ApiError::Forbidden(_) => "urn:projectdesk:api:errors:MissingPermission",
            ApiError::BadRequest(_) => "urn:projectdesk:api:errors:InvalidRequestBody",
            ApiError::Conflict(_) => "urn:projectdesk:api:errors:Conflict",
            ApiError::Internal(_) => "urn:projectdesk:api:errors:InternalError",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound { resource, id } => format!("{} with id {} not found", resource, id),
            ApiError::Validation(errors) => errors.full_messages().join(", "),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
        }
    }
}

impl From<PdError> for ApiError {
    fn from(err: PdError) -> Self {
        match err {
            PdError::Authorization { .. } => ApiError::Forbidden(err.to_string()),
            PdError::Validation(errors) => ApiError::Validation(errors),
            PdError::NotFound { entity, id } => ApiError::NotFound {
                resource: entity,
                id: id.to_string(),
            },
            PdError::Unauthenticated { message } => ApiError::Unauthorized(message),
            PdError::Conflict { message } => ApiError::Conflict(message),
            PdError::Database(_) | PdError::Internal(_) | PdError::Config(_) => {
                error!(error = %err, "request failed");
                ApiError::Internal("An internal error occurred".to_string())
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingFailed(_) => {
                error!(error = %err, "token encoding failed");
                ApiError::Internal("An internal error occurred".to_string())
            }
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "errorIdentifier")]
    error_identifier: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            type_name: "Error",
            error_identifier: self.identifier(),
            message: self.message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::Action;

    #[test]
    fn test_domain_errors_keep_their_status() {
        let forbidden: ApiError = PdError::authorization(Action::Delete, "Task", Some(4)).into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        let invalid: ApiError = PdError::Validation(errors).into();
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.message(), "title can't be blank");

        let missing: ApiError = PdError::not_found("Project", 9).into();
        assert_eq!(missing.message(), "Project with id 9 not found");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = PdError::Database("connection refused".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("connection refused"));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let err: ApiError = JwtError::Expired.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
