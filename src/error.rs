// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::DatabaseError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::UnprocessableEntity { message, field_errors } => json!({
                "error": true,
                "message": message,
                "code": self.error_code(),
                "field_errors": field_errors
            }),
            _ => json!({
                "error": true,
                "message": self.message(),
                "code": self.error_code()
            }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("the requested resource could not be found".to_string())
    }

    pub fn method_not_allowed(method: impl std::fmt::Display) -> Self {
        ApiError::MethodNotAllowed(format!(
            "the {} method is not supported for this resource",
            method
        ))
    }

    pub fn edit_conflict() -> Self {
        ApiError::Conflict(
            "unable to update the record due to an edit conflict, please try again".to_string(),
        )
    }

    pub fn failed_validation(field_errors: HashMap<String, String>) -> Self {
        ApiError::UnprocessableEntity {
            message: "the request failed validation".to_string(),
            field_errors,
        }
    }

    pub fn internal_server_error() -> Self {
        ApiError::InternalServerError(
            "the server encountered a problem and could not process your request".to_string(),
        )
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_server_error() {
            // Log the real error but return generic message
            tracing::error!(error = %err, "database operation failed");
            return ApiError::internal_server_error();
        }
        match err {
            DatabaseError::RecordNotFound => ApiError::not_found(),
            DatabaseError::EditConflict => ApiError::edit_conflict(),
            DatabaseError::InvalidFilter(e) => {
                let mut field_errors = HashMap::new();
                field_errors.insert(e.field().to_string(), e.to_string());
                ApiError::failed_validation(field_errors)
            }
            _ => ApiError::internal_server_error(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterError;
    use std::time::Duration;

    #[test]
    fn maps_repository_errors() {
        let e = ApiError::from(DatabaseError::RecordNotFound);
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);

        let e = ApiError::from(DatabaseError::EditConflict);
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        assert_eq!(e.error_code(), "CONFLICT");

        let e = ApiError::from(DatabaseError::Timeout(Duration::from_secs(3)));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.message().contains("3s"));
    }

    #[test]
    fn filter_errors_are_field_tagged() {
        let e = ApiError::from(DatabaseError::from(FilterError::OutOfRange {
            field: "page_size",
            value: 0,
        }));
        assert_eq!(e.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.to_json()["field_errors"]["page_size"], "page_size out of range: 0");
    }

    #[test]
    fn validation_body_lists_fields() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "must be provided".to_string());
        let body = ApiError::failed_validation(fields).to_json();
        assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(body["field_errors"]["title"], "must be provided");
    }

    #[test]
    fn plain_errors_have_no_field_errors() {
        let body = ApiError::bad_request("body contains badly-formed JSON").to_json();
        assert_eq!(body["error"], true);
        assert!(body.get("field_errors").is_none());
    }
}
