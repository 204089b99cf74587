use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use application::error::AppError;
use serde_json::{json, Value};
use thiserror::Error;

/// Wire-level error. Validation failures carry the client-facing
/// message; everything out of the services maps to a 500 whose body
/// keeps the stable context label separate from the cause.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    BadRequestWithExample { message: String, example: Value },
    #[error("{context}: {message}")]
    Internal { context: String, message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn bad_request_with_example(message: impl Into<String>, example: Value) -> Self {
        ApiError::BadRequestWithExample {
            message: message.into(),
            example,
        }
    }

    pub fn internal(context: &str, source: AppError) -> Self {
        ApiError::Internal {
            context: context.to_string(),
            message: source.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::BadRequestWithExample { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::BadRequest(message) => json!({ "error": message }),
            ApiError::BadRequestWithExample { message, example } => {
                json!({ "error": message, "example": example })
            }
            ApiError::Internal { context, message } => {
                json!({ "error": context, "message": message })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_400() {
        assert_eq!(
            ApiError::bad_request("prompt is required").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn service_errors_are_500() {
        let err = ApiError::internal(
            "Failed to upload track",
            AppError::Pinning("provider unavailable".to_string()),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to upload track: provider unavailable");
    }
}
