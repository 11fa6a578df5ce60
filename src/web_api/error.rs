//! HTTP-facing error type and the middleware that renders it.
//!
//! Handlers return `ApiError`. Its `IntoResponse` only sets the status and
//! parks the error in the response extensions; `render_error_responses`
//! turns it into an `ErrorResponse` body, since only the middleware sees
//! the request path.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, warn};

use crate::{
    create_task_request::FieldErrors,
    data_access::data_context::DataError,
    error_response::ErrorResponse,
    services::task_service::ServiceError,
    task_query_params::InvalidParameter,
};

#[derive(Debug, Clone)]
pub enum ApiError {
    ValidationFailed(FieldErrors),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationFailed(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiError::ValidationFailed(_) => "Validation Failed",
            ApiError::BadRequest(_) => "Bad Request",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Internal => "Internal Server Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::ValidationFailed(_) => "Request body has invalid fields".to_string(),
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Unauthorized(message) => message.clone(),
            ApiError::Internal => "An unexpected error occurred".to_string(),
        }
    }

    pub fn to_body(&self, path: &str) -> ErrorResponse {
        ErrorResponse {
            status: self.status_code().as_u16(),
            error: self.label().to_string(),
            message: self.message(),
            path: path.to_string(),
            timestamp: Utc::now(),
            field_errors: match self {
                ApiError::ValidationFailed(fields) => Some(fields.clone()),
                _ => None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status_code().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Outermost layer of the router: gives every `ApiError` its JSON body.
pub async fn render_error_responses(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ApiError>() {
        Some(api_error) => {
            let status = api_error.status_code();
            (status, Json(api_error.to_body(&path))).into_response()
        }
        None => response,
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(_) => ApiError::NotFound(error.to_string()),
            ServiceError::Validation(fields) => ApiError::ValidationFailed(fields),
            ServiceError::Data(source) => source.into(),
        }
    }
}

impl From<DataError> for ApiError {
    fn from(error: DataError) -> Self {
        error!(error = %error, "storage failure");
        ApiError::Internal
    }
}

impl From<InvalidParameter> for ApiError {
    fn from(error: InvalidParameter) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(reason = %rejection.body_text(), "unreadable request body");
        ApiError::BadRequest("Malformed request body".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_the_service_message() {
        let api_error = ApiError::from(ServiceError::NotFound(99));

        assert_eq!(api_error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(api_error.message(), "Task not found with id: 99");
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let api_error = ApiError::from(ServiceError::Data(DataError::Redb("disk on fire".into())));
        let body = api_error.to_body("/api/tasks");

        assert_eq!(body.status, 500);
        assert_eq!(body.message, "An unexpected error occurred");
        assert!(body.field_errors.is_none());
    }

    #[test]
    fn only_validation_carries_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("title".into(), "Title is required".into());

        let body = ApiError::ValidationFailed(fields).to_body("/api/tasks");

        assert_eq!(body.error, "Validation Failed");
        assert_eq!(body.path, "/api/tasks");
        assert_eq!(body.field_errors.unwrap()["title"], "Title is required");
    }
}
