//! HTTP error handling and response types.

use std::error::Error as _;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorBody;
use crate::error::ServiceError;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Validation, upstream or persistence failure from a service.
    Service(ServiceError),
    /// Client exceeded its request budget.
    RateLimited,
    /// No route matched the request path.
    RouteNotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Service(e) => {
                StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Service(e) => e.to_string(),
            AppError::RateLimited => "Too many requests".to_string(),
            AppError::RouteNotFound => "Route not found".to_string(),
        }
    }
}

fn error_chain(err: &ServiceError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if let AppError::Service(ref e) = self {
                tracing::error!(kind = e.kind().as_str(), "{}", error_chain(e));
            }
        }

        let body = ErrorBody::new(self.message(), status.as_u16());
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_status_is_preserved() {
        let err = AppError::from(ServiceError::not_found("No data found for sol 999"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "No data found for sol 999");
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::RateLimited.message(), "Too many requests");
        assert_eq!(AppError::RouteNotFound.message(), "Route not found");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::from(ServiceError::missing_credential("NASA_API_KEY"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
