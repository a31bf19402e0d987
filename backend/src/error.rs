//! Error type shared by the data sources and services.
//!
//! Every failure carries a kind, a client-facing message and the HTTP status
//! it maps to at the routing boundary.

use crate::db::repository::RepositoryError;
use crate::sources::HttpError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unavailable,
    MissingCredential,
    Upstream,
    Persistence,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad or missing query parameter.
    #[error("{0}")]
    Validation(String),

    /// Upstream answered but had nothing matching the request.
    #[error("{0}")]
    NotFound(String),

    /// Upstream unreachable, timed out, or returned an empty dataset.
    #[error("{0}")]
    Unavailable(String),

    /// A required API key is not configured.
    #[error("{0}")]
    MissingCredential(String),

    /// Upstream returned a non-success status; passed through to the caller.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Records were fetched but the store rejected the upsert.
    #[error("Failed to persist {entity}")]
    Persistence {
        entity: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn missing_credential(name: &str) -> Self {
        Self::MissingCredential(format!("{} is not defined", name))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn persistence(entity: &'static str, source: RepositoryError) -> Self {
        Self::Persistence { entity, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code the error maps to.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::MissingCredential(_) => 500,
            Self::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Self::Upstream { .. } => 502,
            Self::Persistence { .. } | Self::Internal(_) => 500,
        }
    }
}

impl From<HttpError> for ServiceError {
    fn from(err: HttpError) -> Self {
        ServiceError::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::validation("x").status(), 400);
        assert_eq!(ServiceError::not_found("x").status(), 404);
        assert_eq!(ServiceError::unavailable("x").status(), 503);
        assert_eq!(ServiceError::missing_credential("NASA_API_KEY").status(), 500);
        assert_eq!(ServiceError::internal("x").status(), 500);
        assert_eq!(
            ServiceError::persistence("neos", RepositoryError::connection("down")).status(),
            500
        );
    }

    #[test]
    fn test_upstream_status_is_passed_through() {
        let err = ServiceError::Upstream {
            status: 429,
            message: "OVER_RATE_LIMIT".into(),
        };
        assert_eq!(err.status(), 429);
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn test_non_error_upstream_status_becomes_bad_gateway() {
        let err = ServiceError::Upstream {
            status: 302,
            message: "moved".into(),
        };
        assert_eq!(err.status(), 502);
    }

    #[test]
    fn test_persistence_message_hides_store_detail() {
        let err = ServiceError::persistence("neos", RepositoryError::connection("pool down"));
        assert_eq!(err.to_string(), "Failed to persist neos");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert!(source.unwrap().contains("pool down"));
    }

    #[test]
    fn test_missing_credential_message() {
        let err = ServiceError::missing_credential("NASA_API_KEY");
        assert_eq!(err.to_string(), "NASA_API_KEY is not defined");
    }

    #[test]
    fn test_timeout_maps_to_unavailable() {
        let err: ServiceError = HttpError::Timeout {
            url: "https://api.nasa.gov/neo/rest/v1/feed".into(),
            timeout: Duration::from_secs(10),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.status(), 503);
    }
}
