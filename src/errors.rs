use crate::pricing::ComputationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Domain-specific error types for the service.
/// Upstream failures are reported to the caller, never swallowed;
/// pricing failures carry the engine's own error unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream error: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Computation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Network(_) | Self::Upstream { .. } | Self::Parse(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure came from a third-party service rather than the caller.
    #[inline]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Upstream { .. } | Self::Parse(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, status = status.as_u16(), "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Database(e.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Database(e.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let computation = ServiceError::from(ComputationError::Missing("volatility"));
        assert_eq!(computation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(computation.to_string(), "missing parameter: volatility");

        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        let upstream = ServiceError::Upstream { status: 503, body: "busy".into() };
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert!(upstream.is_upstream());
        assert_eq!(ServiceError::Database("locked".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
