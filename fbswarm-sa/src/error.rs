//! Error types for fbswarm-sa
//!
//! `SwarmError` is what the scoring and ranking core reports. `ApiError` is
//! the HTTP-facing wrapper that maps every failure to a status code and a
//! stable error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the swarm analysis core
#[derive(Debug, Error)]
pub enum SwarmError {
    /// Analyze request without a usable feedback id
    #[error("feedbackId is required")]
    MissingFeedbackId,

    /// Feedback id present but not an integer
    #[error("feedbackId must be a positive integer, got {0}")]
    InvalidFeedbackId(String),

    #[error("Feedback {0} not found")]
    FeedbackNotFound(i64),

    #[error("Invalid agent type: {0}")]
    InvalidAgentType(String),

    /// Consensus needs exactly one score from each of the five agents
    #[error("Incomplete swarm: {received} scores from {distinct} distinct agents")]
    IncompleteSwarm { received: usize, distinct: usize },

    /// Persistence failure; the run is abandoned
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl SwarmError {
    /// Stable machine-readable code reported to API clients
    pub fn code(&self) -> &'static str {
        match self {
            SwarmError::MissingFeedbackId => "MISSING_FEEDBACK_ID",
            SwarmError::InvalidFeedbackId(_) => "INVALID_FEEDBACK_ID",
            SwarmError::FeedbackNotFound(_) => "FEEDBACK_NOT_FOUND",
            SwarmError::InvalidAgentType(_) => "INVALID_AGENT_TYPE",
            SwarmError::IncompleteSwarm { .. } => "INCOMPLETE_SWARM",
            SwarmError::Storage(_) => "DATABASE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SwarmError::MissingFeedbackId
            | SwarmError::InvalidFeedbackId(_)
            | SwarmError::InvalidAgentType(_) => StatusCode::BAD_REQUEST,
            SwarmError::FeedbackNotFound(_) => StatusCode::NOT_FOUND,
            SwarmError::IncompleteSwarm { .. } | SwarmError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    /// Resource not found (404)
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Swarm(#[from] SwarmError),
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::NotFound {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            ApiError::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            ApiError::Database(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                err.to_string(),
            ),
            ApiError::Swarm(ref err) => (err.status(), err.code(), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "Request failed: {}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swarm_error_codes() {
        assert_eq!(SwarmError::MissingFeedbackId.code(), "MISSING_FEEDBACK_ID");
        assert_eq!(SwarmError::FeedbackNotFound(3).code(), "FEEDBACK_NOT_FOUND");
        assert_eq!(
            SwarmError::InvalidAgentType("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(SwarmError::FeedbackNotFound(3).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::from(SwarmError::FeedbackNotFound(9)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::bad_request("INVALID_LIMIT", "limit must be positive").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
