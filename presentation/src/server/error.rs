//! API error type and its JSON error body

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use council_application::StageError;
use serde::Serialize;
use thiserror::Error;

/// Error body: `{"error": "...", "details"?: "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body decoded but failed validation
    #[error("Invalid request")]
    InvalidRequest { details: String },

    #[error("Invalid JSON body")]
    InvalidJson,

    /// The run exists but is not ready for the requested stage
    #[error("{0}")]
    Precondition(String),

    #[error("Request not found")]
    NotFound,

    /// Any other extractor failure, passed through with its own status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } | Self::InvalidJson | Self::Precondition(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            details: match self {
                Self::InvalidRequest { details } => Some(details.clone()),
                _ => None,
            },
        }
    }
}

impl From<StageError> for ApiError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::InvalidRequest(details) => Self::InvalidRequest { details },
            StageError::NotFound(_) => Self::NotFound,
            other => Self::Precondition(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) => Self::InvalidJson,
            JsonRejection::JsonDataError(e) => Self::InvalidRequest {
                details: e.body_text(),
            },
            JsonRejection::MissingJsonContentType(e) => Self::InvalidRequest {
                details: e.body_text(),
            },
            other => Self::Rejected {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API error: {}", self);
        }
        (status, axum::Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Stage;

    #[test]
    fn test_stage_errors_map_to_status() {
        let not_found: ApiError = StageError::NotFound("r1".to_string()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let precondition: ApiError = StageError::NotEnoughAnswers {
            stage: Stage::Review,
            required: 2,
            found: 1,
        }
        .into();
        assert_eq!(precondition.status(), StatusCode::BAD_REQUEST);
        assert!(precondition.to_string().starts_with("Not enough answers to run stage2"));

        let invalid: ApiError = StageError::InvalidRequest("query must not be empty".into()).into();
        let body = invalid.body();
        assert_eq!(body.error, "Invalid request");
        assert_eq!(body.details.as_deref(), Some("query must not be empty"));
    }

    #[test]
    fn test_body_omits_missing_details() {
        let json = serde_json::to_value(ApiError::NotFound.body()).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Request not found"}));
    }
}
