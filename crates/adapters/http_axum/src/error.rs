//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use leadhub_domain::error::{LeadHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Maps [`LeadHubError`] (and request-level failures) to an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// The caller could not be identified.
    Unauthorized,
    /// A use-case failed.
    Domain(LeadHubError),
}

impl From<LeadHubError> for ApiError {
    fn from(err: LeadHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::MalformedPayload(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ValidationError::MalformedPayload(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "missing or invalid X-User-Id header".to_string(),
                None,
            ),
            Self::Domain(LeadHubError::Validation(err)) => (
                StatusCode::BAD_REQUEST,
                "validation error".to_string(),
                Some(err.to_string()),
            ),
            Self::Domain(LeadHubError::NotFound(err)) => {
                (StatusCode::NOT_FOUND, err.to_string(), None)
            }
            Self::Domain(LeadHubError::QuotaExceeded(err)) => {
                (StatusCode::CONFLICT, err.to_string(), None)
            }
            Self::Domain(LeadHubError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}
