// API error type and its HTTP mapping
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Chart not found: {0}")]
    ChartNotFound(String),

    #[error("Sensor source is not configured")]
    SourceNotConfigured,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::ChartNotFound(_) => (StatusCode::NOT_FOUND, "CHART_NOT_FOUND"),
            ApiError::SourceNotConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, "SOURCE_NOT_CONFIGURED")
            }
        };

        tracing::error!(error_code = code, error_message = %self, "API error occurred");

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
