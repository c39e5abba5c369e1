use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Data unavailable: {0}")]
    DataUnavailableError(String),
}

impl AppError {
    /// Message surfaced to the LLM and the end user when a tool fails.
    ///
    /// Tool results carry the bare message rather than the categorized
    /// `Display` form so the model sees e.g. `Site "x" not found`.
    pub fn message(&self) -> &str {
        match self {
            AppError::ConfigurationError(msg)
            | AppError::UpstreamError(msg)
            | AppError::ValidationError(msg)
            | AppError::DataUnavailableError(msg) => msg,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ConfigurationError(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::UpstreamError(msg) => {
                tracing::error!(error = %msg, "Upstream error");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::DataUnavailableError(msg) => {
                tracing::warn!(error = %msg, "Data unavailable");
                (StatusCode::NOT_FOUND, msg.clone())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamError(format!("Request timed out: {}", err))
        } else {
            AppError::UpstreamError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
