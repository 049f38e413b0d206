//! HTTP transport error handling
//!
//! Converts internal errors to `{"error": "..."}` bodies with an HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ProviderError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP transport errors
#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    #[error("Failed to fetch price from Binance")]
    PriceFetch(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl HttpTransportError {
    /// Get HTTP status code for error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpTransportError::PriceFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpTransportError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            HttpTransportError::Provider(err) => match err {
                ProviderError::SourcesExhausted(_) => StatusCode::BAD_GATEWAY,
                ProviderError::PriceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ProviderError::Prediction(_) | ProviderError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                ProviderError::Source(_) | ProviderError::Analysis(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for HttpTransportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let HttpTransportError::PriceFetch(detail) = &self {
            tracing::error!("Price fetch failed: {}", detail);
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for HTTP transport operations
pub type Result<T> = std::result::Result<T, HttpTransportError>;
