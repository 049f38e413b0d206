use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream error: {0}")]
    Source(#[from] SourceError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),

    /// Every source in the fallback chain failed; carries the last error of each.
    #[error("depth analysis failed: {0}")]
    SourcesExhausted(String),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// Failure of a single upstream market data call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("HTTP {status} from {host}")]
    HttpStatus { host: String, status: u16 },

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Insufficient data: got {got} candles, need at least {needed}")]
    InsufficientData { got: usize, needed: usize },
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceError::ConnectionError(_)
                | SourceError::RateLimitError(_)
                | SourceError::HttpStatus { .. }
        )
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            SourceError::ConnectionError(_) => "connection_error",
            SourceError::HttpStatus { .. } => "http_status",
            SourceError::RateLimitError(_) => "rate_limit",
            SourceError::ParseError(_) => "parse_error",
            SourceError::InvalidResponse(_) => "invalid_response",
            SourceError::InsufficientData { .. } => "insufficient_data",
        }
    }

    /// Classifies a non-2xx upstream status
    pub fn from_status(host: &str, status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            429 => SourceError::RateLimitError(format!("{} returned HTTP 429", host)),
            code => SourceError::HttpStatus {
                host: host.to_string(),
                status: code,
            },
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::ConnectionError("Request timeout".to_string())
        } else if err.is_connect() {
            SourceError::ConnectionError(format!("Failed to connect: {}", err))
        } else if err.is_decode() {
            SourceError::ParseError(format!("Response body could not be decoded: {}", err))
        } else if let Some(status) = err.status() {
            let host = err
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("upstream")
                .to_string();
            SourceError::from_status(&host, status)
        } else {
            SourceError::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::ParseError(format!("JSON parsing failed: {}", err))
    }
}

/// Errors from the closing-price statistics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("need at least {needed} closing prices, got {got}")]
    InsufficientData { got: usize, needed: usize },

    #[error("closing price at index {0} is not a finite number")]
    NonFinite(usize),

    #[error("average closing price must be a positive finite number, got {0}")]
    NonPositiveMean(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("prediction {0} is already settled")]
    AlreadySettled(uuid::Uuid),

    #[error("prediction {id} is not due until {end_time}")]
    NotDue { id: uuid::Uuid, end_time: i64 },

    #[error("unknown horizon: {0}")]
    UnknownHorizon(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
