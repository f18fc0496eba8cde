//! Error types for the gateway boundary and the user-facing taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failures observed while talking to the remote data service
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No response was received (connect failure, timeout, reset)
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered `success: false` with a 2xx status
    #[error("service rejected the request: {0}")]
    Rejected(String),

    /// History lookup succeeded but carried no records
    #[error("no records returned for {0}")]
    Empty(String),

    /// Body could not be decoded into the expected schema
    #[error("malformed response: {0}")]
    Decode(String),

    /// Body decoded but violates the record ordering/value contract
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid gateway URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// User-facing error category surfaced by the series store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    ServiceFailure,
    NetworkFailure,
    PredictionUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::ServiceFailure => "SERVICE_FAILURE",
            ErrorKind::NetworkFailure => "NETWORK_FAILURE",
            ErrorKind::PredictionUnavailable => "PREDICTION_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorized error with a human-readable message
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ViewError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ViewError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Map a failed history fetch for `symbol` onto the taxonomy
    pub fn from_history_failure(symbol: &str, err: &GatewayError) -> Self {
        match err {
            GatewayError::Transport(detail) => Self::new(
                ErrorKind::NetworkFailure,
                format!("Could not reach the data service: {}", detail),
            ),
            GatewayError::Status { status: 404, .. } | GatewayError::Empty(_) => Self::new(
                ErrorKind::NotFound,
                format!("No data found for {}", symbol),
            ),
            GatewayError::Rejected(message) => Self::new(ErrorKind::NotFound, message.clone()),
            GatewayError::Status { status: 400, message } => Self::new(
                ErrorKind::InvalidRequest,
                format!("Invalid request for {}: {}", symbol, message),
            ),
            GatewayError::Status { status, .. } if *status >= 500 => Self::new(
                ErrorKind::ServiceFailure,
                format!("Data service error (HTTP {}) while loading {}", status, symbol),
            ),
            GatewayError::Status { status, message } => Self::new(
                ErrorKind::ServiceFailure,
                format!("Unexpected HTTP {} while loading {}: {}", status, symbol, message),
            ),
            GatewayError::Decode(detail) | GatewayError::InvalidPayload(detail) => Self::new(
                ErrorKind::ServiceFailure,
                format!("Data service returned an unusable response: {}", detail),
            ),
            GatewayError::Url(e) => Self::new(
                ErrorKind::InvalidRequest,
                format!("Could not build request URL: {}", e),
            ),
        }
    }

    /// Every prediction failure is `PredictionUnavailable`; the cause stays in the message
    pub fn from_prediction_failure(symbol: &str, err: &GatewayError) -> Self {
        let cause = match err {
            GatewayError::Transport(_) => {
                "the prediction service could not be reached".to_string()
            }
            GatewayError::Status { status: 404, .. } => format!("no model data for {}", symbol),
            GatewayError::Status { status: 400, .. } => {
                "the request was rejected as invalid".to_string()
            }
            GatewayError::Status { status, .. } => format!("the service answered HTTP {}", status),
            GatewayError::Rejected(message) => message.clone(),
            other => other.to_string(),
        };
        Self::new(
            ErrorKind::PredictionUnavailable,
            format!("Prediction failed for {}: {}", symbol, cause),
        )
    }
}

pub type Result<T> = std::result::Result<T, ViewError>;
