use std::any::Any;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use forwarder_core::{DeliveryError, Dialect, ValidationError};

const INTERNAL_ERROR: &str = "Internal server error occurred while processing webhook";
const INTERNAL_DETAILS: &str = "Unexpected error while processing webhook";

/// Every failure a handler can report. Converted into a JSON
/// `{"error", "details"?}` body at the boundary.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        error: String,
        details: Option<String>,
    },
    SendFailed {
        error: String,
        details: String,
    },
    Unavailable(String),
    /// Unanticipated failure. Never exposes its cause.
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::BadRequest {
            error: error.into(),
            details: None,
        }
    }

    pub fn bad_request_with(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::BadRequest {
            error: error.into(),
            details: Some(details.into()),
        }
    }

    /// Map a delivery failure, naming the dialect that was being forwarded.
    pub fn from_delivery(err: DeliveryError, dialect: Dialect) -> Self {
        match err {
            DeliveryError::SinkUnavailable => Self::Unavailable(err.to_string()),
            DeliveryError::SendFailed(reason) => Self::SendFailed {
                error: match dialect {
                    Dialect::Generic => "Failed to forward message".into(),
                    Dialect::Grafana => "Failed to forward Grafana alert".into(),
                },
                details: reason,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::SendFailed { .. } | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn parts(&self) -> (&str, Option<&str>) {
        match self {
            Self::BadRequest { error, details } => (error.as_str(), details.as_deref()),
            Self::SendFailed { error, details } => (error.as_str(), Some(details.as_str())),
            Self::Unavailable(error) => (error.as_str(), None),
            Self::Internal => (INTERNAL_ERROR, Some(INTERNAL_DETAILS)),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts() {
            (error, Some(details)) => write!(f, "{}: {}", error, details),
            (error, None) => f.write_str(error),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidJson(reason) => {
                Self::bad_request_with("Invalid JSON payload", reason)
            }
            ValidationError::EmptyBody => Self::bad_request("Empty request body"),
            ValidationError::MalformedPayload => Self::bad_request("Payload must be a JSON object"),
            ValidationError::MissingField(field) => {
                Self::bad_request(format!("{} field is required", capitalize(field)))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error, details) = self.parts();
        let body = ErrorBody { error, details };
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Response for a panicking handler, installed through `CatchPanicLayer`.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked while processing webhook");
    ApiError::Internal.into_response()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
