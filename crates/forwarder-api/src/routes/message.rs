use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Serialize;
use tracing::{field, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use forwarder_core::{classify, decode_payload, deliver, normalize_as, Dialect};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageAccepted {
    pub success: bool,
    pub message: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub dialect: Option<&'static str>,
}

impl MessageAccepted {
    fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Generic => Self {
                success: true,
                message: "Message forwarded successfully",
                dialect: None,
            },
            Dialect::Grafana => Self {
                success: true,
                message: "Grafana alert forwarded successfully",
                dialect: Some(dialect.as_str()),
            },
        }
    }
}

/// POST /message
pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageAccepted>, ApiError> {
    let span = info_span!("webhook", request_id = %Uuid::new_v4(), dialect = field::Empty);

    async move {
        let result = forward(&state, &headers, body).await;
        match &result {
            Ok(accepted) => info!(
                recipient = %state.recipient,
                dialect = accepted.dialect.unwrap_or("generic"),
                "Webhook forwarded"
            ),
            Err(e) => warn!(status = e.status().as_u16(), error = %e, "Webhook rejected"),
        }
        result.map(Json)
    }
    .instrument(span)
    .await
}

async fn forward(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<MessageAccepted, ApiError> {
    check_content_type(headers)?;

    let bytes = body.map_err(|e| ApiError::bad_request_with("Invalid request body", e.body_text()))?;
    let raw = decode_payload(&bytes)?;

    let dialect = classify(&raw);
    Span::current().record("dialect", dialect.as_str());

    let notification = normalize_as(dialect, &raw)?;

    deliver(&notification, state.sink.as_deref())
        .await
        .map_err(|e| ApiError::from_delivery(e, dialect))?;

    Ok(MessageAccepted::for_dialect(dialect))
}

/// An absent or empty Content-Type is tolerated; anything but exactly
/// `application/json` is not.
fn check_content_type(headers: &HeaderMap) -> Result<(), ApiError> {
    match headers.get(header::CONTENT_TYPE) {
        None => Ok(()),
        Some(v) if v.is_empty() => Ok(()),
        Some(v) if v.as_bytes() == b"application/json" => Ok(()),
        Some(_) => Err(ApiError::bad_request("Content-Type must be application/json")),
    }
}
