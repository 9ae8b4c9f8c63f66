mod dry_run;
mod gotify;

pub use dry_run::LogSink;
pub use gotify::{GotifySink, SinkSetupError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::error::DeliveryError;
use crate::notification::Notification;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    #[error("Request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Downstream channel that hands a [`Notification`] to its recipient.
///
/// The trait is object-safe and Send + Sync so a single sink can be shared by
/// every request handler.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), SinkError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Pass `notification` to `sink` unchanged. Failures are terminal; the
/// webhook sender owns any retry policy.
pub async fn deliver(
    notification: &Notification,
    sink: Option<&dyn DeliverySink>,
) -> Result<(), DeliveryError> {
    let sink = sink.ok_or(DeliveryError::SinkUnavailable)?;

    debug!(sink = sink.name(), title = notification.title(), "Delivering notification");

    sink.send(notification)
        .await
        .map_err(|e| DeliveryError::SendFailed(e.to_string()))
}
