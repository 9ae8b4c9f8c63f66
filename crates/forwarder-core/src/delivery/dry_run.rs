use async_trait::async_trait;
use tracing::info;

use super::{DeliverySink, SinkError};
use crate::notification::Notification;

/// Dry-run sink: records each notification as a log event and reports success.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl DeliverySink for LogSink {
    async fn send(&self, notification: &Notification) -> Result<(), SinkError> {
        let metadata = serde_json::Value::Object(notification.metadata().clone());
        info!(
            title = notification.title(),
            body = notification.body(),
            priority = notification.priority().get(),
            %metadata,
            "Notification (dry run)"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
