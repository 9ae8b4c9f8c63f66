use std::sync::Arc;

use forwarder_core::DeliverySink;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Per-instance state shared by all handlers. One instance serves exactly one
/// recipient.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no delivery channel is configured; every delivery then
    /// answers 503.
    pub sink: Option<Arc<dyn DeliverySink>>,
    pub recipient: String,
    /// Prefix the webhook routes are mounted under, empty for the root.
    pub base_path: String,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            sink: None,
            recipient: recipient.into(),
            base_path: String::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DeliverySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}
