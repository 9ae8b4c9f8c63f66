use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Title used when the sender supplies none.
pub const DEFAULT_TITLE: &str = "Webhook Message";

/// Delivery priority, always within `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 10;

    /// Resolved Grafana alerts.
    pub const LOW_RESOLVED: Priority = Priority(3);
    pub const NORMAL: Priority = Priority(5);
    /// Firing Grafana alerts.
    pub const HIGH_FIRING: Priority = Priority(8);

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// `value` when in range, [`Priority::NORMAL`] otherwise.
    pub fn or_normal(value: i64) -> Self {
        Self::new(value).unwrap_or(Self::NORMAL)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

/// A normalized message ready for delivery.
///
/// The body is never empty and the title falls back to [`DEFAULT_TITLE`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    title: String,
    body: String,
    priority: Priority,
    metadata: Map<String, Value>,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        priority: Priority,
        metadata: Map<String, Value>,
    ) -> Result<Self, ValidationError> {
        let body = body.into();
        if body.is_empty() {
            return Err(ValidationError::MissingField("message"));
        }

        let mut title = title.into();
        if title.is_empty() {
            title = DEFAULT_TITLE.to_string();
        }

        Ok(Self {
            title,
            body,
            priority,
            metadata,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}
