//! Webhook dialect detection and normalization.
//!
//! Two dialects are understood. A payload carrying an `alerts` key, whatever
//! its value, is treated as a Grafana alert notification; everything else is
//! a generic `{title, message, priority, extras}` message.

use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationError;
use crate::notification::{Notification, Priority};
use crate::payload::{
    int_in_range_or_default, non_empty_string, object_or_empty, string_or_default, RawPayload,
};

const GRAFANA_DEFAULT_TITLE: &str = "Grafana Alert";
const GRAFANA_DEFAULT_BODY: &str = "Alert notification from Grafana";

/// Grafana keys copied verbatim into metadata when present and non-empty.
const GRAFANA_URL_KEYS: [&str; 3] = ["externalURL", "dashboardURL", "silenceURL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Generic,
    Grafana,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::Grafana => "grafana",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(raw: &RawPayload) -> Dialect {
    if raw.contains_key("alerts") {
        Dialect::Grafana
    } else {
        Dialect::Generic
    }
}

/// Classify `raw` and normalize it with the matching dialect.
pub fn normalize(raw: &RawPayload) -> Result<Notification, ValidationError> {
    normalize_as(classify(raw), raw)
}

pub fn normalize_as(dialect: Dialect, raw: &RawPayload) -> Result<Notification, ValidationError> {
    match dialect {
        Dialect::Generic => normalize_generic(raw),
        Dialect::Grafana => normalize_grafana(raw),
    }
}

fn normalize_generic(raw: &RawPayload) -> Result<Notification, ValidationError> {
    let body = non_empty_string(raw, "message").ok_or(ValidationError::MissingField("message"))?;
    let title = string_or_default(raw, "title", "");
    let priority = Priority::or_normal(int_in_range_or_default(
        raw,
        "priority",
        Priority::MIN..=Priority::MAX,
        Priority::NORMAL.get().into(),
    ));
    let extras = object_or_empty(raw, "extras");

    debug!(priority = %priority, extras = extras.len(), "Normalized generic webhook");

    Notification::new(title, body, priority, extras)
}

fn normalize_grafana(raw: &RawPayload) -> Result<Notification, ValidationError> {
    let title = string_or_default(raw, "title", "");
    let body = string_or_default(raw, "message", "");
    let status = string_or_default(raw, "status", "");
    let state = string_or_default(raw, "state", "");

    let priority = grafana_priority(&status, &state);

    let title = if !title.is_empty() {
        title
    } else if !status.is_empty() {
        format!("{}: {}", GRAFANA_DEFAULT_TITLE, status)
    } else {
        GRAFANA_DEFAULT_TITLE.to_string()
    };

    let body = if body.is_empty() {
        GRAFANA_DEFAULT_BODY.to_string()
    } else {
        body
    };

    let mut metadata = Map::new();
    metadata.insert("source".into(), Value::from("grafana"));
    if !status.is_empty() {
        metadata.insert("status".into(), Value::from(status.as_str()));
    }
    if !state.is_empty() {
        metadata.insert("state".into(), Value::from(state.as_str()));
    }
    for key in GRAFANA_URL_KEYS {
        if let Some(url) = non_empty_string(raw, key) {
            metadata.insert(key.into(), Value::from(url));
        }
    }

    debug!(%status, %state, priority = %priority, "Normalized Grafana alert");

    Notification::new(title, body, priority, metadata)
}

/// Firing/alerting wins over resolved/ok; anything else is normal.
fn grafana_priority(status: &str, state: &str) -> Priority {
    if status == "firing" || state == "alerting" {
        Priority::HIGH_FIRING
    } else if status == "resolved" || state == "ok" {
        Priority::LOW_RESOLVED
    } else {
        Priority::NORMAL
    }
}
