use thiserror::Error;

/// Why an inbound payload could not be turned into a [`Notification`].
///
/// [`Notification`]: crate::Notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body is not valid JSON at all.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),
    /// The body decoded to JSON `null`.
    #[error("Empty request body")]
    EmptyBody,
    /// The body is valid JSON but not an object.
    #[error("Payload must be a JSON object")]
    MalformedPayload,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// No delivery channel is configured for this instance.
    #[error("Delivery sink not available")]
    SinkUnavailable,
    #[error("Delivery failed: {0}")]
    SendFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_the_field() {
        let e = ValidationError::MissingField("message");
        assert_eq!(e.to_string(), "Missing required field: message");
    }

    #[test]
    fn send_failed_carries_reason() {
        let e = DeliveryError::SendFailed("HTTP 401".into());
        assert!(e.to_string().contains("HTTP 401"));
    }
}
