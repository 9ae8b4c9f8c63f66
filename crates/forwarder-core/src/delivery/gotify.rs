use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::{DeliverySink, SinkError};
use crate::notification::Notification;

const TOKEN_HEADER: &str = "X-Gotify-Key";

#[derive(Debug, Error)]
pub enum SinkSetupError {
    #[error("Invalid Gotify URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Gotify URL must use http or https: {0}")]
    UnsupportedScheme(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Delivers notifications to a Gotify server through its application
/// message endpoint.
#[derive(Debug, Clone)]
pub struct GotifySink {
    client: Client,
    endpoint: Url,
    token: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GotifyMessage<'a> {
    title: &'a str,
    message: &'a str,
    priority: u8,
    #[serde(skip_serializing_if = "is_empty")]
    extras: &'a Map<String, Value>,
}

fn is_empty(extras: &&Map<String, Value>) -> bool {
    extras.is_empty()
}

impl GotifySink {
    pub fn new(
        server_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SinkSetupError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Self::with_client(client, server_url, token, timeout)
    }

    pub fn with_client(
        client: Client,
        server_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SinkSetupError> {
        let mut base = Url::parse(server_url)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(SinkSetupError::UnsupportedScheme(server_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("message")?;

        Ok(Self {
            client,
            endpoint,
            token: token.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DeliverySink for GotifySink {
    async fn send(&self, notification: &Notification) -> Result<(), SinkError> {
        let url = self.endpoint.as_str();
        let body = GotifyMessage {
            title: notification.title(),
            message: notification.body(),
            priority: notification.priority().get(),
            extras: notification.metadata(),
        };

        let result = self
            .client
            .post(self.endpoint.clone())
            .header(TOKEN_HEADER, &self.token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                debug!(url, "Gotify accepted message");
                Ok(())
            }
            Ok(resp) => {
                let status = resp.status();
                let message = resp
                    .text()
                    .await
                    .ok()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
                warn!(url, status = status.as_u16(), "Gotify rejected message");
                Err(SinkError::Http {
                    url: url.to_string(),
                    status: status.as_u16(),
                    message,
                })
            }
            Err(e) if e.is_timeout() => {
                warn!(url, "Gotify request timed out");
                Err(SinkError::Timeout {
                    url: url.to_string(),
                })
            }
            Err(e) => {
                warn!(url, error = %e, "Gotify request failed");
                Err(SinkError::Network {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "gotify"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Priority;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notification(extras: Value) -> Notification {
        Notification::new(
            "Disk",
            "Disk usage exceeded 90%",
            Priority::HIGH_FIRING,
            extras.as_object().cloned().unwrap_or_default(),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_keeps_sub_path() {
        let sink = GotifySink::new("https://push.example.com/gotify", "t", Duration::from_secs(1))
            .unwrap();
        assert_eq!(sink.endpoint().as_str(), "https://push.example.com/gotify/message");

        let sink = GotifySink::new("http://localhost:8008/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(sink.endpoint().as_str(), "http://localhost:8008/message");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            GotifySink::new("ftp://example.com", "t", Duration::from_secs(1)),
            Err(SinkSetupError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            GotifySink::new("not a url", "t", Duration::from_secs(1)),
            Err(SinkSetupError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn posts_message_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message"))
            .and(header("X-Gotify-Key", "app-token"))
            .and(body_json(json!({
                "title": "Disk",
                "message": "Disk usage exceeded 90%",
                "priority": 8,
                "extras": { "source": "grafana" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let sink = GotifySink::new(&server.uri(), "app-token", Duration::from_secs(5)).unwrap();
        sink.send(&notification(json!({ "source": "grafana" })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_extras_are_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message"))
            .and(body_json(json!({
                "title": "Disk",
                "message": "Disk usage exceeded 90%",
                "priority": 8,
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = GotifySink::new(&server.uri(), "t", Duration::from_secs(5)).unwrap();
        sink.send(&notification(json!({}))).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_reported_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .expect(1)
            .mount(&server)
            .await;

        let sink = GotifySink::new(&server.uri(), "bad", Duration::from_secs(5)).unwrap();
        let err = sink.send(&notification(json!({}))).await.unwrap_err();
        match err {
            SinkError::Http { status, message, .. } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let sink = GotifySink::new(&server.uri(), "t", Duration::from_millis(50)).unwrap();
        let err = sink.send(&notification(json!({}))).await.unwrap_err();
        assert!(matches!(err, SinkError::Timeout { .. }), "{err}");
    }
}
