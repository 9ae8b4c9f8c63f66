use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use forwarder_core::info::FEATURES;
use forwarder_core::FORWARDER_INFO;

use crate::state::AppState;

/// GET /
pub async fn get_info(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Json<Value> {
    let info_path = uri.path();
    let message_path = format!("{}/message", info_path.trim_end_matches('/'));
    let host = host(&headers).unwrap_or_default();

    Json(json!({
        "plugin": FORWARDER_INFO.name,
        "version": FORWARDER_INFO.version,
        "user": state.recipient,
        "features": FEATURES,
        "endpoints": {
            "send_message": {
                "method": "POST",
                "path": message_path,
                "description": "Send a message to this recipient. Supports both generic webhooks and Grafana alerts.",
                "generic_payload": {
                    "title": "string (optional, defaults to 'Webhook Message')",
                    "message": "string (required)",
                    "priority": "int (optional, 1-10, default: 5)",
                    "extras": "object (optional, custom data)",
                },
                "grafana_support": "Automatically detected when 'alerts' field is present. Priority auto-assigned: firing=8, resolved=3",
                "example_generic": {
                    "title": "System Alert",
                    "message": "Disk usage exceeded 90%",
                    "priority": 8,
                },
                "example_curl": format!(
                    "curl -X POST {}{} -H 'Content-Type: application/json' -d '{{\"message\":\"Test alert\",\"priority\":5}}'",
                    host, message_path
                ),
            },
            "info": {
                "method": "GET",
                "path": info_path,
                "description": "Get this forwarder's information and usage examples",
            },
        },
    }))
}

/// GET /display
///
/// Operator instructions with the absolute webhook URL as seen by the caller.
pub async fn get_display(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let base_url = match host(&headers) {
        Some(host) => format!("{}://{}", scheme(&headers), host),
        None => String::new(),
    };
    let path = uri.path().strip_suffix("/display").unwrap_or_default();
    let endpoint = format!("{}{}/message", base_url, path);

    (
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_display(&endpoint, &state.recipient),
    )
}

fn host(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
}

fn scheme(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|p| *p == "http" || *p == "https")
        .unwrap_or("http")
}

fn render_display(endpoint: &str, recipient: &str) -> String {
    format!(
        r#"# {name}

## Webhook Endpoint
POST {endpoint}

## Usage

### Generic Webhooks
Send a JSON payload with the message content:

```bash
curl -X POST {endpoint} \
  -H "Content-Type: application/json" \
  -d '{{
    "title": "Alert Title",
    "message": "Your message here",
    "priority": 5
  }}'
```

### Grafana Integration
1. In Grafana, go to Alerting > Contact Points
2. Add a new contact point with type "webhook"
3. Set URL to: {endpoint}
4. Set method to POST
5. Save the configuration

Grafana alerts are detected automatically and formatted with a priority matching their state.

## Supported Fields

| Field | Required | Default | Description |
|-------|----------|---------|-------------|
| message | Yes | - | Message content |
| title | No | "Webhook Message" | Message title |
| priority | No | 5 | Priority level (1-10) |
| extras | No | {{}} | Custom data |

## Priority Levels
- 1-2: Low
- 3-5: Normal (resolved alerts get 3)
- 6-8: High (firing alerts get 8)
- 9-10: Critical

Active user: {recipient}"#,
        name = FORWARDER_INFO.name,
        endpoint = endpoint,
        recipient = recipient,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn scheme_honors_forwarded_proto() {
        let mut headers = HeaderMap::new();
        assert_eq!(scheme(&headers), "http");
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(scheme(&headers), "https");
        headers.insert("x-forwarded-proto", HeaderValue::from_static("gopher"));
        assert_eq!(scheme(&headers), "http");
    }

    #[test]
    fn display_mentions_endpoint_and_recipient() {
        let page = render_display("https://hooks.example.com/alice/message", "alice");
        assert!(page.contains("POST https://hooks.example.com/alice/message"));
        assert!(page.contains("Active user: alice"));
        assert!(page.contains("| extras | No | {} | Custom data |"));
    }
}
