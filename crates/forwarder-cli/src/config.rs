//! TOML configuration file schema and parsing.
//!
//! Example config file:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//! log_format = "json"
//! base_path = "/hooks/alice"
//!
//! [recipient]
//! name = "alice"
//!
//! [gotify]
//! url = "https://gotify.example.com"
//! token = "AbCdEf123"
//! timeout_ms = 5000
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use forwarder_api::state::DEFAULT_MAX_BODY_BYTES;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub recipient: RecipientConfig,

    /// Delivery target. Without it, and without `--dry-run`, every webhook
    /// is answered with 503.
    #[serde(default)]
    pub gotify: Option<GotifyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub base_path: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            log_format: default_log_format(),
            base_path: String::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

pub fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_log_format() -> String {
    "pretty".into()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipientConfig {
    #[serde(default = "default_recipient")]
    pub name: String,
}

impl Default for RecipientConfig {
    fn default() -> Self {
        Self {
            name: default_recipient(),
        }
    }
}

fn default_recipient() -> String {
    "default".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GotifyConfig {
    pub url: String,
    pub token: String,

    #[serde(default = "default_gotify_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_gotify_timeout_ms() -> u64 {
    5000
}

impl GotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        match self.server.log_format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "Invalid log_format '{}': must be 'pretty' or 'json'",
                    other
                ));
            }
        }

        let base = &self.server.base_path;
        if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
            return Err(format!(
                "Invalid base_path '{}': must start with '/' and must not end with '/'",
                base
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err("max_body_bytes must be greater than zero".into());
        }

        if self.recipient.name.trim().is_empty() {
            return Err("Recipient name must not be empty".into());
        }

        if let Some(gotify) = &self.gotify {
            let parsed = url::Url::parse(&gotify.url)
                .map_err(|e| format!("Invalid Gotify URL: {} ({})", gotify.url, e))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(format!("Gotify URL must use http or https: {}", gotify.url));
            }
            if gotify.token.is_empty() {
                return Err("Gotify token must not be empty".into());
            }
            if gotify.timeout_ms == 0 {
                return Err("Gotify timeout_ms must be greater than zero".into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.server.log_format, "pretty");
        assert!(config.server.base_path.is_empty());
        assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.recipient.name, "default");
        assert!(config.gotify.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[server]
listen = "127.0.0.1:9090"
log_format = "json"
base_path = "/hooks/alice"
max_body_bytes = 4096

[recipient]
name = "alice"

[gotify]
url = "https://gotify.example.com"
token = "AbCdEf123"
timeout_ms = 2500
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.server.listen.port(), 9090);
        assert_eq!(config.server.log_format, "json");
        assert_eq!(config.server.base_path, "/hooks/alice");
        assert_eq!(config.server.max_body_bytes, 4096);
        assert_eq!(config.recipient.name, "alice");

        let gotify = config.gotify.unwrap();
        assert_eq!(gotify.url, "https://gotify.example.com");
        assert_eq!(gotify.token, "AbCdEf123");
        assert_eq!(gotify.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn gotify_timeout_defaults() {
        let toml = r#"
[gotify]
url = "http://localhost:8008"
token = "t"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.gotify.unwrap().timeout_ms, 5000);
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let config: AppConfig = toml::from_str("[server]\nlog_format = \"xml\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_format"), "{}", err);
    }

    #[test]
    fn validate_rejects_bad_base_path() {
        for path in ["hooks", "/hooks/"] {
            let config: AppConfig =
                toml::from_str(&format!("[server]\nbase_path = \"{}\"\n", path)).unwrap();
            let err = config.validate().unwrap_err();
            assert!(err.contains("Invalid base_path"), "{}", err);
        }
    }

    #[test]
    fn validate_rejects_invalid_gotify_url() {
        let toml = r#"
[gotify]
url = "not-valid"
token = "t"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid Gotify URL"), "{}", err);
    }

    #[test]
    fn validate_rejects_empty_token() {
        let toml = r#"
[gotify]
url = "https://gotify.example.com"
token = ""
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("token"), "{}", err);
    }

    #[test]
    fn missing_token_fails_to_parse() {
        let toml = r#"
[gotify]
url = "https://gotify.example.com"
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }
}
