use serde::Serialize;

/// Descriptive metadata for this forwarder, reported by the info endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForwarderInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub website: &'static str,
    pub description: &'static str,
    pub license: &'static str,
    pub module_path: &'static str,
}

pub const FORWARDER_INFO: ForwarderInfo = ForwarderInfo {
    name: "Webhook Forwarder",
    version: env!("CARGO_PKG_VERSION"),
    author: "Webhook Forwarder Contributors",
    website: "https://github.com/gotify/webhook-forwarder",
    description: "Receives webhook messages from external services and forwards them as \
                  notifications. Automatically detects and formats Grafana alerts with \
                  priority assignment based on alert state.",
    license: "MIT",
    module_path: "github.com/gotify/webhook-forwarder",
};

/// Capabilities advertised by the info endpoint.
pub const FEATURES: [&str; 4] = [
    "Generic webhook support",
    "Grafana webhook auto-detection",
    "Smart priority assignment",
    "URL preservation for Grafana alerts",
];
