mod config;

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{fmt, EnvFilter};

use forwarder_api::state::AppState;
use forwarder_core::{
    classify, decode_payload, normalize_as, DeliverySink, Dialect, GotifySink, LogSink,
    Notification, FORWARDER_INFO,
};

use crate::config::AppConfig;

fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_REVISION: &str = env!("GIT_REVISION");

    if GIT_REVISION.is_empty() {
        VERSION
    } else {
        // Called once; the string lives for the rest of the process.
        Box::leak(format!("{VERSION} ({GIT_REVISION})").into_boxed_str())
    }
}

/// Webhook forwarder: turns generic and Grafana webhooks into notifications.
#[derive(Parser)]
#[command(name = "webhook-forwarder", version = version_string(), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook HTTP server.
    Serve {
        /// Listen address (e.g. 0.0.0.0:8080). Overrides config file.
        #[arg(short, long)]
        listen: Option<SocketAddr>,

        /// Path to TOML config file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log notifications instead of delivering them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Normalize a payload and print the resulting notification without
    /// delivering it.
    Check {
        /// JSON payload file. Reads stdin when omitted.
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            config,
            dry_run,
        } => {
            run_serve(listen, config, dry_run).await;
        }
        Commands::Check { file } => {
            fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .init();
            if !run_check(file) {
                std::process::exit(1);
            }
        }
    }
}

async fn run_serve(listen_override: Option<SocketAddr>, config_path: Option<PathBuf>, dry_run: bool) {
    let app_config = match config_path {
        Some(ref path) => match AppConfig::load(path) {
            Ok(c) => {
                init_tracing(&c.server.log_format);
                tracing::info!(path = %path.display(), "Loaded config file");
                c
            }
            Err(e) => {
                init_tracing("pretty");
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            init_tracing("pretty");
            AppConfig::default()
        }
    };

    let listen = listen_override.unwrap_or(app_config.server.listen);

    let sink: Option<Arc<dyn DeliverySink>> = if dry_run {
        tracing::info!("Dry run: notifications will be logged, not delivered");
        Some(Arc::new(LogSink))
    } else if let Some(ref gotify) = app_config.gotify {
        match GotifySink::new(&gotify.url, gotify.token.clone(), gotify.timeout()) {
            Ok(sink) => {
                tracing::info!(endpoint = %sink.endpoint(), "Gotify delivery configured");
                Some(Arc::new(sink))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to configure Gotify delivery");
                std::process::exit(1);
            }
        }
    } else {
        tracing::warn!("No delivery sink configured; webhooks will be answered with 503");
        None
    };

    let mut state = AppState::new(app_config.recipient.name.clone())
        .with_base_path(app_config.server.base_path.clone())
        .with_max_body_bytes(app_config.server.max_body_bytes);
    if let Some(sink) = sink {
        state = state.with_sink(sink);
    }

    tracing::info!(
        %listen,
        recipient = %app_config.recipient.name,
        base_path = %app_config.server.base_path,
        version = FORWARDER_INFO.version,
        "Starting webhook forwarder"
    );
    if let Err(e) =
        forwarder_api::serve_with_state(listen, state, forwarder_api::shutdown_signal()).await
    {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}

/// Returns false when the payload cannot be read or normalized.
fn run_check(file: Option<PathBuf>) -> bool {
    let bytes = match read_payload(file.as_ref()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            return false;
        }
    };

    match inspect(&bytes) {
        Ok((dialect, notification)) => {
            for line in render_notification(&notification, dialect) {
                println!("{}", line);
            }
            true
        }
        Err(e) => {
            eprintln!("{} {}", style("invalid:").red().bold(), e);
            false
        }
    }
}

fn read_payload(file: Option<&PathBuf>) -> Result<Vec<u8>, String> {
    match file {
        Some(path) => std::fs::read(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn inspect(bytes: &[u8]) -> Result<(Dialect, Notification), String> {
    let raw = decode_payload(bytes).map_err(|e| e.to_string())?;
    let dialect = classify(&raw);
    let notification =
        normalize_as(dialect, &raw).map_err(|e| format!("{} payload: {}", dialect, e))?;
    Ok((dialect, notification))
}

fn render_notification(notification: &Notification, dialect: Dialect) -> Vec<String> {
    let priority = notification.priority();
    let styled_priority = match priority.get() {
        8..=10 => style(priority.to_string()).red().bold(),
        6..=7 => style(priority.to_string()).yellow(),
        _ => style(priority.to_string()).green(),
    };

    let mut lines = vec![
        format!("{} {}", style("dialect: ").dim(), style(dialect).bold()),
        format!("{} {}", style("title:   ").dim(), style(notification.title()).bold()),
        format!("{} {}", style("priority:").dim(), styled_priority),
        format!("{} {}", style("body:    ").dim(), notification.body()),
    ];

    if notification.metadata().is_empty() {
        if dialect == Dialect::Generic {
            lines.push(format!("{} {}", style("extras:  ").dim(), style("(none)").dim()));
        }
        return lines;
    }

    let metadata = serde_json::Value::Object(notification.metadata().clone());
    let pretty = serde_json::to_string_pretty(&metadata).unwrap_or_else(|_| metadata.to_string());
    lines.push(style("extras:").dim().to_string());
    lines.extend(pretty.lines().map(|line| format!("  {}", line)));
    lines
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        "json" => {
            fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt().with_env_filter(filter).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(payload: &str) -> String {
        let (dialect, notification) = inspect(payload.as_bytes()).unwrap();
        console::strip_ansi_codes(&render_notification(&notification, dialect).join("\n"))
            .into_owned()
    }

    #[test]
    fn inspect_rejects_unusable_payloads() {
        assert!(inspect(b"not json").unwrap_err().contains("Invalid JSON payload"));
        assert_eq!(inspect(b"[1, 2]").unwrap_err(), "Payload must be a JSON object");
        assert_eq!(inspect(b"null").unwrap_err(), "Empty request body");

        let err = inspect(b"{}").unwrap_err();
        assert!(err.starts_with("generic payload"), "{}", err);
        assert!(err.contains("message"), "{}", err);
    }

    #[test]
    fn check_fails_for_unreadable_file() {
        let missing = std::env::temp_dir().join("webhook-forwarder-no-such-payload.json");
        assert!(!run_check(Some(missing)));
    }

    #[test]
    fn generic_without_extras_says_none() {
        let out = rendered(r#"{"message":"disk full"}"#);
        assert!(out.contains("dialect:  generic"), "{}", out);
        assert!(out.contains("title:    Webhook Message"), "{}", out);
        assert!(out.contains("priority: 5"), "{}", out);
        assert!(out.contains("body:     disk full"), "{}", out);
        assert!(out.contains("extras:   (none)"), "{}", out);
    }

    #[test]
    fn generic_extras_are_pretty_printed() {
        let out = rendered(r#"{"message":"m","priority":9,"extras":{"host":"db1"}}"#);
        assert!(out.contains("priority: 9"), "{}", out);
        assert!(!out.contains("(none)"), "{}", out);
        assert!(out.contains("  \"host\": \"db1\""), "{}", out);
    }

    #[test]
    fn grafana_metadata_is_listed() {
        let out = rendered(r#"{"alerts":[],"status":"firing","title":"CPU high"}"#);
        assert!(out.contains("dialect:  grafana"), "{}", out);
        assert!(out.contains("title:    CPU high"), "{}", out);
        assert!(out.contains("priority: 8"), "{}", out);
        assert!(out.contains("\"status\": \"firing\""), "{}", out);
    }
}
