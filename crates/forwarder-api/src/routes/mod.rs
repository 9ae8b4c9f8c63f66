mod info;
mod message;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub use message::MessageAccepted;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(info::get_info))
        .route("/display", get(info::get_display))
        .route("/message", post(message::post_message))
}

/// Mounts [`router`] under `base_path`. The info route answers both with and
/// without a trailing slash.
pub fn nested(base_path: &str) -> Router<AppState> {
    Router::new()
        .nest(base_path, router())
        .route(&format!("{base_path}/"), get(info::get_info))
}
