use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::panic_response;
use crate::routes;
use crate::state::AppState;

pub fn build_app(state: AppState) -> Router {
    let router: Router<AppState> = if state.base_path.is_empty() {
        routes::router()
    } else {
        routes::nested(&state.base_path)
    };

    router
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
