//! Route tables and the assembled application router.

mod common;
mod lists;

pub use common::common_routes;
pub use lists::list_routes;

use crate::settings::Settings;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Common routes at the root, list routes under `settings.api_prefix`, with
/// request tracing and a body size limit.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let lists = list_routes(state.clone());
    let api = if settings.api_prefix.is_empty() {
        lists
    } else {
        Router::new().nest(&settings.api_prefix, lists)
    };

    Router::new()
        .merge(common_routes(state))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(settings.body_limit_bytes)),
        )
}
