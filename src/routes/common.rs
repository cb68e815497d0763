//! Liveness, readiness and build info, mounted at the root.

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<&'static str>,
}

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
}

const BUILD_INFO: BuildInfo = BuildInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

async fn live() -> Json<Probe> {
    Json(Probe { status: "ok", store: None })
}

/// 200 when the list store answers a ping, 503 "degraded" otherwise.
async fn ready(State(state): State<AppState>) -> Response {
    match state.lists.store().ping().await {
        Ok(()) => Json(Probe { status: "ok", store: Some("ok") }).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "list store not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Probe {
                    status: "degraded",
                    store: Some("unavailable"),
                }),
            )
                .into_response()
        }
    }
}

async fn build_info() -> Json<BuildInfo> {
    Json(BUILD_INFO)
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(live))
        .route("/ready", get(ready))
        .route("/version", get(build_info))
        .with_state(state)
}
