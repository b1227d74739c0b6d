//! Ping Handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::application::SyncStatus;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sync: SyncStatus,
    pub stories: usize,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sync: state.gateway.status(),
        stories: state.gateway.snapshot().len(),
    })
}
