use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AppContext, GIT_HASH};

pub fn health_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(ctx)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub api_keys_count: usize,
    pub version: String,
}

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        api_keys_count: ctx.api_keys_count(),
        version: GIT_HASH.trim().to_string(),
    })
}
