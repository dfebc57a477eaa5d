use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use crate::AppContext;

pub mod health;
pub mod updates;
pub mod v2t;

pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", updates::updates_router(ctx.updates.clone()))
        .merge(v2t::v2t_router(ctx.clone()))
        .merge(health::health_router(ctx))
        .layer(cors)
}
