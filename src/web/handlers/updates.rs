use axum::{
    extract::{Query, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::updates::{Locale, UpdateInfo, UpdatePolicy, VersionInfo};

pub fn updates_router(policy: Arc<UpdatePolicy>) -> Router {
    Router::new()
        .route("/updates", get(get_updates))
        .route("/version", get(get_version))
        .with_state(policy)
}

#[derive(Debug, Deserialize)]
pub struct UpdatesQuery {
    pub version: Option<String>,
}

pub async fn get_updates(
    State(policy): State<Arc<UpdatePolicy>>,
    Query(query): Query<UpdatesQuery>,
    headers: HeaderMap,
) -> Json<UpdateInfo> {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let locale = Locale::from_accept_language(accept_language);

    let info = policy.check(query.version.as_deref(), locale);
    debug!(
        "Update check from {} ({:?}): needs_update={} force_update={}",
        info.current_version, locale, info.needs_update, info.force_update
    );
    Json(info)
}

pub async fn get_version(State(policy): State<Arc<UpdatePolicy>>) -> Json<VersionInfo> {
    Json(policy.version())
}
