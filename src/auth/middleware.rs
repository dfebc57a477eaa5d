use std::sync::Arc;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use tracing::warn;
use crate::utils::http::ErrorResponse;
use super::{AuthError, Authenticator};

pub const SIGNATURE_HEADER: &str = "X-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";

pub fn auth_status(error: &AuthError) -> StatusCode {
    if error.is_forbidden() {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::UNAUTHORIZED
    }
}

pub async fn signature_middleware(
    State(auth): State<Arc<Authenticator>>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // no borrow of req may live across next.run
    let verdict = {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
        };
        auth.verify(header(TIMESTAMP_HEADER), header(SIGNATURE_HEADER))
    };

    if let Err(e) = verdict {
        warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        return Err((auth_status(&e), Json(ErrorResponse::new(e.to_string()))));
    }

    Ok(next.run(req).await)
}
