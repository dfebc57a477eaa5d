use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::audio::AudioPayload;
use crate::auth::signature_middleware;
use crate::utils::http::error_response;
use crate::AppContext;

pub const AUDIO_FIELD: &str = "audio";

/// Room for multipart boundaries and part headers on top of the audio itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn v2t_router(ctx: Arc<AppContext>) -> Router {
    let body_limit = ctx.max_audio_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/v2t", post(voice_to_text))
        .route_layer(middleware::from_fn_with_state(
            ctx.authenticator.clone(),
            signature_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(ctx)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
}

pub async fn voice_to_text(
    State(ctx): State<Arc<AppContext>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!("[{}] Not a multipart upload: {}", request_id, e);
            return error_response(StatusCode::BAD_REQUEST, "No audio file");
        }
    };

    let audio = match read_audio(&mut multipart, ctx.max_audio_size, &request_id).await {
        Ok(audio) => audio,
        Err(response) => return response,
    };

    info!("[{}] Processing {} ({} bytes)", request_id, audio.filename, audio.len());

    match ctx.dispatcher.dispatch(&request_id, &audio).await {
        Ok(transcript) => {
            (StatusCode::OK, Json(TranscribeResponse { text: transcript.text })).into_response()
        }
        Err(e) => {
            error!("[{}] {}", request_id, e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable")
        }
    }
}

async fn read_audio(
    multipart: &mut Multipart,
    limit: usize,
    request_id: &str,
) -> Result<AudioPayload, Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, request_id))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| upload_error(e, request_id))?;

        return AudioPayload::new(data.to_vec(), filename.as_deref(), content_type.as_deref(), limit)
            .map_err(|e| {
                warn!("[{}] {}", request_id, e);
                error_response(StatusCode::PAYLOAD_TOO_LARGE, "Audio too large")
            });
    }

    Err(error_response(StatusCode::BAD_REQUEST, "No audio file"))
}

fn upload_error(e: MultipartError, request_id: &str) -> Response {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("[{}] Upload exceeds body limit", request_id);
        return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Audio too large");
    }
    error!("[{}] Error: {}", request_id, e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed")
}
