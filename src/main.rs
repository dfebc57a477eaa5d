#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use tracing::{info, warn};
use std::sync::Arc;
use quikx_rs::{
    config::Settings, transcribe::GeminiTranscriber, utils::logger, AppContext, GIT_HASH,
};

#[tokio::main]
async fn main() -> Result<()> {
    quikx_rs::init_env();
    let settings = Settings::from_env()?;

    // 初始化日志系统
    let _guard = logger::init(settings.log_dir.clone())?;
    info!("Starting quikx service ({})...", GIT_HASH.trim());

    if settings.uses_default_secret() {
        warn!("V2T_SECRET_KEY is not set, using the built-in default secret");
    }

    // 初始化 Gemini 客户端
    info!("Initializing transcription client (model {})...", settings.gemini.model);
    let engine = GeminiTranscriber::new(settings.gemini.clone())?;

    let ctx = match AppContext::new(&settings, Arc::new(engine)) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            tracing::error!("{}. Set the GEMINI_API_KEYS environment variable.", e);
            return Err(e.into());
        }
    };
    info!(
        "Loaded {} API keys, {} concurrent calls per key",
        ctx.api_keys_count(),
        settings.permits_per_key
    );

    let addr = settings.bind_addr();
    info!("Starting HTTP server at http://{}", addr);

    match quikx_rs::web::start_server(ctx, &addr).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            tracing::error!("Server error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
