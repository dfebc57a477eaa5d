use anyhow::Result;
use async_trait::async_trait;

use crate::keys::ApiKey;

pub mod dispatcher;
pub mod gemini;

pub use dispatcher::{AttemptOutcome, DispatchError, Dispatcher, Transcript};
pub use gemini::{GeminiConfig, GeminiTranscriber};

pub const TRANSCRIBE_PROMPT: &str =
    "Transcribe this audio to text. Return only the transcribed text without any additional comments.";

/// The external speech-to-text call, made with one specific upstream key.
///
/// Any error is treated the same way by the dispatcher: the attempt is logged
/// and the next key is tried.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, key: &ApiKey, audio: &[u8], mime_type: &str) -> Result<String>;
}
