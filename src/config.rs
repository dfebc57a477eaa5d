use std::env;
use std::time::Duration;
use anyhow::{Context, Result};

use crate::audio::MAX_AUDIO_SIZE;
use crate::keys::{ApiKey, DEFAULT_PERMITS_PER_KEY};
use crate::transcribe::gemini::{
    GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_TIMEOUT_SECS,
};
use crate::updates::service::{
    UpdatePolicy, DEFAULT_DOWNLOAD_URL, DEFAULT_LATEST_VERSION, DEFAULT_MIN_SUPPORTED_VERSION,
};

pub const DEFAULT_SECRET_KEY: &str = "change-this-secret-key";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct Settings {
    pub secret_key: String,
    pub api_keys: Vec<ApiKey>,
    pub gemini: GeminiConfig,
    pub permits_per_key: usize,
    pub max_audio_size: usize,
    pub host: String,
    pub port: u16,
    pub log_dir: String,
    pub updates: UpdatePolicy,
}

impl Settings {
    /// Process environment first, `.env` second.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).or_else(|_| dotenv::var(name)).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            secret_key: text("V2T_SECRET_KEY", DEFAULT_SECRET_KEY),
            api_keys: ApiKey::parse_list(&text("GEMINI_API_KEYS", "")),
            gemini: GeminiConfig {
                base_url: text("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
                model: text("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                timeout: Duration::from_secs(number(&lookup, "GEMINI_TIMEOUT_SECS", DEFAULT_GEMINI_TIMEOUT_SECS)?),
            },
            permits_per_key: number(&lookup, "PER_KEY_CONCURRENCY", DEFAULT_PERMITS_PER_KEY)?,
            max_audio_size: number(&lookup, "MAX_AUDIO_SIZE", MAX_AUDIO_SIZE)?,
            host: text("SERVER_HOST", DEFAULT_HOST),
            port: number(&lookup, "SERVER_PORT", DEFAULT_PORT)?,
            log_dir: text("LOG_DIR", DEFAULT_LOG_DIR),
            updates: UpdatePolicy {
                latest_version: text("LATEST_VERSION", DEFAULT_LATEST_VERSION),
                min_supported_version: text("MIN_SUPPORTED_VERSION", DEFAULT_MIN_SUPPORTED_VERSION),
                force_update: lookup("FORCE_UPDATE").map(|v| flag(&v)).unwrap_or(false),
                download_url: text("DOWNLOAD_URL", DEFAULT_DOWNLOAD_URL),
            },
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn number<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", name, raw)),
        None => Ok(default),
    }
}

fn flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
