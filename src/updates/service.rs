use serde::{Deserialize, Serialize};

use super::locale::Locale;
use super::version::is_lower;

pub const DEFAULT_LATEST_VERSION: &str = "0.2.1";
pub const DEFAULT_MIN_SUPPORTED_VERSION: &str = "0.1.0";
pub const DEFAULT_DOWNLOAD_URL: &str = "https://github.com/your-repo/releases/latest";
pub const UNKNOWN_CLIENT_VERSION: &str = "0.0.0";

/// Release thresholds the update endpoint compares clients against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePolicy {
    pub latest_version: String,
    pub min_supported_version: String,
    pub force_update: bool,
    pub download_url: String,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            latest_version: DEFAULT_LATEST_VERSION.to_string(),
            min_supported_version: DEFAULT_MIN_SUPPORTED_VERSION.to_string(),
            force_update: false,
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub latest_version: String,
    pub current_version: String,
    pub download_url: String,
    pub force_update: bool,
    pub min_supported_version: String,
    pub needs_update: bool,
    pub release_notes: String,
    pub update_title: String,
    pub force_update_title: String,
    pub force_update_message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionInfo {
    pub latest_version: String,
    pub min_supported_version: String,
}

impl UpdatePolicy {
    pub fn check(&self, current_version: Option<&str>, locale: Locale) -> UpdateInfo {
        let current_version = current_version.unwrap_or(UNKNOWN_CLIENT_VERSION);
        let texts = locale.texts();

        // the global switch forces everyone, the floor only clients below it
        let below_floor = is_lower(current_version, &self.min_supported_version);

        UpdateInfo {
            latest_version: self.latest_version.clone(),
            current_version: current_version.to_string(),
            download_url: self.download_url.clone(),
            force_update: below_floor || self.force_update,
            min_supported_version: self.min_supported_version.clone(),
            needs_update: is_lower(current_version, &self.latest_version),
            release_notes: texts.release_notes.to_string(),
            update_title: texts.update_title.to_string(),
            force_update_title: texts.force_update_title.to_string(),
            force_update_message: texts.force_update_message.to_string(),
        }
    }

    pub fn version(&self) -> VersionInfo {
        VersionInfo {
            latest_version: self.latest_version.clone(),
            min_supported_version: self.min_supported_version.clone(),
        }
    }
}
