use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

/// Opaque upstream credential.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Form safe to put into logs: first four characters, rest hidden.
    /// Keys of four characters or fewer are hidden entirely.
    pub fn masked(&self) -> String {
        if self.0.chars().count() <= 4 {
            return "****".to_string();
        }
        let prefix: String = self.0.chars().take(4).collect();
        format!("{}****", prefix)
    }

    /// Parses a comma separated list, trimming entries and dropping empty ones.
    pub fn parse_list(raw: &str) -> Vec<ApiKey> {
        raw.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(ApiKey::new)
            .collect()
    }
}

impl Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

/// Load accounting for one key inside the current window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyUsageRecord {
    pub count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

impl KeyUsageRecord {
    pub fn is_stale(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        match self.last_used {
            Some(last_used) => now - last_used > window,
            None => true,
        }
    }

    pub fn record(&mut self, now: DateTime<Utc>) {
        self.count += 1;
        self.last_used = Some(now);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyUsageReport {
    pub key: String,
    pub count: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub in_flight: usize,
}
