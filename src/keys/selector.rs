use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::error::KeyError;
use super::types::{ApiKey, KeyUsageRecord, KeyUsageReport};

pub const DEFAULT_PERMITS_PER_KEY: usize = 5;
pub const USAGE_WINDOW_SECS: i64 = 60;

struct KeySlot {
    key: ApiKey,
    permits: Arc<Semaphore>,
}

/// Least-loaded selection over a fixed, ordered set of upstream keys.
///
/// Usage counters live behind a single lock. Each key additionally owns a
/// permit pool that bounds the calls in flight with that key; the pools are
/// independent of the lock and of each other.
pub struct KeySelector {
    slots: Vec<KeySlot>,
    usage: Mutex<Vec<KeyUsageRecord>>,
    permits_per_key: usize,
    window: Duration,
}

/// A key picked by [`KeySelector::select_key`] together with its permit pool.
///
/// Selecting does not take a permit; call [`SelectedKey::acquire`] and hold the
/// permit for as long as the upstream call runs.
#[derive(Debug, Clone)]
pub struct SelectedKey {
    pub key: ApiKey,
    pub index: usize,
    permits: Arc<Semaphore>,
}

impl SelectedKey {
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, KeyError> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| KeyError::PoolClosed)
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

impl KeySelector {
    pub fn new(keys: Vec<ApiKey>) -> Result<Self, KeyError> {
        Self::with_permits(keys, DEFAULT_PERMITS_PER_KEY)
    }

    pub fn with_permits(keys: Vec<ApiKey>, permits_per_key: usize) -> Result<Self, KeyError> {
        if keys.is_empty() {
            return Err(KeyError::MissingCredential);
        }
        let permits_per_key = permits_per_key.max(1);
        let usage = vec![KeyUsageRecord::default(); keys.len()];
        let slots = keys
            .into_iter()
            .map(|key| KeySlot {
                key,
                permits: Arc::new(Semaphore::new(permits_per_key)),
            })
            .collect();

        Ok(Self {
            slots,
            usage: Mutex::new(usage),
            permits_per_key,
            window: Duration::seconds(USAGE_WINDOW_SECS),
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn permits_per_key(&self) -> usize {
        self.permits_per_key
    }

    pub async fn select_key(&self) -> SelectedKey {
        self.select_key_at(Utc::now()).await
    }

    /// Picks the key with the lowest count, first in configuration order on ties.
    ///
    /// Counters whose key was last used more than a window ago are reset first.
    /// The pick is accounted for immediately, whether or not the caller's
    /// upstream call later succeeds.
    pub async fn select_key_at(&self, now: DateTime<Utc>) -> SelectedKey {
        let mut usage = self.usage.lock().await;

        for record in usage.iter_mut() {
            if record.is_stale(now, self.window) {
                record.count = 0;
            }
        }

        // slots is non-empty, checked in the constructor
        let index = usage
            .iter()
            .enumerate()
            .min_by_key(|(_, record)| record.count)
            .map(|(index, _)| index)
            .unwrap_or(0);

        usage[index].record(now);
        let slot = &self.slots[index];
        debug!("Selected key {} (count {})", slot.key, usage[index].count);

        SelectedKey {
            key: slot.key.clone(),
            index,
            permits: slot.permits.clone(),
        }
    }

    pub async fn usage_snapshot(&self) -> Vec<KeyUsageReport> {
        let usage = self.usage.lock().await;
        self.slots
            .iter()
            .zip(usage.iter())
            .map(|(slot, record)| KeyUsageReport {
                key: slot.key.masked(),
                count: record.count,
                last_used: record.last_used,
                in_flight: self.permits_per_key - slot.permits.available_permits(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) async fn force_usage(&self, index: usize, count: u64, last_used: DateTime<Utc>) {
        let mut usage = self.usage.lock().await;
        usage[index] = KeyUsageRecord { count, last_used: Some(last_used) };
    }
}
