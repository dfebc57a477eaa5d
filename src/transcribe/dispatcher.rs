use std::fmt::Display;
use std::sync::Arc;
use anyhow::anyhow;
use serde::Serialize;
use tracing::{info, warn};

use crate::audio::AudioPayload;
use crate::keys::KeySelector;
use super::Transcriber;

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub text: String,
    pub attempts: usize,
}

/// Result of one try against one upstream key.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(String),
    Retryable(anyhow::Error),
}

#[derive(Debug, PartialEq)]
pub enum DispatchError {
    AllKeysExhausted { attempts: usize },
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::AllKeysExhausted { attempts } => {
                write!(f, "all upstream keys failed after {} attempts", attempts)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Runs the upstream call with fallback across the configured keys.
pub struct Dispatcher {
    selector: Arc<KeySelector>,
    engine: Arc<dyn Transcriber>,
}

impl Dispatcher {
    pub fn new(selector: Arc<KeySelector>, engine: Arc<dyn Transcriber>) -> Self {
        Self { selector, engine }
    }

    pub fn selector(&self) -> &Arc<KeySelector> {
        &self.selector
    }

    /// Makes exactly one attempt per configured key, stopping at the first success.
    ///
    /// Keys are re-selected by load on every attempt, so a key that already
    /// failed for this request can be picked again.
    pub async fn dispatch(&self, request_id: &str, audio: &AudioPayload) -> Result<Transcript, DispatchError> {
        let attempts = self.selector.len();

        for attempt in 1..=attempts {
            match self.attempt(audio).await {
                AttemptOutcome::Success(text) => {
                    info!("[{}] Success on attempt {}", request_id, attempt);
                    return Ok(Transcript { text, attempts: attempt });
                }
                AttemptOutcome::Retryable(e) => {
                    warn!("[{}] Attempt {} failed: {}", request_id, attempt, e);
                }
            }
        }

        Err(DispatchError::AllKeysExhausted { attempts })
    }

    async fn attempt(&self, audio: &AudioPayload) -> AttemptOutcome {
        let selected = self.selector.select_key().await;

        // held until the end of this scope, whatever the call returns
        let _permit = match selected.acquire().await {
            Ok(permit) => permit,
            Err(e) => return AttemptOutcome::Retryable(anyhow!("key {}: {}", selected.key, e)),
        };

        match self.engine.transcribe(&selected.key, &audio.data, &audio.mime_type).await {
            Ok(text) => AttemptOutcome::Success(text),
            Err(e) => AttemptOutcome::Retryable(e.context(format!("key {}", selected.key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use crate::keys::ApiKey;

    /// Fails for every key in `failing`, succeeds with "text from <key>" otherwise.
    struct ScriptedTranscriber {
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTranscriber {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|k| k.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn transcribe(&self, key: &ApiKey, _audio: &[u8], _mime_type: &str) -> Result<String> {
            self.calls.lock().unwrap().push(key.expose().to_string());
            if self.failing.contains(key.expose()) {
                bail!("quota exceeded");
            }
            Ok(format!("text from {}", key.expose()))
        }
    }

    /// Tracks the highest number of simultaneous calls seen per key.
    #[derive(Default)]
    struct ProbeTranscriber {
        current: Mutex<HashMap<String, usize>>,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Transcriber for ProbeTranscriber {
        async fn transcribe(&self, key: &ApiKey, _audio: &[u8], _mime_type: &str) -> Result<String> {
            {
                let mut current = self.current.lock().unwrap();
                let entry = current.entry(key.expose().to_string()).or_insert(0);
                *entry += 1;
                self.peak.fetch_max(*entry, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            *self.current.lock().unwrap().get_mut(key.expose()).unwrap() -= 1;
            Ok("ok".to_string())
        }
    }

    fn selector(names: &[&str]) -> Arc<KeySelector> {
        let keys = names.iter().map(|name| ApiKey::new(*name)).collect();
        Arc::new(KeySelector::new(keys).unwrap())
    }

    fn audio() -> AudioPayload {
        AudioPayload::new(vec![0u8; 8], Some("clip.ogg"), None, 1024).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_stops_the_loop() {
        let engine = Arc::new(ScriptedTranscriber::new(&[]));
        let dispatcher = Dispatcher::new(selector(&["A", "B", "C"]), engine.clone());

        let transcript = dispatcher.dispatch("req", &audio()).await.unwrap();
        assert_eq!(transcript.text, "text from A");
        assert_eq!(transcript.attempts, 1);
        assert_eq!(engine.calls(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_key() {
        let engine = Arc::new(ScriptedTranscriber::new(&["A"]));
        let keys = selector(&["A", "B", "C"]);
        let dispatcher = Dispatcher::new(keys.clone(), engine.clone());

        let transcript = dispatcher.dispatch("req", &audio()).await.unwrap();
        assert_eq!(transcript.text, "text from B");
        assert_eq!(transcript.attempts, 2);
        assert_eq!(engine.calls(), vec!["A", "B"]);

        // the failed attempt still counts against A
        let counts: Vec<u64> = keys.usage_snapshot().await.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 1, 0]);
    }

    #[tokio::test]
    async fn test_all_keys_failing_exhausts_after_one_attempt_per_key() {
        let engine = Arc::new(ScriptedTranscriber::new(&["A", "B", "C"]));
        let dispatcher = Dispatcher::new(selector(&["A", "B", "C"]), engine.clone());

        let result = dispatcher.dispatch("req", &audio()).await;
        assert_eq!(result.unwrap_err(), DispatchError::AllKeysExhausted { attempts: 3 });
        assert_eq!(engine.calls(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_failed_key_can_be_selected_again() {
        let engine = Arc::new(ScriptedTranscriber::new(&["A"]));
        let keys = selector(&["A", "B"]);
        // B is busier than A before the request starts
        keys.force_usage(1, 5, chrono::Utc::now()).await;

        let dispatcher = Dispatcher::new(keys, engine.clone());
        let result = dispatcher.dispatch("req", &audio()).await;

        assert_eq!(result.unwrap_err(), DispatchError::AllKeysExhausted { attempts: 2 });
        assert_eq!(engine.calls(), vec!["A", "A"]);
    }

    #[tokio::test]
    async fn test_permits_released_after_failures() {
        let engine = Arc::new(ScriptedTranscriber::new(&["A", "B"]));
        let keys = selector(&["A", "B"]);
        let dispatcher = Dispatcher::new(keys.clone(), engine);

        for _ in 0..10 {
            assert!(dispatcher.dispatch("req", &audio()).await.is_err());
        }
        assert!(keys.usage_snapshot().await.iter().all(|r| r.in_flight == 0));
    }

    #[tokio::test]
    async fn test_concurrent_calls_per_key_are_capped() {
        let engine = Arc::new(ProbeTranscriber::default());
        let dispatcher = Arc::new(Dispatcher::new(selector(&["only"]), engine.clone()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                dispatcher.dispatch(&format!("req-{}", i), &audio()).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let peak = engine.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= crate::keys::DEFAULT_PERMITS_PER_KEY);
    }
}
