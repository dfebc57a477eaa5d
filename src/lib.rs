pub mod audio;
pub mod auth;
pub mod config;
pub mod keys;
pub mod transcribe;
pub mod updates;
pub mod utils;
pub mod web;

use std::sync::Arc;
use auth::Authenticator;
use config::Settings;
use keys::{KeyError, KeySelector};
use transcribe::{Dispatcher, Transcriber};
use updates::UpdatePolicy;

pub const GIT_HASH: &str = env!("GIT_HASH");

pub struct AppContext {
    pub authenticator: Arc<Authenticator>,
    pub dispatcher: Arc<Dispatcher>,
    pub updates: Arc<UpdatePolicy>,
    pub max_audio_size: usize,
}

impl AppContext {
    /// Wires the services together; fails when no upstream key is configured.
    pub fn new(settings: &Settings, engine: Arc<dyn Transcriber>) -> Result<Self, KeyError> {
        let selector = KeySelector::with_permits(settings.api_keys.clone(), settings.permits_per_key)?;

        Ok(Self {
            authenticator: Arc::new(Authenticator::new(settings.secret_key.clone())),
            dispatcher: Arc::new(Dispatcher::new(Arc::new(selector), engine)),
            updates: Arc::new(settings.updates.clone()),
            max_audio_size: settings.max_audio_size,
        })
    }

    pub fn api_keys_count(&self) -> usize {
        self.dispatcher.selector().len()
    }
}

pub fn init_env() {
    dotenv::dotenv().ok();
}
