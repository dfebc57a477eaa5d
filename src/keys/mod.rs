pub mod error;
pub mod selector;
pub mod types;

pub use error::KeyError;
pub use selector::{KeySelector, SelectedKey, DEFAULT_PERMITS_PER_KEY, USAGE_WINDOW_SECS};
pub use types::{ApiKey, KeyUsageRecord, KeyUsageReport};
