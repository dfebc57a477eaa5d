pub mod locale;
pub mod service;
pub mod version;

pub use locale::{Locale, UpdateTexts};
pub use service::{UpdateInfo, UpdatePolicy, VersionInfo};
pub use version::{is_lower, VersionTuple};
