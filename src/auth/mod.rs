pub mod error;
pub mod middleware;
pub mod service;

pub use error::AuthError;
pub use middleware::{signature_middleware, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use service::{Authenticator, SIGNATURE_WINDOW_SECS};
