use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use super::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_WINDOW_SECS: f64 = 300.0;

/// Stateless check of `X-Timestamp` / `X-Signature` request headers.
///
/// The signature is the hex encoded HMAC-SHA256 of the timestamp string under
/// the shared secret. Nothing is remembered between requests, so a captured
/// signature stays usable until its timestamp leaves the window.
pub struct Authenticator {
    secret: Vec<u8>,
    window_secs: f64,
}

impl Authenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into_bytes(),
            window_secs: SIGNATURE_WINDOW_SECS,
        }
    }

    pub fn with_window(mut self, window_secs: f64) -> Self {
        self.window_secs = window_secs;
        self
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::InvalidSignature)
    }

    /// Hex signature for `timestamp`, as a client would compute it.
    pub fn sign(&self, timestamp: &str) -> Result<String, AuthError> {
        let mut mac = self.mac()?;
        mac.update(timestamp.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn verify(&self, timestamp: Option<&str>, signature: Option<&str>) -> Result<(), AuthError> {
        self.verify_at(timestamp, signature, Utc::now())
    }

    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let signature = signature.ok_or(AuthError::MissingSignature)?;
        let timestamp = timestamp.ok_or(AuthError::MissingTimestamp)?;

        let sent_at: f64 = timestamp
            .trim()
            .parse()
            .map_err(|_| AuthError::InvalidTimestamp)?;
        if !sent_at.is_finite() {
            return Err(AuthError::InvalidTimestamp);
        }

        let now = now.timestamp_micros() as f64 / 1_000_000.0;
        if (now - sent_at).abs() > self.window_secs {
            debug!("Rejecting request signed {:.0}s away from now", now - sent_at);
            return Err(AuthError::Expired);
        }

        // only the canonical lowercase hex form is accepted; verify_slice
        // compares in constant time
        if signature.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(AuthError::InvalidSignature);
        }
        let expected = hex::decode(signature).map_err(|_| AuthError::InvalidSignature)?;
        let mut mac = self.mac()?;
        mac.update(timestamp.as_bytes());
        mac.verify_slice(&expected).map_err(|_| AuthError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn timestamp_of(time: DateTime<Utc>) -> String {
        time.timestamp().to_string()
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let auth = Authenticator::new("secret");
        let now = Utc::now();
        let ts = timestamp_of(now - Duration::seconds(299));
        let signature = auth.sign(&ts).unwrap();

        assert_eq!(auth.verify_at(Some(&ts), Some(&signature), now), Ok(()));
    }

    #[test]
    fn test_signature_matches_reference_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let auth = Authenticator::new("key");
        assert_eq!(
            auth.sign("The quick brown fox jumps over the lazy dog").unwrap(),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let auth = Authenticator::new("secret");
        let forger = Authenticator::new("not-the-secret");
        let now = Utc::now();
        let ts = timestamp_of(now);
        let signature = forger.sign(&ts).unwrap();

        assert_eq!(
            auth.verify_at(Some(&ts), Some(&signature), now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_expired_timestamp_is_rejected() {
        let auth = Authenticator::new("secret");
        let now = Utc::now();

        let old = timestamp_of(now - Duration::seconds(301));
        let signature = auth.sign(&old).unwrap();
        assert_eq!(auth.verify_at(Some(&old), Some(&signature), now), Err(AuthError::Expired));

        // clock skew is symmetric
        let future = timestamp_of(now + Duration::seconds(301));
        let signature = auth.sign(&future).unwrap();
        assert_eq!(auth.verify_at(Some(&future), Some(&signature), now), Err(AuthError::Expired));
    }

    #[test]
    fn test_expiry_is_checked_before_signature() {
        let auth = Authenticator::new("secret");
        let now = Utc::now();
        let old = timestamp_of(now - Duration::seconds(600));

        assert_eq!(auth.verify_at(Some(&old), Some("deadbeef"), now), Err(AuthError::Expired));
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let auth = Authenticator::new("secret");
        let now = Utc::now();
        let ts = timestamp_of(now);

        assert_eq!(auth.verify_at(Some(&ts), None, now), Err(AuthError::MissingSignature));
        assert_eq!(auth.verify_at(None, Some("abc"), now), Err(AuthError::MissingTimestamp));
        assert_eq!(
            auth.verify_at(Some("yesterday"), Some("abc"), now),
            Err(AuthError::InvalidTimestamp)
        );
        assert_eq!(
            auth.verify_at(Some("NaN"), Some("abc"), now),
            Err(AuthError::InvalidTimestamp)
        );
        assert_eq!(
            auth.verify_at(Some(&ts), Some("not-hex"), now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_fractional_timestamp_is_signed_verbatim() {
        let auth = Authenticator::new("secret");
        let now = Utc::now();
        let ts = format!("{}.25", now.timestamp());
        let signature = auth.sign(&ts).unwrap();

        assert!(auth.verify_at(Some(&ts), Some(&signature), now).is_ok());
        // signing the rounded value does not carry over
        let rounded = auth.sign(&timestamp_of(now)).unwrap();
        assert_eq!(
            auth.verify_at(Some(&ts), Some(&rounded), now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_signature_must_be_exact_lowercase_hex() {
        let auth = Authenticator::new("secret");
        let now = Utc::now();
        let ts = timestamp_of(now);
        let signature = auth.sign(&ts).unwrap();

        let upper = signature.to_uppercase();
        assert_eq!(auth.verify_at(Some(&ts), Some(&upper), now), Err(AuthError::InvalidSignature));

        let padded = format!(" {} ", signature);
        assert_eq!(auth.verify_at(Some(&ts), Some(&padded), now), Err(AuthError::InvalidSignature));

        assert!(auth.verify_at(Some(&ts), Some(&signature), now).is_ok());
    }

    #[test]
    fn test_status_classification() {
        assert!(AuthError::InvalidSignature.is_forbidden());
        assert!(!AuthError::Expired.is_forbidden());
        assert!(!AuthError::MissingSignature.is_forbidden());
    }
}
