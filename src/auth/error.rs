use std::fmt::Display;

#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingSignature,
    MissingTimestamp,
    InvalidTimestamp,
    Expired,
    InvalidSignature,
}

impl AuthError {
    /// Signature mismatches are "forbidden"; everything else means the caller
    /// never presented usable credentials.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::InvalidSignature)
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AuthError::MissingSignature => "Missing signature",
            AuthError::MissingTimestamp => "Missing timestamp",
            AuthError::InvalidTimestamp => "Invalid timestamp",
            AuthError::Expired => "Request expired",
            AuthError::InvalidSignature => "Invalid signature",
        };
        write!(f, "{}", message)
    }
}

impl std::error::Error for AuthError {}
