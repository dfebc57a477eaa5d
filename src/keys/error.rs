use std::fmt::Display;

#[derive(Debug, PartialEq)]
pub enum KeyError {
    /// No upstream credential was configured.
    MissingCredential,
    /// The permit pool of a key was closed while waiting for a permit.
    PoolClosed,
}

impl Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::MissingCredential => write!(f, "no upstream API keys configured"),
            KeyError::PoolClosed => write!(f, "permit pool closed"),
        }
    }
}

impl std::error::Error for KeyError {}
