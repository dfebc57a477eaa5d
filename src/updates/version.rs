use std::fmt::Display;

/// Dotted version as a sequence of integers, compared component by component.
///
/// Anything that does not parse cleanly collapses to `0.0.0`, so garbage from
/// a client is always treated as older than any real release.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTuple(Vec<u64>);

impl VersionTuple {
    pub fn zero() -> Self {
        Self(vec![0, 0, 0])
    }

    pub fn parse(version: &str) -> Self {
        version
            .split('.')
            .map(|part| part.trim().parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .unwrap_or_else(|_| Self::zero())
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl Display for VersionTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// True when `current` sorts strictly before `target`.
pub fn is_lower(current: &str, target: &str) -> bool {
    VersionTuple::parse(current) < VersionTuple::parse(target)
}
