use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Label explaining why a contract warrants a notification (e.g. "critical").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reason(String);

impl Reason {
    /// Returns `None` for the empty string; a reason is never empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Reason {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position of a reason within the priority list. Listed reasons outrank every
/// unlisted one, and a lower index outranks a higher one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Listed(usize),
    Unlisted,
}

impl Rank {
    pub fn outranks(self, other: Rank) -> bool {
        self < other
    }
}

/// Ordered reasons, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityList {
    reasons: Vec<Reason>,
}

impl PriorityList {
    pub fn new(reasons: Vec<Reason>) -> Self {
        Self { reasons }
    }

    /// Builds the list from raw configuration values. Entries that are not
    /// non-empty strings can never match a reason and are dropped.
    pub fn from_values(values: &[Value]) -> Self {
        let mut reasons = Vec::with_capacity(values.len());
        for (position, value) in values.iter().enumerate() {
            match value.as_str().and_then(Reason::new) {
                Some(reason) => reasons.push(reason),
                None => warn!(position, %value, "ignoring unusable priority entry"),
            }
        }
        Self { reasons }
    }

    /// First occurrence wins when a reason is listed twice.
    pub fn rank(&self, reason: &str) -> Rank {
        self.reasons
            .iter()
            .position(|listed| listed.as_str() == reason)
            .map(Rank::Listed)
            .unwrap_or(Rank::Unlisted)
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PriorityList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .filter_map(|value| Reason::new(value.as_ref()))
                .collect(),
        )
    }
}
