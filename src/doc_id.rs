use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A document identifier assigned by the store.
///
/// Identifiers come from a persistent counter, so they increase in
/// insertion order and are never handed out twice, even after the
/// document that held one is deleted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The numeric ID used as the key in redb tables.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    /// Accepts both `42` and `#42`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::Validation(format!("invalid document id: {s}")))
    }
}
