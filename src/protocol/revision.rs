//! Protocol revisions
//!
//! A [`ProtocolRevision`] identifies one generation of the wire format. The
//! [`RevisionRegistry`] records which revisions the bridge accepts and which
//! of them already speak the canonical identifier space.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, ProtocolError, Result};

/// An ordered wire-format generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolRevision(u32);

impl ProtocolRevision {
    pub const V1_20_40: Self = Self(622);
    pub const V1_20_50: Self = Self(630);
    pub const V1_20_60: Self = Self(649);
    pub const V1_20_70: Self = Self(662);
    pub const V1_20_80: Self = Self(671);
    pub const V1_21_0: Self = Self(685);
    pub const V1_21_2: Self = Self(686);
    pub const V1_21_20: Self = Self(712);
    pub const V1_21_30: Self = Self(729);
    pub const V1_21_40: Self = Self(748);

    /// The revision whose layout the base codecs implement
    pub const CANONICAL: Self = Self::V1_21_40;

    /// Create a revision from its raw protocol number
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw protocol number
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Get the game version name for known revisions
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            622 => Some("1.20.40"),
            630 => Some("1.20.50"),
            649 => Some("1.20.60"),
            662 => Some("1.20.70"),
            671 => Some("1.20.80"),
            685 => Some("1.21.0"),
            686 => Some("1.21.2"),
            712 => Some("1.21.20"),
            729 => Some("1.21.30"),
            748 => Some("1.21.40"),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProtocolRevision {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Every revision the codecs know how to lay out
pub const KNOWN_REVISIONS: [ProtocolRevision; 10] = [
    ProtocolRevision::V1_20_40,
    ProtocolRevision::V1_20_50,
    ProtocolRevision::V1_20_60,
    ProtocolRevision::V1_20_70,
    ProtocolRevision::V1_20_80,
    ProtocolRevision::V1_21_0,
    ProtocolRevision::V1_21_2,
    ProtocolRevision::V1_21_20,
    ProtocolRevision::V1_21_30,
    ProtocolRevision::V1_21_40,
];

/// Read-only enumeration of supported and current revisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRegistry {
    supported: BTreeSet<ProtocolRevision>,
    current: BTreeSet<ProtocolRevision>,
}

impl RevisionRegistry {
    /// Create a registry. Current revisions must be a non-empty subset of
    /// the supported ones.
    pub fn new(
        supported: impl IntoIterator<Item = ProtocolRevision>,
        current: impl IntoIterator<Item = ProtocolRevision>,
    ) -> Result<Self> {
        let supported: BTreeSet<_> = supported.into_iter().collect();
        let current: BTreeSet<_> = current.into_iter().collect();

        if supported.is_empty() {
            return Err(BridgeError::Config(
                "at least one supported revision is required".to_string(),
            ));
        }
        if current.is_empty() {
            return Err(BridgeError::Config(
                "at least one current revision is required".to_string(),
            ));
        }
        if let Some(stray) = current.difference(&supported).next() {
            return Err(BridgeError::Config(format!(
                "current revision {} is not in the supported set",
                stray
            )));
        }

        Ok(Self { supported, current })
    }

    /// Check whether a revision is accepted at all
    pub fn is_supported(&self, revision: ProtocolRevision) -> bool {
        self.supported.contains(&revision)
    }

    /// Check whether a revision already speaks canonical identifiers
    pub fn is_current(&self, revision: ProtocolRevision) -> bool {
        self.current.contains(&revision)
    }

    /// Fail with a decode violation if the revision is not supported
    pub fn ensure_supported(&self, revision: ProtocolRevision) -> Result<()> {
        if self.is_supported(revision) {
            Ok(())
        } else {
            Err(ProtocolError::UnsupportedRevision(revision).into())
        }
    }

    /// Iterate over all supported revisions in ascending order
    pub fn supported(&self) -> impl Iterator<Item = ProtocolRevision> + '_ {
        self.supported.iter().copied()
    }

    /// Iterate over supported revisions that need identifier translation
    pub fn legacy(&self) -> impl Iterator<Item = ProtocolRevision> + '_ {
        self.supported.difference(&self.current).copied()
    }
}

impl Default for RevisionRegistry {
    fn default() -> Self {
        Self {
            supported: KNOWN_REVISIONS.iter().copied().collect(),
            current: [ProtocolRevision::CANONICAL].into_iter().collect(),
        }
    }
}
