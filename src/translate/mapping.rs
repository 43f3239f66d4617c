//! Block state identifier mapping
//!
//! Every protocol revision numbers block states differently on the wire.
//! A [`BlockStateMapping`] holds one revision's bijection between those
//! version-local state ids and the server's canonical runtime ids. The
//! [`IdTranslator`] builds one mapping per legacy revision from a
//! [`RuntimeIdAuthority`] and afterwards only reads them.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PaletteError, Result, TranslationError};
use crate::protocol::revision::ProtocolRevision;

/// Which way an identifier is being looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupDirection {
    /// Version-local state id to canonical runtime id
    ToRuntime,
    /// Canonical runtime id to version-local state id
    ToVersion,
}

impl fmt::Display for LookupDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupDirection::ToRuntime => write!(f, "version-to-runtime"),
            LookupDirection::ToVersion => write!(f, "runtime-to-version"),
        }
    }
}

/// One row of a revision's block palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatePair {
    pub runtime_id: u32,
    pub state_id: u32,
}

impl StatePair {
    pub const fn new(runtime_id: u32, state_id: u32) -> Self {
        Self {
            runtime_id,
            state_id,
        }
    }
}

/// On-disk palette document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteFile {
    pub revision: ProtocolRevision,
    pub states: Vec<StatePair>,
}

/// Immutable runtime id ⇄ state id table for one revision
#[derive(Debug, Clone)]
pub struct BlockStateMapping {
    revision: ProtocolRevision,
    to_runtime: HashMap<u32, u32>,
    to_version: HashMap<u32, u32>,
}

impl BlockStateMapping {
    /// Build a mapping, rejecting any id that appears twice on either side
    pub fn from_pairs(
        revision: ProtocolRevision,
        pairs: impl IntoIterator<Item = StatePair>,
    ) -> std::result::Result<Self, TranslationError> {
        let mut to_runtime = HashMap::new();
        let mut to_version = HashMap::new();

        for pair in pairs {
            if to_runtime.insert(pair.state_id, pair.runtime_id).is_some() {
                return Err(TranslationError::DuplicateEntry {
                    revision,
                    id: pair.state_id,
                    direction: LookupDirection::ToRuntime,
                });
            }
            if to_version.insert(pair.runtime_id, pair.state_id).is_some() {
                return Err(TranslationError::DuplicateEntry {
                    revision,
                    id: pair.runtime_id,
                    direction: LookupDirection::ToVersion,
                });
            }
        }

        Ok(Self {
            revision,
            to_runtime,
            to_version,
        })
    }

    pub fn revision(&self) -> ProtocolRevision {
        self.revision
    }

    /// Number of block states in the table
    pub fn len(&self) -> usize {
        self.to_runtime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_runtime.is_empty()
    }

    /// Map a version-local state id to its runtime id
    pub fn to_runtime_id(&self, state_id: u32) -> std::result::Result<u32, TranslationError> {
        self.to_runtime
            .get(&state_id)
            .copied()
            .ok_or(TranslationError::IdLookupMiss {
                revision: self.revision,
                id: state_id,
                direction: LookupDirection::ToRuntime,
            })
    }

    /// Map a runtime id to this revision's state id
    pub fn to_version_state_id(
        &self,
        runtime_id: u32,
    ) -> std::result::Result<u32, TranslationError> {
        self.to_version
            .get(&runtime_id)
            .copied()
            .ok_or(TranslationError::IdLookupMiss {
                revision: self.revision,
                id: runtime_id,
                direction: LookupDirection::ToVersion,
            })
    }

    /// Iterate over all pairs in no particular order
    pub fn pairs(&self) -> impl Iterator<Item = StatePair> + '_ {
        self.to_version
            .iter()
            .map(|(&runtime_id, &state_id)| StatePair::new(runtime_id, state_id))
    }
}

/// Source of truth for each revision's block palette. Only consulted while
/// the translator is being built.
pub trait RuntimeIdAuthority {
    fn block_states(&self, revision: ProtocolRevision) -> Result<Vec<StatePair>>;
}

impl RuntimeIdAuthority for HashMap<ProtocolRevision, Vec<StatePair>> {
    fn block_states(&self, revision: ProtocolRevision) -> Result<Vec<StatePair>> {
        self.get(&revision)
            .cloned()
            .ok_or_else(|| PaletteError::Missing(revision).into())
    }
}

/// Palette files laid out as `<root>/<revision>.json`
#[derive(Debug, Clone)]
pub struct PaletteDirectory {
    root: PathBuf,
}

impl PaletteDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the palette file for a revision
    pub fn path_for(&self, revision: ProtocolRevision) -> PathBuf {
        self.root.join(format!("{}.json", revision))
    }
}

impl RuntimeIdAuthority for PaletteDirectory {
    fn block_states(&self, revision: ProtocolRevision) -> Result<Vec<StatePair>> {
        let path = self.path_for(revision);
        if !path.exists() {
            return Err(PaletteError::NotFound(path).into());
        }

        let contents = fs::read_to_string(&path)?;
        let palette: PaletteFile =
            serde_json::from_str(&contents).map_err(|e| PaletteError::Malformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if palette.revision != revision {
            return Err(PaletteError::RevisionMismatch {
                path,
                expected: revision,
                found: palette.revision,
            }
            .into());
        }

        debug!(
            revision = %revision,
            path = %path.display(),
            states = palette.states.len(),
            "Read block palette"
        );
        Ok(palette.states)
    }
}

/// Per-revision identifier translation over prebuilt mappings
#[derive(Debug, Clone, Default)]
pub struct IdTranslator {
    mappings: HashMap<ProtocolRevision, Arc<BlockStateMapping>>,
}

impl IdTranslator {
    /// Build a mapping for every listed revision
    pub fn build<A>(
        authority: &A,
        revisions: impl IntoIterator<Item = ProtocolRevision>,
    ) -> Result<Self>
    where
        A: RuntimeIdAuthority + ?Sized,
    {
        let mut mappings = HashMap::new();
        for revision in revisions {
            let states = authority.block_states(revision)?;
            let mapping = BlockStateMapping::from_pairs(revision, states)?;
            info!(
                revision = %revision,
                states = mapping.len(),
                "Built block state mapping"
            );
            mappings.insert(revision, Arc::new(mapping));
        }
        Ok(Self { mappings })
    }

    /// Assemble a translator from mappings built elsewhere
    pub fn from_mappings(mappings: impl IntoIterator<Item = BlockStateMapping>) -> Self {
        Self {
            mappings: mappings
                .into_iter()
                .map(|mapping| (mapping.revision(), Arc::new(mapping)))
                .collect(),
        }
    }

    /// Get the mapping bound to a revision
    pub fn mapping(
        &self,
        revision: ProtocolRevision,
    ) -> std::result::Result<&Arc<BlockStateMapping>, TranslationError> {
        self.mappings
            .get(&revision)
            .ok_or(TranslationError::NoMapping(revision))
    }

    pub fn has_mapping(&self, revision: ProtocolRevision) -> bool {
        self.mappings.contains_key(&revision)
    }

    /// Revisions with a loaded mapping, ascending
    pub fn revisions(&self) -> Vec<ProtocolRevision> {
        let mut revisions: Vec<_> = self.mappings.keys().copied().collect();
        revisions.sort();
        revisions
    }

    pub fn to_runtime_id(
        &self,
        revision: ProtocolRevision,
        state_id: u32,
    ) -> std::result::Result<u32, TranslationError> {
        self.mapping(revision)?.to_runtime_id(state_id)
    }

    pub fn to_version_state_id(
        &self,
        revision: ProtocolRevision,
        runtime_id: u32,
    ) -> std::result::Result<u32, TranslationError> {
        self.mapping(revision)?.to_version_state_id(runtime_id)
    }
}
