//! Translation module
//!
//! Everything that turns a revision-specific packet into the canonical one
//! and back:
//! - Block state mappings per revision
//! - The override registry and the normalizer behind it
//! - Directional identifier rewrite rules

pub mod mapping;
pub mod normalize;
pub mod overrides;
pub mod rules;

pub use mapping::{
    BlockStateMapping, IdTranslator, LookupDirection, PaletteDirectory, RuntimeIdAuthority,
    StatePair,
};
pub use normalize::Normalize;
pub use overrides::{OverrideEntry, OverrideRegistry};
pub use rules::{Direction, RewriteOutcome, RuleSet, TranslationRule};
