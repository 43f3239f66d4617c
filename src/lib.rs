//! Protocol Bridge Library
//!
//! This library lets one game server talk to clients on several protocol
//! revisions at once by translating every packet between the client's
//! revision and a single canonical form.
//!
//! ## Modules
//!
//! - `config` - Bridge configuration management
//! - `engine` - Inbound and outbound translation entry points
//! - `error` - Error types and result definitions
//! - `protocol` - Wire primitives, revisions and packet codecs
//! - `translate` - Block state mappings, overrides and rewrite rules

pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod translate;

// Re-export commonly used types
pub use config::BridgeConfig;
pub use engine::TranslationEngine;
pub use error::{BridgeError, Result};
pub use protocol::{Packet, ProtocolRevision};
pub use translate::Direction;

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
