//! Protocol module
//!
//! This module contains the wire-level building blocks of the bridge:
//! - Revisions (which wire generations exist and which are current)
//! - Packet buffer (varints, little-endian fields, strings)
//! - Field layout rules shared by every versioned codec
//! - Packet definitions, base and versioned

pub mod attributes;
pub mod auth_input;
pub mod buffer;
pub mod packets;
pub mod revision;
pub mod schema;
pub mod types;
pub mod versioned;
pub mod world;

pub use buffer::PacketBuffer;
pub use packets::{Packet, PacketForm, RawPacket, VersionedPacket, WirePacket};
pub use revision::{ProtocolRevision, RevisionRegistry};
