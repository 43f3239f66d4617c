//! Packet override registry
//!
//! Maps a wire type id to the versioned codec that replaces the base one.
//! Only packets whose layout differs between revisions have an entry; every
//! other packet is decoded and encoded with its base codec.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::error::{BridgeError, ProtocolError};
use crate::protocol::attributes::VersionedUpdateAttributes;
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::packets::{Packet, VersionedPacket};
use crate::protocol::revision::ProtocolRevision;
use crate::protocol::versioned::VersionedPlayerAuthInput;
use crate::translate::normalize::Normalize;

/// Decodes a payload straight into the versioned representation
pub type DecodeFn = fn(&mut PacketBuffer, ProtocolRevision) -> Result<Packet, ProtocolError>;

/// Rebuilds a base packet as its versioned counterpart. Returns `None` when
/// the packet is not the base type this entry overrides.
pub type UpgradeFn = fn(&Packet) -> Result<Option<Packet>, BridgeError>;

/// Versioned packets that know which [`Packet`] variant holds them
pub trait IntoPacket {
    fn into_packet(self) -> Packet;
}

impl IntoPacket for VersionedPlayerAuthInput {
    fn into_packet(self) -> Packet {
        Packet::VersionedPlayerAuthInput(self)
    }
}

impl IntoPacket for VersionedUpdateAttributes {
    fn into_packet(self) -> Packet {
        Packet::VersionedUpdateAttributes(self)
    }
}

/// Replacement codec for one wire type
#[derive(Clone, Copy)]
pub struct OverrideEntry {
    pub wire_id: u32,
    pub name: &'static str,
    decode: DecodeFn,
    upgrade: UpgradeFn,
}

impl OverrideEntry {
    /// Entry for a versioned packet type
    pub fn of<P>(upgrade: UpgradeFn) -> Self
    where
        P: VersionedPacket + IntoPacket,
    {
        Self {
            wire_id: P::WIRE_ID,
            name: P::NAME,
            decode: decode_versioned::<P>,
            upgrade,
        }
    }

    /// Decode a payload at `revision`
    pub fn decode(
        &self,
        buffer: &mut PacketBuffer,
        revision: ProtocolRevision,
    ) -> Result<Packet, ProtocolError> {
        (self.decode)(buffer, revision)
    }

    /// Rebuild a base packet in the versioned form
    pub fn upgrade(&self, packet: &Packet) -> Result<Option<Packet>, BridgeError> {
        (self.upgrade)(packet)
    }
}

impl fmt::Debug for OverrideEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideEntry")
            .field("wire_id", &self.wire_id)
            .field("name", &self.name)
            .finish()
    }
}

fn decode_versioned<P>(
    buffer: &mut PacketBuffer,
    revision: ProtocolRevision,
) -> Result<Packet, ProtocolError>
where
    P: VersionedPacket + IntoPacket,
{
    P::decode(buffer, revision).map(IntoPacket::into_packet)
}

fn upgrade_auth_input(packet: &Packet) -> Result<Option<Packet>, BridgeError> {
    match packet {
        Packet::PlayerAuthInput(base) => Ok(Some(Packet::VersionedPlayerAuthInput(
            VersionedPlayerAuthInput::upgrade(base)?,
        ))),
        _ => Ok(None),
    }
}

fn upgrade_attributes(packet: &Packet) -> Result<Option<Packet>, BridgeError> {
    match packet {
        Packet::UpdateAttributes(base) => Ok(Some(Packet::VersionedUpdateAttributes(
            VersionedUpdateAttributes::upgrade(base)?,
        ))),
        _ => Ok(None),
    }
}

/// Immutable wire id to override table
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    entries: HashMap<u32, OverrideEntry>,
}

impl OverrideRegistry {
    /// Create a registry without overrides
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every versioned packet the bridge implements
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(OverrideEntry::of::<VersionedPlayerAuthInput>(
            upgrade_auth_input,
        ));
        registry.register(OverrideEntry::of::<VersionedUpdateAttributes>(
            upgrade_attributes,
        ));
        registry
    }

    fn register(&mut self, entry: OverrideEntry) {
        self.entries.insert(entry.wire_id, entry);
    }

    /// Find the override for a wire type
    pub fn lookup(&self, wire_id: u32) -> Option<&OverrideEntry> {
        self.entries.get(&wire_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild `packet` in its versioned form if it has an override and is
    /// not already versioned. Applying this twice is the same as once.
    pub fn normalize(&self, packet: Packet) -> Result<Packet, BridgeError> {
        if packet.is_versioned() {
            return Ok(packet);
        }
        let Some(entry) = self.lookup(packet.wire_id()) else {
            return Ok(packet);
        };

        match entry.upgrade(&packet)? {
            Some(upgraded) => {
                trace!(
                    wire_id = entry.wire_id,
                    packet = entry.name,
                    "Upgraded packet to versioned form"
                );
                Ok(upgraded)
            }
            None => Ok(packet),
        }
    }
}
