//! Packet definitions module
//!
//! Defines the packet traits, wire type identifiers and the [`Packet`]
//! tagged union that every codec produces and consumes.

use bytes::Bytes;

use crate::error::ProtocolError;
use crate::protocol::attributes::{UpdateAttributesPacket, VersionedUpdateAttributes};
use crate::protocol::auth_input::PlayerAuthInputPacket;
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::revision::ProtocolRevision;
use crate::protocol::versioned::VersionedPlayerAuthInput;
use crate::protocol::world::{
    CreativeContentPacket, LevelEventPacket, LevelSoundEventPacket, UpdateBlockPacket,
    UpdateBlockSyncedPacket,
};

/// Wire type identifiers
pub mod wire_id {
    pub const UPDATE_BLOCK: u32 = 0x15;
    pub const LEVEL_EVENT: u32 = 0x19;
    pub const UPDATE_ATTRIBUTES: u32 = 0x1d;
    pub const CRAFTING_DATA: u32 = 0x34;
    pub const UPDATE_BLOCK_SYNCED: u32 = 0x6e;
    pub const LEVEL_SOUND_EVENT: u32 = 0x7b;
    pub const PLAYER_AUTH_INPUT: u32 = 0x90;
    pub const CREATIVE_CONTENT: u32 = 0x91;
    pub const UPDATE_SUB_CHUNK_BLOCKS: u32 = 0xac;
}

/// Header bits that carry the wire type id; the rest are sub-client ids
pub const WIRE_ID_MASK: u32 = 0x3ff;

/// Packet with a single, revision-independent layout
pub trait WirePacket: Sized {
    /// The wire type id
    const WIRE_ID: u32;

    /// Human-readable packet name
    const NAME: &'static str;

    /// Decode the payload from a buffer
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError>;

    /// Encode the payload to a buffer
    fn encode(&self, buffer: &mut PacketBuffer);

    /// Encode to a new buffer
    fn to_buffer(&self) -> PacketBuffer {
        let mut buffer = PacketBuffer::with_capacity(64);
        self.encode(&mut buffer);
        buffer
    }
}

/// Packet whose layout depends on the negotiated revision
pub trait VersionedPacket: Sized {
    /// The wire type id
    const WIRE_ID: u32;

    /// Human-readable packet name
    const NAME: &'static str;

    /// Decode the payload as laid out by `revision`
    fn decode(buffer: &mut PacketBuffer, revision: ProtocolRevision)
        -> Result<Self, ProtocolError>;

    /// Encode the payload as laid out by `revision`
    fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision);
}

/// Packet the bridge does not model; its payload is kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub wire_id: u32,
    pub payload: Bytes,
}

impl RawPacket {
    pub fn new(wire_id: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            wire_id,
            payload: payload.into(),
        }
    }
}

/// Which representation a packet value is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketForm {
    /// Canonical layout, no revision awareness
    Base,
    /// Override representation that codes per revision
    Versioned,
    /// Opaque payload
    Raw,
}

/// A decoded packet
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    LevelEvent(LevelEventPacket),
    LevelSoundEvent(LevelSoundEventPacket),
    UpdateBlock(UpdateBlockPacket),
    UpdateBlockSynced(UpdateBlockSyncedPacket),
    CreativeContent(CreativeContentPacket),
    UpdateAttributes(UpdateAttributesPacket),
    VersionedUpdateAttributes(VersionedUpdateAttributes),
    PlayerAuthInput(PlayerAuthInputPacket),
    VersionedPlayerAuthInput(VersionedPlayerAuthInput),
    Raw(RawPacket),
}

impl Packet {
    /// Get the wire type id
    pub fn wire_id(&self) -> u32 {
        match self {
            Packet::LevelEvent(_) => LevelEventPacket::WIRE_ID,
            Packet::LevelSoundEvent(_) => LevelSoundEventPacket::WIRE_ID,
            Packet::UpdateBlock(_) => UpdateBlockPacket::WIRE_ID,
            Packet::UpdateBlockSynced(_) => UpdateBlockSyncedPacket::WIRE_ID,
            Packet::CreativeContent(_) => CreativeContentPacket::WIRE_ID,
            Packet::UpdateAttributes(_) => UpdateAttributesPacket::WIRE_ID,
            Packet::VersionedUpdateAttributes(_) => VersionedUpdateAttributes::WIRE_ID,
            Packet::PlayerAuthInput(_) => PlayerAuthInputPacket::WIRE_ID,
            Packet::VersionedPlayerAuthInput(_) => VersionedPlayerAuthInput::WIRE_ID,
            Packet::Raw(raw) => raw.wire_id,
        }
    }

    /// Get the packet name
    pub fn name(&self) -> &'static str {
        match self {
            Packet::LevelEvent(_) => LevelEventPacket::NAME,
            Packet::LevelSoundEvent(_) => LevelSoundEventPacket::NAME,
            Packet::UpdateBlock(_) => UpdateBlockPacket::NAME,
            Packet::UpdateBlockSynced(_) => UpdateBlockSyncedPacket::NAME,
            Packet::CreativeContent(_) => CreativeContentPacket::NAME,
            Packet::UpdateAttributes(_) => UpdateAttributesPacket::NAME,
            Packet::VersionedUpdateAttributes(_) => VersionedUpdateAttributes::NAME,
            Packet::PlayerAuthInput(_) => PlayerAuthInputPacket::NAME,
            Packet::VersionedPlayerAuthInput(_) => VersionedPlayerAuthInput::NAME,
            Packet::Raw(_) => "Raw",
        }
    }

    /// Get the representation this value is in
    pub fn form(&self) -> PacketForm {
        match self {
            Packet::VersionedUpdateAttributes(_) | Packet::VersionedPlayerAuthInput(_) => {
                PacketForm::Versioned
            }
            Packet::Raw(_) => PacketForm::Raw,
            _ => PacketForm::Base,
        }
    }

    /// Check whether the packet is already in its override representation
    pub fn is_versioned(&self) -> bool {
        self.form() == PacketForm::Versioned
    }

    /// Encode the payload. Versioned packets follow `revision`, base packets
    /// always use the canonical layout and raw packets are copied verbatim.
    pub fn encode_payload(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        match self {
            Packet::LevelEvent(p) => p.encode(buffer),
            Packet::LevelSoundEvent(p) => p.encode(buffer),
            Packet::UpdateBlock(p) => p.encode(buffer),
            Packet::UpdateBlockSynced(p) => p.encode(buffer),
            Packet::CreativeContent(p) => p.encode(buffer),
            Packet::UpdateAttributes(p) => p.encode(buffer),
            Packet::VersionedUpdateAttributes(p) => p.encode(buffer, revision),
            Packet::PlayerAuthInput(p) => p.encode(buffer),
            Packet::VersionedPlayerAuthInput(p) => p.encode(buffer, revision),
            Packet::Raw(raw) => buffer.write_bytes(&raw.payload),
        }
    }
}

/// Decode a payload with the base codec registered for `wire_id`
pub fn decode_base(wire_id: u32, buffer: &mut PacketBuffer) -> Result<Packet, ProtocolError> {
    let packet = match wire_id {
        wire_id::LEVEL_EVENT => Packet::LevelEvent(LevelEventPacket::decode(buffer)?),
        wire_id::LEVEL_SOUND_EVENT => {
            Packet::LevelSoundEvent(LevelSoundEventPacket::decode(buffer)?)
        }
        wire_id::UPDATE_BLOCK => Packet::UpdateBlock(UpdateBlockPacket::decode(buffer)?),
        wire_id::UPDATE_BLOCK_SYNCED => {
            Packet::UpdateBlockSynced(UpdateBlockSyncedPacket::decode(buffer)?)
        }
        wire_id::CREATIVE_CONTENT => {
            Packet::CreativeContent(CreativeContentPacket::decode(buffer)?)
        }
        wire_id::UPDATE_ATTRIBUTES => {
            Packet::UpdateAttributes(UpdateAttributesPacket::decode(buffer)?)
        }
        wire_id::PLAYER_AUTH_INPUT => {
            Packet::PlayerAuthInput(PlayerAuthInputPacket::decode(buffer)?)
        }
        _ => Packet::Raw(RawPacket::new(wire_id, buffer.read_remaining())),
    };
    Ok(packet)
}

/// Read the packet header and return the wire type id
pub fn read_header(buffer: &mut PacketBuffer) -> Result<u32, ProtocolError> {
    Ok(buffer.read_var_u32("header")? & WIRE_ID_MASK)
}

/// Write a packet header for `wire_id`
pub fn write_header(buffer: &mut PacketBuffer, wire_id: u32) {
    buffer.write_var_u32(wire_id & WIRE_ID_MASK);
}
