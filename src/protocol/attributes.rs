//! Entity attribute packets
//!
//! The base packet always carries the default range introduced in 1.21.30.
//! [`VersionedUpdateAttributes`] omits it for older peers and synthesizes it
//! from the current range when decoding them.

use crate::error::ProtocolError;
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::packets::{wire_id, VersionedPacket, WirePacket};
use crate::protocol::revision::ProtocolRevision;
use crate::protocol::schema::{attribute, Layout};
use crate::protocol::types::AttributeModifier;

/// Attribute entry in the canonical layout
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttribute {
    pub id: String,
    pub min: f32,
    pub max: f32,
    pub current: f32,
    pub default_min: f32,
    pub default_max: f32,
    pub default: f32,
    pub modifiers: Vec<AttributeModifier>,
}

impl UpdateAttribute {
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let min = buffer.read_lfloat("attribute.min")?;
        let max = buffer.read_lfloat("attribute.max")?;
        let current = buffer.read_lfloat("attribute.current")?;
        let default_min = buffer.read_lfloat("attribute.default_min")?;
        let default_max = buffer.read_lfloat("attribute.default_max")?;
        let default = buffer.read_lfloat("attribute.default")?;
        let id = buffer.read_string("attribute.id")?;
        let modifiers = read_modifiers(buffer)?;
        Ok(Self {
            id,
            min,
            max,
            current,
            default_min,
            default_max,
            default,
            modifiers,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_lfloat(self.min);
        buffer.write_lfloat(self.max);
        buffer.write_lfloat(self.current);
        buffer.write_lfloat(self.default_min);
        buffer.write_lfloat(self.default_max);
        buffer.write_lfloat(self.default);
        buffer.write_string(&self.id);
        write_modifiers(buffer, &self.modifiers);
    }
}

/// Attribute changes for one entity
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttributesPacket {
    pub actor_runtime_id: u64,
    pub entries: Vec<UpdateAttribute>,
    pub tick: u64,
}

impl WirePacket for UpdateAttributesPacket {
    const WIRE_ID: u32 = wire_id::UPDATE_ATTRIBUTES;
    const NAME: &'static str = "UpdateAttributes";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let actor_runtime_id = buffer.read_var_u64("actor_runtime_id")?;
        let count = buffer.read_var_u32("entries")?;
        let mut entries = Vec::new();
        for _ in 0..count {
            entries.push(UpdateAttribute::decode(buffer)?);
        }
        Ok(Self {
            actor_runtime_id,
            entries,
            tick: buffer.read_var_u64("tick")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_u64(self.actor_runtime_id);
        buffer.write_var_u32(self.entries.len() as u32);
        for entry in &self.entries {
            entry.encode(buffer);
        }
        buffer.write_var_u64(self.tick);
    }
}

/// Attribute entry that lays itself out per revision
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedAttribute {
    pub id: String,
    pub min: f32,
    pub max: f32,
    pub current: f32,
    pub default_min: f32,
    pub default_max: f32,
    pub default: f32,
    pub modifiers: Vec<AttributeModifier>,
}

impl VersionedAttribute {
    pub fn decode(
        buffer: &mut PacketBuffer,
        revision: ProtocolRevision,
    ) -> Result<Self, ProtocolError> {
        let layout = Layout::at(revision);
        let min = buffer.read_lfloat("attribute.min")?;
        let max = buffer.read_lfloat("attribute.max")?;
        let current = buffer.read_lfloat("attribute.current")?;
        let (default_min, default_max) = if attribute::DEFAULT_RANGE.is_open(&layout) {
            (
                buffer.read_lfloat("attribute.default_min")?,
                buffer.read_lfloat("attribute.default_max")?,
            )
        } else {
            (min, max)
        };
        let default = buffer.read_lfloat("attribute.default")?;
        let id = buffer.read_string("attribute.id")?;
        let modifiers = read_modifiers(buffer)?;
        Ok(Self {
            id,
            min,
            max,
            current,
            default_min,
            default_max,
            default,
            modifiers,
        })
    }

    pub fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        let layout = Layout::at(revision);
        buffer.write_lfloat(self.min);
        buffer.write_lfloat(self.max);
        buffer.write_lfloat(self.current);
        if attribute::DEFAULT_RANGE.is_open(&layout) {
            buffer.write_lfloat(self.default_min);
            buffer.write_lfloat(self.default_max);
        }
        buffer.write_lfloat(self.default);
        buffer.write_string(&self.id);
        write_modifiers(buffer, &self.modifiers);
    }
}

/// Override representation of the attribute update packet
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedUpdateAttributes {
    pub actor_runtime_id: u64,
    pub entries: Vec<VersionedAttribute>,
    pub tick: u64,
}

impl VersionedPacket for VersionedUpdateAttributes {
    const WIRE_ID: u32 = wire_id::UPDATE_ATTRIBUTES;
    const NAME: &'static str = "UpdateAttributes";

    fn decode(
        buffer: &mut PacketBuffer,
        revision: ProtocolRevision,
    ) -> Result<Self, ProtocolError> {
        let actor_runtime_id = buffer.read_var_u64("actor_runtime_id")?;
        let count = buffer.read_var_u32("entries")?;
        let mut entries = Vec::new();
        for _ in 0..count {
            entries.push(VersionedAttribute::decode(buffer, revision)?);
        }
        Ok(Self {
            actor_runtime_id,
            entries,
            tick: buffer.read_var_u64("tick")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        buffer.write_var_u64(self.actor_runtime_id);
        buffer.write_var_u32(self.entries.len() as u32);
        for entry in &self.entries {
            entry.encode(buffer, revision);
        }
        buffer.write_var_u64(self.tick);
    }
}

fn read_modifiers(buffer: &mut PacketBuffer) -> Result<Vec<AttributeModifier>, ProtocolError> {
    let count = buffer.read_var_u32("attribute.modifiers")?;
    let mut modifiers = Vec::new();
    for _ in 0..count {
        modifiers.push(AttributeModifier::decode(buffer)?);
    }
    Ok(modifiers)
}

fn write_modifiers(buffer: &mut PacketBuffer, modifiers: &[AttributeModifier]) {
    buffer.write_var_u32(modifiers.len() as u32);
    for modifier in modifiers {
        modifier.encode(buffer);
    }
}
