//! World packets
//!
//! Clientbound packets that carry block state identifiers. Their layout is
//! the same in every supported revision; only the identifiers inside them
//! differ and are rewritten by the translation pipeline.

use crate::error::ProtocolError;
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::packets::{wire_id, WirePacket};
use crate::protocol::types::{BlockPosition, ItemStack, Vec3};

/// Update block flags
pub mod update_block_flag {
    pub const NONE: u32 = 0;
    pub const NEIGHBORS: u32 = 1 << 0;
    pub const NETWORK: u32 = 1 << 1;
    pub const NO_GRAPHIC: u32 = 1 << 2;
    pub const PRIORITY: u32 = 1 << 3;
}

/// Level event (particles, world sounds)
#[derive(Debug, Clone, PartialEq)]
pub struct LevelEventPacket {
    pub event_id: i32,
    pub position: Vec3,
    pub event_data: i32,
}

impl WirePacket for LevelEventPacket {
    const WIRE_ID: u32 = wire_id::LEVEL_EVENT;
    const NAME: &'static str = "LevelEvent";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            event_id: buffer.read_var_i32("event_id")?,
            position: buffer.read_vec3("position")?,
            event_data: buffer.read_var_i32("event_data")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_i32(self.event_id);
        buffer.write_vec3(self.position);
        buffer.write_var_i32(self.event_data);
    }
}

/// Positional sound event
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSoundEventPacket {
    pub sound: u32,
    pub position: Vec3,
    pub extra_data: i32,
    pub entity_type: String,
    pub is_baby_mob: bool,
    pub disable_relative_volume: bool,
}

impl LevelSoundEventPacket {
    /// Create a sound event without an entity association
    pub fn new(sound: u32, position: Vec3, extra_data: i32) -> Self {
        Self {
            sound,
            position,
            extra_data,
            entity_type: ":".to_string(),
            is_baby_mob: false,
            disable_relative_volume: false,
        }
    }
}

impl WirePacket for LevelSoundEventPacket {
    const WIRE_ID: u32 = wire_id::LEVEL_SOUND_EVENT;
    const NAME: &'static str = "LevelSoundEvent";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            sound: buffer.read_var_u32("sound")?,
            position: buffer.read_vec3("position")?,
            extra_data: buffer.read_var_i32("extra_data")?,
            entity_type: buffer.read_string("entity_type")?,
            is_baby_mob: buffer.read_bool("is_baby_mob")?,
            disable_relative_volume: buffer.read_bool("disable_relative_volume")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_u32(self.sound);
        buffer.write_vec3(self.position);
        buffer.write_var_i32(self.extra_data);
        buffer.write_string(&self.entity_type);
        buffer.write_bool(self.is_baby_mob);
        buffer.write_bool(self.disable_relative_volume);
    }
}

/// Single block change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlockPacket {
    pub block_position: BlockPosition,
    pub block_runtime_id: u32,
    pub flags: u32,
    pub data_layer_id: u32,
}

impl WirePacket for UpdateBlockPacket {
    const WIRE_ID: u32 = wire_id::UPDATE_BLOCK;
    const NAME: &'static str = "UpdateBlock";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            block_position: buffer.read_block_position("block_position")?,
            block_runtime_id: buffer.read_var_u32("block_runtime_id")?,
            flags: buffer.read_var_u32("flags")?,
            data_layer_id: buffer.read_var_u32("data_layer_id")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_block_position(self.block_position);
        buffer.write_var_u32(self.block_runtime_id);
        buffer.write_var_u32(self.flags);
        buffer.write_var_u32(self.data_layer_id);
    }
}

/// Block change tied to an entity (falling blocks, pistons)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlockSyncedPacket {
    pub block: UpdateBlockPacket,
    pub actor_unique_id: u64,
    pub update_type: u64,
}

impl WirePacket for UpdateBlockSyncedPacket {
    const WIRE_ID: u32 = wire_id::UPDATE_BLOCK_SYNCED;
    const NAME: &'static str = "UpdateBlockSynced";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            block: UpdateBlockPacket::decode(buffer)?,
            actor_unique_id: buffer.read_var_u64("actor_unique_id")?,
            update_type: buffer.read_var_u64("update_type")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        self.block.encode(buffer);
        buffer.write_var_u64(self.actor_unique_id);
        buffer.write_var_u64(self.update_type);
    }
}

/// One creative inventory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreativeContentEntry {
    pub entry_id: u32,
    pub item: ItemStack,
}

/// Full creative inventory listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreativeContentPacket {
    pub entries: Vec<CreativeContentEntry>,
}

impl WirePacket for CreativeContentPacket {
    const WIRE_ID: u32 = wire_id::CREATIVE_CONTENT;
    const NAME: &'static str = "CreativeContent";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let count = buffer.read_var_u32("entries")?;
        let mut entries = Vec::new();
        for _ in 0..count {
            entries.push(CreativeContentEntry {
                entry_id: buffer.read_var_u32("entry_id")?,
                item: ItemStack::decode(buffer)?,
            });
        }
        Ok(Self { entries })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_u32(self.entries.len() as u32);
        for entry in &self.entries {
            buffer.write_var_u32(entry.entry_id);
            entry.item.encode(buffer);
        }
    }
}
