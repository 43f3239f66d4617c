//! Shared wire types
//!
//! Value types and well-known constants reused across several packets.

use bitflags::bitflags;

use crate::error::ProtocolError;
use crate::protocol::buffer::PacketBuffer;

/// Three-component float vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Integer block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

bitflags! {
    /// Player auth input flags. Bits the bridge does not name are retained.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputFlags: u64 {
        const ASCEND = 1 << 0;
        const DESCEND = 1 << 1;
        const JUMP_DOWN = 1 << 3;
        const SPRINT_DOWN = 1 << 4;
        const JUMPING = 1 << 6;
        const SNEAKING = 1 << 8;
        /// An item interaction payload follows
        const PERFORM_ITEM_INTERACTION = 1 << 32;
        /// An item stack request payload follows
        const PERFORM_ITEM_STACK_REQUEST = 1 << 33;
        /// A block action list follows
        const PERFORM_BLOCK_ACTIONS = 1 << 34;
        /// Vehicle info follows (1.20.60 onward)
        const IN_CLIENT_PREDICTED_VEHICLE = 1 << 37;

        const _ = !0;
    }
}

impl InputFlags {
    /// Flags that mirror the presence of an optional payload
    pub const PAYLOAD_FLAGS: Self = Self::PERFORM_ITEM_INTERACTION
        .union(Self::PERFORM_ITEM_STACK_REQUEST)
        .union(Self::PERFORM_BLOCK_ACTIONS)
        .union(Self::IN_CLIENT_PREDICTED_VEHICLE);
}

/// Play mode values
pub mod play_mode {
    pub const NORMAL: u32 = 0;
    pub const TEATIME: u32 = 1;
    pub const SCREEN: u32 = 2;
    pub const VIEWER: u32 = 3;
    pub const VR: u32 = 4;
    pub const PLACEMENT: u32 = 5;
}

/// Level sound event ids
pub mod sound_event {
    pub const ITEM_USE_ON: u32 = 0;
    pub const HIT: u32 = 1;
    pub const STEP: u32 = 2;
    pub const JUMP: u32 = 4;
    pub const BREAK: u32 = 5;
    pub const PLACE: u32 = 6;
    pub const FALL: u32 = 9;
    pub const LAND: u32 = 35;
}

/// Level event ids
pub mod level_event {
    pub const SOUND_CLICK: i32 = 1000;
    pub const PARTICLE_DESTROY: i32 = 2001;
    pub const PARTICLE_PUNCH_BLOCK: i32 = 2014;
    /// Or'd with a particle id to spawn that particle
    pub const ADD_PARTICLE_MASK: i32 = 0x4000;
}

/// Particle ids
pub mod particle {
    pub const TERRAIN: i32 = 20;
}

/// Single inventory item as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemStack {
    pub id: i32,
    pub meta: u32,
    pub count: i16,
    pub block_runtime_id: i32,
    pub extra_data: Vec<u8>,
}

impl ItemStack {
    /// The empty stack (air)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether this stack is empty
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }

    pub fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let id = buffer.read_var_i32("item.id")?;
        if id == 0 {
            return Ok(Self::empty());
        }
        Ok(Self {
            id,
            count: buffer.read_lshort("item.count")?,
            meta: buffer.read_var_u32("item.meta")?,
            block_runtime_id: buffer.read_var_i32("item.block_runtime_id")?,
            extra_data: buffer.read_byte_string("item.extra_data")?,
        })
    }

    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_i32(self.id);
        if self.is_empty() {
            return;
        }
        buffer.write_lshort(self.count);
        buffer.write_var_u32(self.meta);
        buffer.write_var_i32(self.block_runtime_id);
        buffer.write_byte_string(&self.extra_data);
    }
}

/// Modifier applied to an entity attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeModifier {
    pub id: String,
    pub name: String,
    pub amount: f32,
    pub operation: i32,
    pub operand: i32,
    pub serializable: bool,
}

impl AttributeModifier {
    pub fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: buffer.read_string("modifier.id")?,
            name: buffer.read_string("modifier.name")?,
            amount: buffer.read_lfloat("modifier.amount")?,
            operation: buffer.read_lint("modifier.operation")?,
            operand: buffer.read_lint("modifier.operand")?,
            serializable: buffer.read_bool("modifier.serializable")?,
        })
    }

    pub fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_string(&self.id);
        buffer.write_string(&self.name);
        buffer.write_lfloat(self.amount);
        buffer.write_lint(self.operation);
        buffer.write_lint(self.operand);
        buffer.write_bool(self.serializable);
    }
}
