//! Player auth input
//!
//! The client's per-tick movement and interaction report. Most of the
//! payload is optional: each optional part is present iff its bit is set in
//! the input flags (or, for the VR gaze direction, iff the play mode is VR).
//!
//! [`AuthInput`] carries the whole field set and owns the single layout
//! codec. It is generic over the item interaction payload so that the base
//! packet ([`PlayerAuthInputPacket`]) and its versioned override share the
//! same encode/decode rules but keep their own nested representations.

use std::fmt;

use crate::error::{ConstructionError, ProtocolError};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::packets::{wire_id, WirePacket};
use crate::protocol::revision::ProtocolRevision;
use crate::protocol::schema::{auth_input, Layout};
use crate::protocol::types::{play_mode, BlockPosition, InputFlags, ItemStack, Vec3};

/// Block action types
pub mod block_action_type {
    pub const START_BREAK: i32 = 0;
    pub const ABORT_BREAK: i32 = 1;
    pub const STOP_BREAK: i32 = 2;
    pub const CRACK_BREAK: i32 = 18;
    pub const PREDICT_DESTROY_BLOCK: i32 = 26;
    pub const CONTINUE_DESTROY_BLOCK: i32 = 27;
}

/// Use-item transaction action types
pub mod use_item_action {
    pub const CLICK_BLOCK: u32 = 0;
    pub const CLICK_AIR: u32 = 1;
    pub const BREAK_BLOCK: u32 = 2;
}

/// A block the client interacted with during the tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    StopBreak,
    WithBlockInfo {
        action_type: i32,
        block_position: BlockPosition,
        face: i32,
    },
}

impl BlockAction {
    /// The wire tag of this action
    pub fn action_type(&self) -> i32 {
        match self {
            BlockAction::StopBreak => block_action_type::STOP_BREAK,
            BlockAction::WithBlockInfo { action_type, .. } => *action_type,
        }
    }

    /// Whether an action type carries a block position and face
    pub fn has_block_info(action_type: i32) -> bool {
        matches!(
            action_type,
            block_action_type::START_BREAK
                | block_action_type::ABORT_BREAK
                | block_action_type::CRACK_BREAK
                | block_action_type::PREDICT_DESTROY_BLOCK
                | block_action_type::CONTINUE_DESTROY_BLOCK
        )
    }

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let action_type = buffer.read_var_i32("block_action.type")?;
        if Self::has_block_info(action_type) {
            Ok(BlockAction::WithBlockInfo {
                action_type,
                block_position: buffer.read_signed_block_position("block_action.position")?,
                face: buffer.read_var_i32("block_action.face")?,
            })
        } else if action_type == block_action_type::STOP_BREAK {
            Ok(BlockAction::StopBreak)
        } else {
            Err(ProtocolError::UnknownBlockAction(action_type))
        }
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_i32(self.action_type());
        if let BlockAction::WithBlockInfo {
            block_position,
            face,
            ..
        } = self
        {
            buffer.write_signed_block_position(*block_position);
            buffer.write_var_i32(*face);
        }
    }
}

fn read_block_actions(buffer: &mut PacketBuffer) -> Result<Vec<BlockAction>, ProtocolError> {
    let count = buffer.read_var_i32("block_actions")?;
    if count < 0 {
        return Err(ProtocolError::InvalidValue {
            field: "block_actions",
            value: format!("negative count {}", count),
        });
    }
    let mut actions = Vec::new();
    for _ in 0..count {
        actions.push(BlockAction::decode(buffer)?);
    }
    Ok(actions)
}

fn write_block_actions(buffer: &mut PacketBuffer, actions: &[BlockAction]) {
    buffer.write_var_i32(actions.len() as i32);
    for action in actions {
        action.encode(buffer);
    }
}

/// Client-predicted vehicle state (1.20.60 onward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleInfo {
    pub rotation_x: f32,
    pub rotation_z: f32,
    pub predicted_vehicle_unique_id: i64,
}

impl VehicleInfo {
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            rotation_x: buffer.read_lfloat("vehicle.rotation_x")?,
            rotation_z: buffer.read_lfloat("vehicle.rotation_z")?,
            predicted_vehicle_unique_id: buffer.read_var_i64("vehicle.unique_id")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_lfloat(self.rotation_x);
        buffer.write_lfloat(self.rotation_z);
        buffer.write_var_i64(self.predicted_vehicle_unique_id);
    }
}

/// Slot reference inside an item stack request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRequestSlot {
    pub container_id: u8,
    pub slot_id: u8,
    pub stack_id: i32,
}

impl StackRequestSlot {
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            container_id: buffer.read_u8("slot.container_id")?,
            slot_id: buffer.read_u8("slot.slot_id")?,
            stack_id: buffer.read_var_i32("slot.stack_id")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_u8(self.container_id);
        buffer.write_u8(self.slot_id);
        buffer.write_var_i32(self.stack_id);
    }
}

/// Item stack request action type tags
pub mod stack_request_action {
    pub const TAKE: u8 = 0;
    pub const PLACE: u8 = 1;
    pub const SWAP: u8 = 2;
    pub const DROP: u8 = 3;
    pub const DESTROY: u8 = 4;
    pub const CONSUME: u8 = 5;
}

/// One step of an item stack request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackRequestAction {
    Take {
        count: u8,
        source: StackRequestSlot,
        destination: StackRequestSlot,
    },
    Place {
        count: u8,
        source: StackRequestSlot,
        destination: StackRequestSlot,
    },
    Swap {
        source: StackRequestSlot,
        destination: StackRequestSlot,
    },
    Drop {
        count: u8,
        source: StackRequestSlot,
        randomly: bool,
    },
    Destroy {
        count: u8,
        source: StackRequestSlot,
    },
    Consume {
        count: u8,
        source: StackRequestSlot,
    },
}

impl StackRequestAction {
    pub fn type_id(&self) -> u8 {
        match self {
            StackRequestAction::Take { .. } => stack_request_action::TAKE,
            StackRequestAction::Place { .. } => stack_request_action::PLACE,
            StackRequestAction::Swap { .. } => stack_request_action::SWAP,
            StackRequestAction::Drop { .. } => stack_request_action::DROP,
            StackRequestAction::Destroy { .. } => stack_request_action::DESTROY,
            StackRequestAction::Consume { .. } => stack_request_action::CONSUME,
        }
    }

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let type_id = buffer.read_u8("stack_request.action")?;
        let action = match type_id {
            stack_request_action::TAKE | stack_request_action::PLACE => {
                let count = buffer.read_u8("stack_request.count")?;
                let source = StackRequestSlot::decode(buffer)?;
                let destination = StackRequestSlot::decode(buffer)?;
                if type_id == stack_request_action::TAKE {
                    StackRequestAction::Take {
                        count,
                        source,
                        destination,
                    }
                } else {
                    StackRequestAction::Place {
                        count,
                        source,
                        destination,
                    }
                }
            }
            stack_request_action::SWAP => StackRequestAction::Swap {
                source: StackRequestSlot::decode(buffer)?,
                destination: StackRequestSlot::decode(buffer)?,
            },
            stack_request_action::DROP => StackRequestAction::Drop {
                count: buffer.read_u8("stack_request.count")?,
                source: StackRequestSlot::decode(buffer)?,
                randomly: buffer.read_bool("stack_request.randomly")?,
            },
            stack_request_action::DESTROY => StackRequestAction::Destroy {
                count: buffer.read_u8("stack_request.count")?,
                source: StackRequestSlot::decode(buffer)?,
            },
            stack_request_action::CONSUME => StackRequestAction::Consume {
                count: buffer.read_u8("stack_request.count")?,
                source: StackRequestSlot::decode(buffer)?,
            },
            other => return Err(ProtocolError::UnknownStackRequestAction(other)),
        };
        Ok(action)
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_u8(self.type_id());
        match self {
            StackRequestAction::Take {
                count,
                source,
                destination,
            }
            | StackRequestAction::Place {
                count,
                source,
                destination,
            } => {
                buffer.write_u8(*count);
                source.encode(buffer);
                destination.encode(buffer);
            }
            StackRequestAction::Swap {
                source,
                destination,
            } => {
                source.encode(buffer);
                destination.encode(buffer);
            }
            StackRequestAction::Drop {
                count,
                source,
                randomly,
            } => {
                buffer.write_u8(*count);
                source.encode(buffer);
                buffer.write_bool(*randomly);
            }
            StackRequestAction::Destroy { count, source }
            | StackRequestAction::Consume { count, source } => {
                buffer.write_u8(*count);
                source.encode(buffer);
            }
        }
    }
}

/// Inventory manipulation batched into the input packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStackRequest {
    pub request_id: i32,
    pub actions: Vec<StackRequestAction>,
    pub filter_strings: Vec<String>,
    pub filter_string_cause: i32,
}

impl ItemStackRequest {
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let request_id = buffer.read_var_i32("stack_request.id")?;
        let count = buffer.read_var_u32("stack_request.actions")?;
        let mut actions = Vec::new();
        for _ in 0..count {
            actions.push(StackRequestAction::decode(buffer)?);
        }
        let count = buffer.read_var_u32("stack_request.filter_strings")?;
        let mut filter_strings = Vec::new();
        for _ in 0..count {
            filter_strings.push(buffer.read_string("stack_request.filter_string")?);
        }
        Ok(Self {
            request_id,
            actions,
            filter_strings,
            filter_string_cause: buffer.read_lint("stack_request.filter_cause")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        buffer.write_var_i32(self.request_id);
        buffer.write_var_u32(self.actions.len() as u32);
        for action in &self.actions {
            action.encode(buffer);
        }
        buffer.write_var_u32(self.filter_strings.len() as u32);
        for filter in &self.filter_strings {
            buffer.write_string(filter);
        }
        buffer.write_lint(self.filter_string_cause);
    }
}

/// Where an inventory action's items come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventorySource {
    Container { window_id: i32 },
    Global,
    World { flags: u32 },
    Creative,
    Todo { window_id: i32 },
}

impl InventorySource {
    const CONTAINER: u32 = 0;
    const GLOBAL: u32 = 1;
    const WORLD: u32 = 2;
    const CREATIVE: u32 = 3;
    const TODO: u32 = 99999;

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        let source_type = buffer.read_var_u32("action.source_type")?;
        match source_type {
            Self::CONTAINER => Ok(InventorySource::Container {
                window_id: buffer.read_var_i32("action.window_id")?,
            }),
            Self::GLOBAL => Ok(InventorySource::Global),
            Self::WORLD => Ok(InventorySource::World {
                flags: buffer.read_var_u32("action.source_flags")?,
            }),
            Self::CREATIVE => Ok(InventorySource::Creative),
            Self::TODO => Ok(InventorySource::Todo {
                window_id: buffer.read_var_i32("action.window_id")?,
            }),
            other => Err(ProtocolError::UnknownInventorySource(other)),
        }
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        match self {
            InventorySource::Container { window_id } => {
                buffer.write_var_u32(Self::CONTAINER);
                buffer.write_var_i32(*window_id);
            }
            InventorySource::Global => buffer.write_var_u32(Self::GLOBAL),
            InventorySource::World { flags } => {
                buffer.write_var_u32(Self::WORLD);
                buffer.write_var_u32(*flags);
            }
            InventorySource::Creative => buffer.write_var_u32(Self::CREATIVE),
            InventorySource::Todo { window_id } => {
                buffer.write_var_u32(Self::TODO);
                buffer.write_var_i32(*window_id);
            }
        }
    }
}

/// Single slot change inside a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryAction {
    pub source: InventorySource,
    pub inventory_slot: u32,
    pub old_item: ItemStack,
    pub new_item: ItemStack,
}

pub(crate) fn read_inventory_actions(
    buffer: &mut PacketBuffer,
) -> Result<Vec<InventoryAction>, ProtocolError> {
    let count = buffer.read_var_u32("transaction.actions")?;
    let mut actions = Vec::new();
    for _ in 0..count {
        actions.push(InventoryAction {
            source: InventorySource::decode(buffer)?,
            inventory_slot: buffer.read_var_u32("action.inventory_slot")?,
            old_item: ItemStack::decode(buffer)?,
            new_item: ItemStack::decode(buffer)?,
        });
    }
    Ok(actions)
}

pub(crate) fn write_inventory_actions(buffer: &mut PacketBuffer, actions: &[InventoryAction]) {
    buffer.write_var_u32(actions.len() as u32);
    for action in actions {
        action.source.encode(buffer);
        buffer.write_var_u32(action.inventory_slot);
        action.old_item.encode(buffer);
        action.new_item.encode(buffer);
    }
}

/// Container slots the client expects to change as a result of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestChangedSlot {
    pub container_id: u8,
    pub slots: Vec<u8>,
}

pub(crate) fn read_changed_slots(
    buffer: &mut PacketBuffer,
) -> Result<Vec<RequestChangedSlot>, ProtocolError> {
    let count = buffer.read_var_u32("changed_slots")?;
    let mut changed = Vec::new();
    for _ in 0..count {
        let container_id = buffer.read_u8("changed_slots.container_id")?;
        let slot_count = buffer.read_var_u32("changed_slots.slots")?;
        let mut slots = Vec::new();
        for _ in 0..slot_count {
            slots.push(buffer.read_u8("changed_slots.slot")?);
        }
        changed.push(RequestChangedSlot {
            container_id,
            slots,
        });
    }
    Ok(changed)
}

pub(crate) fn write_changed_slots(buffer: &mut PacketBuffer, changed: &[RequestChangedSlot]) {
    buffer.write_var_u32(changed.len() as u32);
    for entry in changed {
        buffer.write_u8(entry.container_id);
        buffer.write_var_u32(entry.slots.len() as u32);
        for slot in &entry.slots {
            buffer.write_u8(*slot);
        }
    }
}

/// Use-item transaction in the canonical layout
#[derive(Debug, Clone, PartialEq)]
pub struct UseItemTransactionData {
    pub actions: Vec<InventoryAction>,
    pub action_type: u32,
    pub trigger_type: u32,
    pub block_position: BlockPosition,
    pub face: i32,
    pub hotbar_slot: i32,
    pub item_in_hand: ItemStack,
    pub player_position: Vec3,
    pub click_position: Vec3,
    pub block_runtime_id: u32,
    pub client_interact_prediction: u32,
}

impl UseItemTransactionData {
    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Ok(Self {
            actions: read_inventory_actions(buffer)?,
            action_type: buffer.read_var_u32("transaction.action_type")?,
            trigger_type: buffer.read_var_u32("transaction.trigger_type")?,
            block_position: buffer.read_block_position("transaction.block_position")?,
            face: buffer.read_var_i32("transaction.face")?,
            hotbar_slot: buffer.read_var_i32("transaction.hotbar_slot")?,
            item_in_hand: ItemStack::decode(buffer)?,
            player_position: buffer.read_vec3("transaction.player_position")?,
            click_position: buffer.read_vec3("transaction.click_position")?,
            block_runtime_id: buffer.read_var_u32("transaction.block_runtime_id")?,
            client_interact_prediction: buffer.read_var_u32("transaction.prediction")?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        write_inventory_actions(buffer, &self.actions);
        buffer.write_var_u32(self.action_type);
        buffer.write_var_u32(self.trigger_type);
        buffer.write_block_position(self.block_position);
        buffer.write_var_i32(self.face);
        buffer.write_var_i32(self.hotbar_slot);
        self.item_in_hand.encode(buffer);
        buffer.write_vec3(self.player_position);
        buffer.write_vec3(self.click_position);
        buffer.write_var_u32(self.block_runtime_id);
        buffer.write_var_u32(self.client_interact_prediction);
    }
}

/// Item interaction payload codec, implemented by each representation
pub trait InteractionPayload: Sized + Clone + PartialEq + fmt::Debug {
    fn decode(buffer: &mut PacketBuffer, revision: ProtocolRevision)
        -> Result<Self, ProtocolError>;

    fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision);
}

/// Item interaction payload in the canonical layout
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInteractionData {
    pub request_id: i32,
    pub request_changed_slots: Vec<RequestChangedSlot>,
    pub transaction: UseItemTransactionData,
}

impl InteractionPayload for ItemInteractionData {
    fn decode(buffer: &mut PacketBuffer, _revision: ProtocolRevision) -> Result<Self, ProtocolError> {
        let request_id = buffer.read_var_i32("interaction.request_id")?;
        let request_changed_slots = if request_id != 0 {
            read_changed_slots(buffer)?
        } else {
            Vec::new()
        };
        Ok(Self {
            request_id,
            request_changed_slots,
            transaction: UseItemTransactionData::decode(buffer)?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer, _revision: ProtocolRevision) {
        buffer.write_var_i32(self.request_id);
        if self.request_id != 0 {
            write_changed_slots(buffer, &self.request_changed_slots);
        }
        self.transaction.encode(buffer);
    }
}

/// Ordered construction arguments for an auth input packet. Absent optional
/// parts are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthInputArgs<I> {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub move_vec_x: f32,
    pub move_vec_z: f32,
    pub input_flags: InputFlags,
    pub input_mode: u32,
    pub play_mode: u32,
    pub interaction_mode: u32,
    pub vr_gaze_direction: Option<Vec3>,
    pub tick: u64,
    pub delta: Vec3,
    pub item_interaction: Option<I>,
    pub item_stack_request: Option<ItemStackRequest>,
    pub block_actions: Option<Vec<BlockAction>>,
    pub vehicle_info: Option<VehicleInfo>,
    pub analog_move_vec_x: f32,
    pub analog_move_vec_z: f32,
}

impl<I> AuthInputArgs<I> {
    /// Arguments for a plain movement tick with no optional parts
    pub fn movement(position: Vec3, tick: u64) -> Self {
        Self {
            position,
            pitch: 0.0,
            yaw: 0.0,
            head_yaw: 0.0,
            move_vec_x: 0.0,
            move_vec_z: 0.0,
            input_flags: InputFlags::empty(),
            input_mode: 0,
            play_mode: play_mode::NORMAL,
            interaction_mode: 0,
            vr_gaze_direction: None,
            tick,
            delta: Vec3::default(),
            item_interaction: None,
            item_stack_request: None,
            block_actions: None,
            vehicle_info: None,
            analog_move_vec_x: 0.0,
            analog_move_vec_z: 0.0,
        }
    }

    /// Input flags with every payload bit derived from payload presence
    fn consistent_flags(&self) -> InputFlags {
        let mut flags = self.input_flags.difference(InputFlags::PAYLOAD_FLAGS);
        flags.set(
            InputFlags::PERFORM_ITEM_INTERACTION,
            self.item_interaction.is_some(),
        );
        flags.set(
            InputFlags::PERFORM_ITEM_STACK_REQUEST,
            self.item_stack_request.is_some(),
        );
        flags.set(
            InputFlags::PERFORM_BLOCK_ACTIONS,
            self.block_actions.is_some(),
        );
        flags.set(
            InputFlags::IN_CLIENT_PREDICTED_VEHICLE,
            self.vehicle_info.is_some(),
        );
        flags
    }
}

/// Player auth input packet, generic over its interaction representation.
/// Only constructible through [`AuthInput::create`] or a decode, so its
/// flags always agree with its optional payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthInput<I> {
    args: AuthInputArgs<I>,
}

/// Base (canonical layout) player auth input packet
pub type PlayerAuthInputPacket = AuthInput<ItemInteractionData>;

impl<I: InteractionPayload> AuthInput<I> {
    /// Build a packet, rejecting a VR play mode without a gaze direction
    pub fn create(mut args: AuthInputArgs<I>) -> Result<Self, ConstructionError> {
        if args.play_mode == play_mode::VR && args.vr_gaze_direction.is_none() {
            return Err(ConstructionError::MissingGazeDirection);
        }
        if args.play_mode != play_mode::VR {
            args.vr_gaze_direction = None;
        }
        args.input_flags = args.consistent_flags();
        Ok(Self { args })
    }

    pub fn position(&self) -> Vec3 {
        self.args.position
    }

    pub fn pitch(&self) -> f32 {
        self.args.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.args.yaw
    }

    pub fn head_yaw(&self) -> f32 {
        self.args.head_yaw
    }

    pub fn move_vec_x(&self) -> f32 {
        self.args.move_vec_x
    }

    pub fn move_vec_z(&self) -> f32 {
        self.args.move_vec_z
    }

    pub fn input_flags(&self) -> InputFlags {
        self.args.input_flags
    }

    pub fn input_mode(&self) -> u32 {
        self.args.input_mode
    }

    pub fn play_mode(&self) -> u32 {
        self.args.play_mode
    }

    pub fn interaction_mode(&self) -> u32 {
        self.args.interaction_mode
    }

    pub fn vr_gaze_direction(&self) -> Option<Vec3> {
        self.args.vr_gaze_direction
    }

    pub fn tick(&self) -> u64 {
        self.args.tick
    }

    pub fn delta(&self) -> Vec3 {
        self.args.delta
    }

    pub fn item_interaction(&self) -> Option<&I> {
        self.args.item_interaction.as_ref()
    }

    pub fn item_stack_request(&self) -> Option<&ItemStackRequest> {
        self.args.item_stack_request.as_ref()
    }

    pub fn block_actions(&self) -> Option<&[BlockAction]> {
        self.args.block_actions.as_deref()
    }

    pub fn vehicle_info(&self) -> Option<&VehicleInfo> {
        self.args.vehicle_info.as_ref()
    }

    pub fn analog_move_vec_x(&self) -> f32 {
        self.args.analog_move_vec_x
    }

    pub fn analog_move_vec_z(&self) -> f32 {
        self.args.analog_move_vec_z
    }

    /// Check an input flag
    pub fn has_flag(&self, flag: InputFlags) -> bool {
        self.args.input_flags.contains(flag)
    }

    /// Borrow the full argument set
    pub fn arguments(&self) -> &AuthInputArgs<I> {
        &self.args
    }

    /// Decode the payload as laid out by `revision`
    pub(crate) fn decode_at(
        buffer: &mut PacketBuffer,
        revision: ProtocolRevision,
    ) -> Result<Self, ProtocolError> {
        let pitch = buffer.read_lfloat("pitch")?;
        let yaw = buffer.read_lfloat("yaw")?;
        let position = buffer.read_vec3("position")?;
        let move_vec_x = buffer.read_lfloat("move_vec_x")?;
        let move_vec_z = buffer.read_lfloat("move_vec_z")?;
        let head_yaw = buffer.read_lfloat("head_yaw")?;
        let input_flags = InputFlags::from_bits_retain(buffer.read_var_u64("input_flags")?);
        let input_mode = buffer.read_var_u32("input_mode")?;
        let play_mode = buffer.read_var_u32("play_mode")?;
        let interaction_mode = buffer.read_var_u32("interaction_mode")?;

        let layout = Layout::at(revision)
            .with_flags(input_flags)
            .with_play_mode(play_mode);

        let vr_gaze_direction = if auth_input::VR_GAZE_DIRECTION.is_open(&layout) {
            Some(buffer.read_vec3("vr_gaze_direction")?)
        } else {
            None
        };
        let tick = buffer.read_var_u64("tick")?;
        let delta = buffer.read_vec3("delta")?;

        let item_interaction = if auth_input::ITEM_INTERACTION.is_open(&layout) {
            Some(I::decode(buffer, revision)?)
        } else {
            None
        };
        let item_stack_request = if auth_input::ITEM_STACK_REQUEST.is_open(&layout) {
            Some(ItemStackRequest::decode(buffer)?)
        } else {
            None
        };
        let block_actions = if auth_input::BLOCK_ACTIONS.is_open(&layout) {
            Some(read_block_actions(buffer)?)
        } else {
            None
        };
        let vehicle_info = if auth_input::VEHICLE_INFO.is_open(&layout) {
            Some(VehicleInfo::decode(buffer)?)
        } else {
            None
        };

        let mut args = AuthInputArgs {
            position,
            pitch,
            yaw,
            head_yaw,
            move_vec_x,
            move_vec_z,
            input_flags,
            input_mode,
            play_mode,
            interaction_mode,
            vr_gaze_direction,
            tick,
            delta,
            item_interaction,
            item_stack_request,
            block_actions,
            vehicle_info,
            analog_move_vec_x: buffer.read_lfloat("analog_move_vec_x")?,
            analog_move_vec_z: buffer.read_lfloat("analog_move_vec_z")?,
        };
        // A vehicle bit sent below 1.20.60 announces nothing we read
        args.input_flags = args.consistent_flags();
        Ok(Self { args })
    }

    /// Encode the payload as laid out by `revision`
    pub(crate) fn encode_at(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        let args = &self.args;
        let mut flags = args.input_flags;
        flags.set(
            InputFlags::IN_CLIENT_PREDICTED_VEHICLE,
            args.vehicle_info.is_some() && auth_input::VEHICLE_INFO.admits(revision),
        );
        let layout = Layout::at(revision)
            .with_flags(flags)
            .with_play_mode(args.play_mode);

        buffer.write_lfloat(args.pitch);
        buffer.write_lfloat(args.yaw);
        buffer.write_vec3(args.position);
        buffer.write_lfloat(args.move_vec_x);
        buffer.write_lfloat(args.move_vec_z);
        buffer.write_lfloat(args.head_yaw);
        buffer.write_var_u64(flags.bits());
        buffer.write_var_u32(args.input_mode);
        buffer.write_var_u32(args.play_mode);
        buffer.write_var_u32(args.interaction_mode);
        if auth_input::VR_GAZE_DIRECTION.is_open(&layout) {
            if let Some(gaze) = args.vr_gaze_direction {
                buffer.write_vec3(gaze);
            }
        }
        buffer.write_var_u64(args.tick);
        buffer.write_vec3(args.delta);
        if auth_input::ITEM_INTERACTION.is_open(&layout) {
            if let Some(interaction) = &args.item_interaction {
                interaction.encode(buffer, revision);
            }
        }
        if auth_input::ITEM_STACK_REQUEST.is_open(&layout) {
            if let Some(request) = &args.item_stack_request {
                request.encode(buffer);
            }
        }
        if auth_input::BLOCK_ACTIONS.is_open(&layout) {
            if let Some(actions) = &args.block_actions {
                write_block_actions(buffer, actions);
            }
        }
        if auth_input::VEHICLE_INFO.is_open(&layout) {
            if let Some(vehicle) = &args.vehicle_info {
                vehicle.encode(buffer);
            }
        }
        buffer.write_lfloat(args.analog_move_vec_x);
        buffer.write_lfloat(args.analog_move_vec_z);
    }
}

impl WirePacket for PlayerAuthInputPacket {
    const WIRE_ID: u32 = wire_id::PLAYER_AUTH_INPUT;
    const NAME: &'static str = "PlayerAuthInput";

    fn decode(buffer: &mut PacketBuffer) -> Result<Self, ProtocolError> {
        Self::decode_at(buffer, ProtocolRevision::CANONICAL)
    }

    fn encode(&self, buffer: &mut PacketBuffer) {
        self.encode_at(buffer, ProtocolRevision::CANONICAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction() -> UseItemTransactionData {
        UseItemTransactionData {
            actions: vec![InventoryAction {
                source: InventorySource::Container { window_id: 0 },
                inventory_slot: 3,
                old_item: ItemStack::empty(),
                new_item: ItemStack {
                    id: 1,
                    meta: 0,
                    count: 1,
                    block_runtime_id: 42,
                    extra_data: Vec::new(),
                },
            }],
            action_type: use_item_action::CLICK_BLOCK,
            trigger_type: 1,
            block_position: BlockPosition::new(4, 70, -4),
            face: 1,
            hotbar_slot: 3,
            item_in_hand: ItemStack::empty(),
            player_position: Vec3::new(4.5, 71.62, -3.5),
            click_position: Vec3::new(0.5, 1.0, 0.5),
            block_runtime_id: 42,
            client_interact_prediction: 1,
        }
    }

    fn full_args() -> AuthInputArgs<ItemInteractionData> {
        let mut args = AuthInputArgs::movement(Vec3::new(1.0, 65.62, 2.0), 1200);
        args.input_flags = InputFlags::JUMPING;
        args.item_interaction = Some(ItemInteractionData {
            request_id: -2,
            request_changed_slots: vec![RequestChangedSlot {
                container_id: 12,
                slots: vec![0, 1],
            }],
            transaction: transaction(),
        });
        args.item_stack_request = Some(ItemStackRequest {
            request_id: -4,
            actions: vec![
                StackRequestAction::Take {
                    count: 2,
                    source: StackRequestSlot {
                        container_id: 28,
                        slot_id: 0,
                        stack_id: 5,
                    },
                    destination: StackRequestSlot {
                        container_id: 60,
                        slot_id: 0,
                        stack_id: 0,
                    },
                },
                StackRequestAction::Drop {
                    count: 1,
                    source: StackRequestSlot {
                        container_id: 28,
                        slot_id: 1,
                        stack_id: 6,
                    },
                    randomly: false,
                },
            ],
            filter_strings: vec!["sign text".to_string()],
            filter_string_cause: 0,
        });
        args.block_actions = Some(vec![
            BlockAction::WithBlockInfo {
                action_type: block_action_type::START_BREAK,
                block_position: BlockPosition::new(4, 69, -4),
                face: 1,
            },
            BlockAction::StopBreak,
        ]);
        args.vehicle_info = Some(VehicleInfo {
            rotation_x: 10.0,
            rotation_z: -3.0,
            predicted_vehicle_unique_id: -77,
        });
        args
    }

    #[test]
    fn test_create_sets_payload_flags() {
        let packet = PlayerAuthInputPacket::create(full_args()).unwrap();
        assert!(packet.has_flag(InputFlags::PERFORM_ITEM_INTERACTION));
        assert!(packet.has_flag(InputFlags::PERFORM_ITEM_STACK_REQUEST));
        assert!(packet.has_flag(InputFlags::PERFORM_BLOCK_ACTIONS));
        assert!(packet.has_flag(InputFlags::IN_CLIENT_PREDICTED_VEHICLE));
        assert!(packet.has_flag(InputFlags::JUMPING));
    }

    #[test]
    fn test_create_clears_stale_payload_flags() {
        let mut args = AuthInputArgs::<ItemInteractionData>::movement(Vec3::default(), 1);
        args.input_flags = InputFlags::PERFORM_ITEM_INTERACTION | InputFlags::PERFORM_BLOCK_ACTIONS;
        let packet = PlayerAuthInputPacket::create(args).unwrap();
        assert!(!packet.has_flag(InputFlags::PERFORM_ITEM_INTERACTION));
        assert!(!packet.has_flag(InputFlags::PERFORM_BLOCK_ACTIONS));
        assert!(packet.item_interaction().is_none());
    }

    #[test]
    fn test_vr_without_gaze_is_rejected() {
        let mut args = AuthInputArgs::<ItemInteractionData>::movement(Vec3::default(), 1);
        args.play_mode = play_mode::VR;
        assert_eq!(
            PlayerAuthInputPacket::create(args).unwrap_err(),
            ConstructionError::MissingGazeDirection
        );
    }

    #[test]
    fn test_gaze_outside_vr_is_dropped() {
        let mut args = AuthInputArgs::<ItemInteractionData>::movement(Vec3::default(), 1);
        args.vr_gaze_direction = Some(Vec3::new(0.0, 1.0, 0.0));
        let packet = PlayerAuthInputPacket::create(args).unwrap();
        assert_eq!(packet.vr_gaze_direction(), None);
    }

    #[test]
    fn test_canonical_round_trip() {
        let mut args = full_args();
        args.play_mode = play_mode::VR;
        args.vr_gaze_direction = Some(Vec3::new(0.0, 0.0, 1.0));
        let packet = PlayerAuthInputPacket::create(args).unwrap();

        let mut buffer = packet.to_buffer();
        let decoded = PlayerAuthInputPacket::decode(&mut buffer).unwrap();
        assert_eq!(decoded, packet);
        assert!(!buffer.has_remaining());
    }

    #[test]
    fn test_unknown_block_action_fails() {
        let mut buffer = PacketBuffer::new();
        buffer.write_var_i32(1);
        buffer.write_var_i32(7);
        assert_eq!(
            read_block_actions(&mut buffer).unwrap_err(),
            ProtocolError::UnknownBlockAction(7)
        );
    }

    #[test]
    fn test_block_action_layout() {
        let mut buffer = PacketBuffer::new();
        write_block_actions(
            &mut buffer,
            &[
                BlockAction::StopBreak,
                BlockAction::WithBlockInfo {
                    action_type: block_action_type::CRACK_BREAK,
                    block_position: BlockPosition::new(-1, -60, 2),
                    face: 3,
                },
            ],
        );
        // count, stop-break tag, crack tag, three signed coordinates, face
        assert_eq!(buffer.as_bytes(), &[4, 4, 36, 1, 119, 4, 6]);
        assert_eq!(read_block_actions(&mut buffer).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_stack_request_action_fails() {
        let mut buffer = PacketBuffer::new();
        buffer.write_var_i32(-1);
        buffer.write_var_u32(1);
        buffer.write_u8(42);
        assert_eq!(
            ItemStackRequest::decode(&mut buffer).unwrap_err(),
            ProtocolError::UnknownStackRequestAction(42)
        );
    }
}
