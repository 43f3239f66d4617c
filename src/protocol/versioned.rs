//! Versioned player auth input
//!
//! Override representation of the player auth input packet. The top-level
//! layout is shared with the base packet through [`AuthInput`]; what differs
//! is the nested use-item transaction, whose trigger type and interact
//! prediction fields only exist from 1.21.20 onward. Older peers get both
//! synthesized as zero on decode.

use crate::error::ProtocolError;
use crate::protocol::auth_input::{
    read_changed_slots, read_inventory_actions, write_changed_slots, write_inventory_actions,
    AuthInput, InteractionPayload, InventoryAction, ItemInteractionData, RequestChangedSlot,
    UseItemTransactionData,
};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::packets::{wire_id, VersionedPacket};
use crate::protocol::revision::ProtocolRevision;
use crate::protocol::schema::{transaction, Layout};
use crate::protocol::types::{BlockPosition, ItemStack, Vec3};

/// Use-item transaction that lays itself out per revision
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedUseItemTransactionData {
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

impl VersionedUseItemTransactionData {
    pub fn decode(
        buffer: &mut PacketBuffer,
        revision: ProtocolRevision,
    ) -> Result<Self, ProtocolError> {
        let layout = Layout::at(revision);
        let actions = read_inventory_actions(buffer)?;
        let action_type = buffer.read_var_u32("transaction.action_type")?;
        let trigger_type = if transaction::TRIGGER_TYPE.is_open(&layout) {
            buffer.read_var_u32("transaction.trigger_type")?
        } else {
            0
        };
        let block_position = buffer.read_block_position("transaction.block_position")?;
        let face = buffer.read_var_i32("transaction.face")?;
        let hotbar_slot = buffer.read_var_i32("transaction.hotbar_slot")?;
        let item_in_hand = ItemStack::decode(buffer)?;
        let player_position = buffer.read_vec3("transaction.player_position")?;
        let click_position = buffer.read_vec3("transaction.click_position")?;
        let block_runtime_id = buffer.read_var_u32("transaction.block_runtime_id")?;
        let client_interact_prediction =
            if transaction::CLIENT_INTERACT_PREDICTION.is_open(&layout) {
                buffer.read_var_u32("transaction.prediction")?
            } else {
                0
            };

        Ok(Self {
            actions,
            action_type,
            trigger_type,
            block_position,
            face,
            hotbar_slot,
            item_in_hand,
            player_position,
            click_position,
            block_runtime_id,
            client_interact_prediction,
        })
    }

    pub fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        let layout = Layout::at(revision);
        write_inventory_actions(buffer, &self.actions);
        buffer.write_var_u32(self.action_type);
        if transaction::TRIGGER_TYPE.is_open(&layout) {
            buffer.write_var_u32(self.trigger_type);
        }
        buffer.write_block_position(self.block_position);
        buffer.write_var_i32(self.face);
        buffer.write_var_i32(self.hotbar_slot);
        self.item_in_hand.encode(buffer);
        buffer.write_vec3(self.player_position);
        buffer.write_vec3(self.click_position);
        buffer.write_var_u32(self.block_runtime_id);
        if transaction::CLIENT_INTERACT_PREDICTION.is_open(&layout) {
            buffer.write_var_u32(self.client_interact_prediction);
        }
    }
}

impl From<&UseItemTransactionData> for VersionedUseItemTransactionData {
    fn from(base: &UseItemTransactionData) -> Self {
        Self {
            actions: base.actions.clone(),
            action_type: base.action_type,
            trigger_type: base.trigger_type,
            block_position: base.block_position,
            face: base.face,
            hotbar_slot: base.hotbar_slot,
            item_in_hand: base.item_in_hand.clone(),
            player_position: base.player_position,
            click_position: base.click_position,
            block_runtime_id: base.block_runtime_id,
            client_interact_prediction: base.client_interact_prediction,
        }
    }
}

/// Item interaction payload that lays itself out per revision
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedItemInteractionData {
    pub request_id: i32,
    pub request_changed_slots: Vec<RequestChangedSlot>,
    pub transaction: VersionedUseItemTransactionData,
}

impl InteractionPayload for VersionedItemInteractionData {
    fn decode(buffer: &mut PacketBuffer, revision: ProtocolRevision) -> Result<Self, ProtocolError> {
        let request_id = buffer.read_var_i32("interaction.request_id")?;
        let request_changed_slots = if request_id != 0 {
            read_changed_slots(buffer)?
        } else {
            Vec::new()
        };
        Ok(Self {
            request_id,
            request_changed_slots,
            transaction: VersionedUseItemTransactionData::decode(buffer, revision)?,
        })
    }

    fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        buffer.write_var_i32(self.request_id);
        if self.request_id != 0 {
            write_changed_slots(buffer, &self.request_changed_slots);
        }
        self.transaction.encode(buffer, revision);
    }
}

impl From<&ItemInteractionData> for VersionedItemInteractionData {
    fn from(base: &ItemInteractionData) -> Self {
        Self {
            request_id: base.request_id,
            request_changed_slots: base.request_changed_slots.clone(),
            transaction: VersionedUseItemTransactionData::from(&base.transaction),
        }
    }
}

/// Override representation of the player auth input packet
pub type VersionedPlayerAuthInput = AuthInput<VersionedItemInteractionData>;

impl VersionedPacket for VersionedPlayerAuthInput {
    const WIRE_ID: u32 = wire_id::PLAYER_AUTH_INPUT;
    const NAME: &'static str = "PlayerAuthInput";

    fn decode(
        buffer: &mut PacketBuffer,
        revision: ProtocolRevision,
    ) -> Result<Self, ProtocolError> {
        Self::decode_at(buffer, revision)
    }

    fn encode(&self, buffer: &mut PacketBuffer, revision: ProtocolRevision) {
        self.encode_at(buffer, revision)
    }
}
