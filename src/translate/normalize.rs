//! Packet construction normalizer
//!
//! Upgrades a base packet into its versioned counterpart by extracting the
//! base packet's fields into an ordered argument set and feeding that set to
//! the versioned type's constructor. Nested payloads are copied field by
//! field into the versioned type's own representations.

use crate::error::BridgeError;
use crate::protocol::attributes::{
    UpdateAttributesPacket, VersionedAttribute, VersionedUpdateAttributes,
};
use crate::protocol::auth_input::{AuthInputArgs, PlayerAuthInputPacket};
use crate::protocol::versioned::{VersionedItemInteractionData, VersionedPlayerAuthInput};

/// A versioned packet that can be built from its base packet
pub trait Normalize: Sized {
    /// The base packet this type overrides
    type Base;

    /// Ordered constructor arguments; absent parts are explicit `None`s
    type Arguments;

    /// Copy every field of `base` into a fresh argument set
    fn extract_arguments(base: &Self::Base) -> Self::Arguments;

    /// Build an instance from an argument set
    fn construct(arguments: Self::Arguments) -> Result<Self, BridgeError>;

    /// Extract then construct
    fn upgrade(base: &Self::Base) -> Result<Self, BridgeError> {
        Self::construct(Self::extract_arguments(base))
    }
}

impl Normalize for VersionedPlayerAuthInput {
    type Base = PlayerAuthInputPacket;
    type Arguments = AuthInputArgs<VersionedItemInteractionData>;

    fn extract_arguments(base: &PlayerAuthInputPacket) -> Self::Arguments {
        AuthInputArgs {
            position: base.position(),
            pitch: base.pitch(),
            yaw: base.yaw(),
            head_yaw: base.head_yaw(),
            move_vec_x: base.move_vec_x(),
            move_vec_z: base.move_vec_z(),
            input_flags: base.input_flags(),
            input_mode: base.input_mode(),
            play_mode: base.play_mode(),
            interaction_mode: base.interaction_mode(),
            vr_gaze_direction: base.vr_gaze_direction(),
            tick: base.tick(),
            delta: base.delta(),
            item_interaction: base
                .item_interaction()
                .map(VersionedItemInteractionData::from),
            item_stack_request: base.item_stack_request().cloned(),
            block_actions: base.block_actions().map(<[_]>::to_vec),
            vehicle_info: base.vehicle_info().copied(),
            analog_move_vec_x: base.analog_move_vec_x(),
            analog_move_vec_z: base.analog_move_vec_z(),
        }
    }

    fn construct(arguments: Self::Arguments) -> Result<Self, BridgeError> {
        Ok(VersionedPlayerAuthInput::create(arguments)?)
    }
}

impl Normalize for VersionedUpdateAttributes {
    type Base = UpdateAttributesPacket;
    /// Actor runtime id, entries, tick
    type Arguments = (u64, Vec<VersionedAttribute>, u64);

    fn extract_arguments(base: &UpdateAttributesPacket) -> Self::Arguments {
        let entries = base
            .entries
            .iter()
            .map(|entry| VersionedAttribute {
                id: entry.id.clone(),
                min: entry.min,
                max: entry.max,
                current: entry.current,
                default_min: entry.default_min,
                default_max: entry.default_max,
                default: entry.default,
                modifiers: entry.modifiers.clone(),
            })
            .collect();
        (base.actor_runtime_id, entries, base.tick)
    }

    fn construct(arguments: Self::Arguments) -> Result<Self, BridgeError> {
        let (actor_runtime_id, entries, tick) = arguments;
        Ok(Self {
            actor_runtime_id,
            entries,
            tick,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructionError;
    use crate::protocol::attributes::UpdateAttribute;
    use crate::protocol::auth_input::{
        block_action_type, BlockAction, ItemInteractionData, UseItemTransactionData, VehicleInfo,
    };
    use crate::protocol::types::{play_mode, BlockPosition, InputFlags, ItemStack, Vec3};

    fn base_input() -> PlayerAuthInputPacket {
        let mut args = AuthInputArgs::movement(Vec3::new(0.0, 70.0, 0.0), 5);
        args.item_interaction = Some(ItemInteractionData {
            request_id: 3,
            request_changed_slots: Vec::new(),
            transaction: UseItemTransactionData {
                actions: Vec::new(),
                action_type: 1,
                trigger_type: 2,
                block_position: BlockPosition::new(1, 2, 3),
                face: 4,
                hotbar_slot: 5,
                item_in_hand: ItemStack::empty(),
                player_position: Vec3::new(1.0, 2.0, 3.0),
                click_position: Vec3::default(),
                block_runtime_id: 6,
                client_interact_prediction: 1,
            },
        });
        args.block_actions = Some(vec![BlockAction::WithBlockInfo {
            action_type: block_action_type::CONTINUE_DESTROY_BLOCK,
            block_position: BlockPosition::new(1, 2, 3),
            face: 0,
        }]);
        args.vehicle_info = Some(VehicleInfo {
            rotation_x: 0.5,
            rotation_z: 0.25,
            predicted_vehicle_unique_id: 12,
        });
        PlayerAuthInputPacket::create(args).unwrap()
    }

    #[test]
    fn test_auth_input_upgrade_copies_every_field() {
        let base = base_input();
        let upgraded = VersionedPlayerAuthInput::upgrade(&base).unwrap();

        assert_eq!(upgraded.position(), base.position());
        assert_eq!(upgraded.tick(), base.tick());
        assert_eq!(upgraded.input_flags(), base.input_flags());
        assert_eq!(upgraded.block_actions(), base.block_actions());
        assert_eq!(upgraded.vehicle_info(), base.vehicle_info());
        assert!(upgraded.item_stack_request().is_none());

        let transaction = &upgraded.item_interaction().unwrap().transaction;
        assert_eq!(transaction.trigger_type, 2);
        assert_eq!(transaction.block_runtime_id, 6);
    }

    #[test]
    fn test_absent_parts_stay_absent() {
        let base = PlayerAuthInputPacket::create(AuthInputArgs::movement(Vec3::default(), 1))
            .unwrap();
        let arguments = VersionedPlayerAuthInput::extract_arguments(&base);
        assert!(arguments.item_interaction.is_none());
        assert!(arguments.block_actions.is_none());
        assert!(arguments.vehicle_info.is_none());
        assert!(!VersionedPlayerAuthInput::construct(arguments)
            .unwrap()
            .has_flag(InputFlags::PERFORM_ITEM_INTERACTION));
    }

    #[test]
    fn test_construct_enforces_gaze_contract() {
        let base = base_input();
        let mut arguments = VersionedPlayerAuthInput::extract_arguments(&base);
        arguments.play_mode = play_mode::VR;
        arguments.vr_gaze_direction = None;
        assert!(matches!(
            VersionedPlayerAuthInput::construct(arguments),
            Err(BridgeError::Construction(
                ConstructionError::MissingGazeDirection
            ))
        ));
    }

    #[test]
    fn test_attribute_upgrade() {
        let base = UpdateAttributesPacket {
            actor_runtime_id: 8,
            entries: vec![UpdateAttribute {
                id: "minecraft:movement".to_string(),
                min: 0.0,
                max: 3.4e38,
                current: 0.1,
                default_min: 0.0,
                default_max: 3.4e38,
                default: 0.1,
                modifiers: Vec::new(),
            }],
            tick: 77,
        };
        let upgraded = VersionedUpdateAttributes::upgrade(&base).unwrap();
        assert_eq!(upgraded.actor_runtime_id, 8);
        assert_eq!(upgraded.tick, 77);
        assert_eq!(upgraded.entries[0].id, "minecraft:movement");
        assert_eq!(upgraded.entries[0].current, 0.1);
    }
}
