//! Identifier rewrite rules
//!
//! A [`RuleSet`] maps a wire type id and a [`Direction`] to the function that
//! rewrites the block identifiers embedded in that packet. Rewrites take the
//! packet by value and hand back a new one, so a lookup miss part way
//! through never leaves a half-translated packet behind.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::error::TranslationError;
use crate::protocol::packets::{wire_id, Packet};
use crate::protocol::revision::{ProtocolRevision, RevisionRegistry};
use crate::protocol::types::{level_event, particle, sound_event};
use crate::protocol::world::{CreativeContentEntry, CreativeContentPacket};
use crate::translate::mapping::{BlockStateMapping, IdTranslator};

/// Packet travel direction relative to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server
    Inbound,
    /// Server to client
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}

/// What the pipeline did with a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// At least one identifier was replaced
    Rewritten,
    /// Nothing needed replacing
    Unchanged,
    /// Translation is known to be needed but is not implemented
    PassThrough { reason: &'static str },
}

/// Identifier lookup bound to one revision and direction
#[derive(Debug, Clone, Copy)]
pub struct IdLookup<'a> {
    mapping: &'a BlockStateMapping,
    direction: Direction,
}

impl<'a> IdLookup<'a> {
    pub fn new(mapping: &'a BlockStateMapping, direction: Direction) -> Self {
        Self { mapping, direction }
    }

    pub fn revision(&self) -> ProtocolRevision {
        self.mapping.revision()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Translate one identifier the way this lookup's direction requires
    pub fn map(&self, id: u32) -> Result<u32, TranslationError> {
        match self.direction {
            Direction::Inbound => self.mapping.to_runtime_id(id),
            Direction::Outbound => self.mapping.to_version_state_id(id),
        }
    }

    /// Translate an identifier carried in a signed field
    pub fn map_signed(&self, field: &'static str, id: i32) -> Result<i32, TranslationError> {
        let unsigned = u32::try_from(id).map_err(|_| TranslationError::NegativeIdentifier {
            field,
            value: i64::from(id),
        })?;
        let mapped = self.map(unsigned)?;
        i32::try_from(mapped).map_err(|_| TranslationError::NegativeIdentifier {
            field,
            value: i64::from(mapped),
        })
    }
}

/// Rewrite function for one wire type
pub type RewriteFn =
    fn(Packet, &IdLookup<'_>) -> Result<(Packet, RewriteOutcome), TranslationError>;

/// What a rule does once it applies
#[derive(Clone, Copy)]
pub enum RuleAction {
    Rewrite(RewriteFn),
    /// Known gap; the packet is forwarded untouched
    PassThrough(&'static str),
}

impl fmt::Debug for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Rewrite(_) => write!(f, "Rewrite"),
            RuleAction::PassThrough(reason) => write!(f, "PassThrough({:?})", reason),
        }
    }
}

/// Translation rule for a wire type in one direction
#[derive(Debug, Clone, Copy)]
pub struct TranslationRule {
    pub wire_id: u32,
    pub direction: Direction,
    pub name: &'static str,
    pub action: RuleAction,
}

impl TranslationRule {
    pub fn rewrite(
        wire_id: u32,
        direction: Direction,
        name: &'static str,
        rewrite: RewriteFn,
    ) -> Self {
        Self {
            wire_id,
            direction,
            name,
            action: RuleAction::Rewrite(rewrite),
        }
    }

    pub fn pass_through(
        wire_id: u32,
        direction: Direction,
        name: &'static str,
        reason: &'static str,
    ) -> Self {
        Self {
            wire_id,
            direction,
            name,
            action: RuleAction::PassThrough(reason),
        }
    }
}

/// Immutable table of translation rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<(u32, Direction), TranslationRule>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rules for every packet known to embed block identifiers
    pub fn standard() -> Self {
        Self::from_rules([
            TranslationRule::rewrite(
                wire_id::LEVEL_SOUND_EVENT,
                Direction::Inbound,
                "LevelSoundEvent",
                rewrite_sound_event,
            ),
            TranslationRule::rewrite(
                wire_id::LEVEL_SOUND_EVENT,
                Direction::Outbound,
                "LevelSoundEvent",
                rewrite_sound_event,
            ),
            TranslationRule::rewrite(
                wire_id::LEVEL_EVENT,
                Direction::Outbound,
                "LevelEvent",
                rewrite_level_event,
            ),
            TranslationRule::rewrite(
                wire_id::UPDATE_BLOCK,
                Direction::Outbound,
                "UpdateBlock",
                rewrite_update_block,
            ),
            TranslationRule::rewrite(
                wire_id::UPDATE_BLOCK_SYNCED,
                Direction::Outbound,
                "UpdateBlockSynced",
                rewrite_update_block,
            ),
            TranslationRule::rewrite(
                wire_id::CREATIVE_CONTENT,
                Direction::Outbound,
                "CreativeContent",
                rewrite_creative_content,
            ),
            TranslationRule::pass_through(
                wire_id::UPDATE_SUB_CHUNK_BLOCKS,
                Direction::Outbound,
                "UpdateSubChunkBlocks",
                "per-layer block translation needs a full layer re-encode",
            ),
            TranslationRule::pass_through(
                wire_id::CRAFTING_DATA,
                Direction::Outbound,
                "CraftingData",
                "recipe translation is not implemented",
            ),
        ])
    }

    pub fn from_rules(rules: impl IntoIterator<Item = TranslationRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| ((rule.wire_id, rule.direction), rule))
                .collect(),
        }
    }

    /// Find the rule for a wire type and direction
    pub fn lookup(&self, wire_id: u32, direction: Direction) -> Option<&TranslationRule> {
        self.rules.get(&(wire_id, direction))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rule for `packet`, if any. Sessions on a current revision
    /// already speak runtime ids and are never rewritten.
    pub fn apply(
        &self,
        packet: Packet,
        revision: ProtocolRevision,
        direction: Direction,
        registry: &RevisionRegistry,
        translator: &IdTranslator,
    ) -> Result<(Packet, RewriteOutcome), TranslationError> {
        let Some(rule) = self.lookup(packet.wire_id(), direction) else {
            return Ok((packet, RewriteOutcome::Unchanged));
        };

        if registry.is_current(revision) {
            trace!(
                packet = rule.name,
                revision = %revision,
                direction = %direction,
                "Current revision, skipping identifier rewrite"
            );
            return Ok((packet, RewriteOutcome::Unchanged));
        }

        match rule.action {
            RuleAction::PassThrough(reason) => {
                debug!(
                    packet = rule.name,
                    revision = %revision,
                    direction = %direction,
                    reason,
                    "Translation not supported, passing packet through"
                );
                Ok((packet, RewriteOutcome::PassThrough { reason }))
            }
            RuleAction::Rewrite(rewrite) => {
                let lookup = IdLookup::new(translator.mapping(revision)?, direction);
                let (packet, outcome) = rewrite(packet, &lookup)?;
                trace!(
                    packet = rule.name,
                    revision = %revision,
                    direction = %direction,
                    ?outcome,
                    "Applied identifier rewrite"
                );
                Ok((packet, outcome))
            }
        }
    }
}

/// Result for a packet whose payload the rule cannot see into
fn opaque(packet: Packet) -> (Packet, RewriteOutcome) {
    (
        packet,
        RewriteOutcome::PassThrough {
            reason: "payload is opaque",
        },
    )
}

/// Whether a sound event's extra data holds a block identifier
pub fn sound_carries_block(sound: u32, extra_data: i32) -> bool {
    match sound {
        sound_event::BREAK => extra_data != -1,
        sound_event::PLACE | sound_event::HIT | sound_event::LAND | sound_event::ITEM_USE_ON => {
            true
        }
        _ => false,
    }
}

fn rewrite_sound_event(
    packet: Packet,
    lookup: &IdLookup<'_>,
) -> Result<(Packet, RewriteOutcome), TranslationError> {
    match packet {
        Packet::LevelSoundEvent(mut event) => {
            if !sound_carries_block(event.sound, event.extra_data) {
                return Ok((Packet::LevelSoundEvent(event), RewriteOutcome::Unchanged));
            }
            event.extra_data = lookup.map_signed("extra_data", event.extra_data)?;
            Ok((Packet::LevelSoundEvent(event), RewriteOutcome::Rewritten))
        }
        other => Ok(opaque(other)),
    }
}

/// Mask for the block id in a punch-block event; the high bits carry the face
const PUNCH_BLOCK_ID_MASK: i32 = 0x00ff_ffff;

fn rewrite_level_event(
    packet: Packet,
    lookup: &IdLookup<'_>,
) -> Result<(Packet, RewriteOutcome), TranslationError> {
    match packet {
        Packet::LevelEvent(mut event) => {
            let terrain = level_event::ADD_PARTICLE_MASK | particle::TERRAIN;
            if event.event_id == level_event::PARTICLE_DESTROY || event.event_id == terrain {
                event.event_data = lookup.map_signed("event_data", event.event_data)?;
            } else if event.event_id == level_event::PARTICLE_PUNCH_BLOCK {
                event.event_data =
                    lookup.map_signed("event_data", event.event_data & PUNCH_BLOCK_ID_MASK)?;
            } else {
                return Ok((Packet::LevelEvent(event), RewriteOutcome::Unchanged));
            }
            Ok((Packet::LevelEvent(event), RewriteOutcome::Rewritten))
        }
        other => Ok(opaque(other)),
    }
}

fn rewrite_update_block(
    packet: Packet,
    lookup: &IdLookup<'_>,
) -> Result<(Packet, RewriteOutcome), TranslationError> {
    match packet {
        Packet::UpdateBlock(mut update) => {
            update.block_runtime_id = lookup.map(update.block_runtime_id)?;
            Ok((Packet::UpdateBlock(update), RewriteOutcome::Rewritten))
        }
        Packet::UpdateBlockSynced(mut synced) => {
            synced.block.block_runtime_id = lookup.map(synced.block.block_runtime_id)?;
            Ok((Packet::UpdateBlockSynced(synced), RewriteOutcome::Rewritten))
        }
        other => Ok(opaque(other)),
    }
}

fn rewrite_creative_content(
    packet: Packet,
    lookup: &IdLookup<'_>,
) -> Result<(Packet, RewriteOutcome), TranslationError> {
    let content = match packet {
        Packet::CreativeContent(content) => content,
        other => return Ok(opaque(other)),
    };

    let mut entries = Vec::with_capacity(content.entries.len());
    for entry in &content.entries {
        let mut item = entry.item.clone();
        // Zero marks an item that is not a block
        if item.block_runtime_id != 0 {
            item.block_runtime_id = lookup.map_signed("block_runtime_id", item.block_runtime_id)?;
        }
        entries.push(CreativeContentEntry {
            entry_id: entry.entry_id,
            item,
        });
    }

    Ok((
        Packet::CreativeContent(CreativeContentPacket { entries }),
        RewriteOutcome::Rewritten,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::RawPacket;
    use crate::protocol::types::{BlockPosition, ItemStack, Vec3};
    use crate::protocol::world::{LevelEventPacket, LevelSoundEventPacket, UpdateBlockPacket};
    use crate::translate::mapping::{LookupDirection, StatePair};

    const LEGACY: ProtocolRevision = ProtocolRevision::V1_21_0;

    fn translator() -> IdTranslator {
        IdTranslator::from_mappings([BlockStateMapping::from_pairs(
            LEGACY,
            [
                StatePair::new(5000, 7),
                StatePair::new(5001, 8),
                StatePair::new(6000, 12),
            ],
        )
        .unwrap()])
    }

    fn apply(
        packet: Packet,
        direction: Direction,
    ) -> Result<(Packet, RewriteOutcome), TranslationError> {
        RuleSet::standard().apply(
            packet,
            LEGACY,
            direction,
            &RevisionRegistry::default(),
            &translator(),
        )
    }

    #[test]
    fn test_sound_predicate() {
        assert!(sound_carries_block(sound_event::BREAK, 7));
        assert!(!sound_carries_block(sound_event::BREAK, -1));
        assert!(sound_carries_block(sound_event::LAND, -1));
        assert!(!sound_carries_block(sound_event::STEP, 7));
    }

    #[test]
    fn test_inbound_sound_rewrite() {
        let packet = Packet::LevelSoundEvent(LevelSoundEventPacket::new(
            sound_event::BREAK,
            Vec3::default(),
            7,
        ));
        let (packet, outcome) = apply(packet, Direction::Inbound).unwrap();
        assert_eq!(outcome, RewriteOutcome::Rewritten);
        match packet {
            Packet::LevelSoundEvent(event) => assert_eq!(event.extra_data, 5000),
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_unrelated_sound_untouched() {
        let packet = Packet::LevelSoundEvent(LevelSoundEventPacket::new(
            sound_event::JUMP,
            Vec3::default(),
            99,
        ));
        let (out, outcome) = apply(packet.clone(), Direction::Outbound).unwrap();
        assert_eq!(outcome, RewriteOutcome::Unchanged);
        assert_eq!(out, packet);
    }

    #[test]
    fn test_punch_block_masks_face_bits() {
        let face = 3 << 24;
        let packet = Packet::LevelEvent(LevelEventPacket {
            event_id: level_event::PARTICLE_PUNCH_BLOCK,
            position: Vec3::default(),
            event_data: 5001 | face,
        });
        let (packet, _) = apply(packet, Direction::Outbound).unwrap();
        match packet {
            Packet::LevelEvent(event) => assert_eq!(event.event_data, 8),
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_terrain_particle_rewritten() {
        let packet = Packet::LevelEvent(LevelEventPacket {
            event_id: level_event::ADD_PARTICLE_MASK | particle::TERRAIN,
            position: Vec3::default(),
            event_data: 6000,
        });
        let (packet, outcome) = apply(packet, Direction::Outbound).unwrap();
        assert_eq!(outcome, RewriteOutcome::Rewritten);
        assert!(matches!(
            packet,
            Packet::LevelEvent(LevelEventPacket { event_data: 12, .. })
        ));
    }

    #[test]
    fn test_update_block_miss_aborts() {
        let packet = Packet::UpdateBlock(UpdateBlockPacket {
            block_position: BlockPosition::new(0, 0, 0),
            block_runtime_id: 4242,
            flags: 0,
            data_layer_id: 0,
        });
        assert_eq!(
            apply(packet, Direction::Outbound).unwrap_err(),
            TranslationError::IdLookupMiss {
                revision: LEGACY,
                id: 4242,
                direction: LookupDirection::ToVersion,
            }
        );
    }

    #[test]
    fn test_negative_identifier_rejected() {
        let packet = Packet::LevelSoundEvent(LevelSoundEventPacket::new(
            sound_event::PLACE,
            Vec3::default(),
            -5,
        ));
        assert!(matches!(
            apply(packet, Direction::Inbound),
            Err(TranslationError::NegativeIdentifier { field: "extra_data", value: -5 })
        ));
    }

    #[test]
    fn test_creative_content_keeps_non_blocks() {
        let item = |block_runtime_id| ItemStack {
            id: 1,
            meta: 0,
            count: 1,
            block_runtime_id,
            extra_data: Vec::new(),
        };
        let packet = Packet::CreativeContent(CreativeContentPacket {
            entries: vec![
                CreativeContentEntry {
                    entry_id: 1,
                    item: item(5000),
                },
                CreativeContentEntry {
                    entry_id: 2,
                    item: item(0),
                },
            ],
        });
        let (packet, _) = apply(packet, Direction::Outbound).unwrap();
        let Packet::CreativeContent(content) = packet else {
            panic!("expected creative content");
        };
        assert_eq!(content.entries[0].item.block_runtime_id, 7);
        assert_eq!(content.entries[1].item.block_runtime_id, 0);
    }

    #[test]
    fn test_unsupported_translations_pass_through() {
        let packet = Packet::Raw(RawPacket::new(wire_id::UPDATE_SUB_CHUNK_BLOCKS, vec![1u8, 2]));
        let (out, outcome) = apply(packet.clone(), Direction::Outbound).unwrap();
        assert_eq!(out, packet);
        assert!(matches!(outcome, RewriteOutcome::PassThrough { .. }));
    }

    #[test]
    fn test_current_revision_skips() {
        let packet = Packet::UpdateBlock(UpdateBlockPacket {
            block_position: BlockPosition::new(0, 0, 0),
            block_runtime_id: 4242,
            flags: 0,
            data_layer_id: 0,
        });
        let (out, outcome) = RuleSet::standard()
            .apply(
                packet.clone(),
                ProtocolRevision::CANONICAL,
                Direction::Outbound,
                &RevisionRegistry::default(),
                &IdTranslator::default(),
            )
            .unwrap();
        assert_eq!(outcome, RewriteOutcome::Unchanged);
        assert_eq!(out, packet);
    }

    #[test]
    fn test_inbound_has_only_sound_rule() {
        let rules = RuleSet::standard();
        assert!(rules.lookup(wire_id::LEVEL_SOUND_EVENT, Direction::Inbound).is_some());
        assert!(rules.lookup(wire_id::UPDATE_BLOCK, Direction::Inbound).is_none());
        assert_eq!(rules.len(), 8);
    }
}
