//! Integration tests for the translation pipeline
//!
//! These tests drive the public API end to end:
//! - Inbound and outbound identifier rewrites at legacy revisions
//! - Versioned layouts and normalization of override packets
//! - Mapping construction from palette files and configuration

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use protocol_bridge::config::BridgeConfig;
use protocol_bridge::error::{BridgeError, ConstructionError, PaletteError, TranslationError};
use protocol_bridge::protocol::attributes::{UpdateAttribute, UpdateAttributesPacket};
use protocol_bridge::protocol::auth_input::{AuthInputArgs, PlayerAuthInputPacket, VehicleInfo};
use protocol_bridge::protocol::packets::{wire_id, write_header, RawPacket, WirePacket};
use protocol_bridge::protocol::revision::KNOWN_REVISIONS;
use protocol_bridge::protocol::types::{play_mode, sound_event, InputFlags, ItemStack, Vec3};
use protocol_bridge::protocol::world::{
    CreativeContentEntry, CreativeContentPacket, LevelSoundEventPacket,
};
use protocol_bridge::protocol::{PacketBuffer, PacketForm};
use protocol_bridge::translate::{
    BlockStateMapping, OverrideRegistry, PaletteDirectory, RewriteOutcome, StatePair,
};
use protocol_bridge::{Direction, Packet, ProtocolRevision, TranslationEngine};

/// Palette shared by every legacy revision in these tests
fn palette() -> Vec<StatePair> {
    vec![
        StatePair::new(900, 3),
        StatePair::new(901, 4),
        StatePair::new(902, 5),
    ]
}

fn engine() -> TranslationEngine {
    let authority: HashMap<ProtocolRevision, Vec<StatePair>> = KNOWN_REVISIONS
        .iter()
        .map(|revision| (*revision, palette()))
        .collect();
    TranslationEngine::from_config(&BridgeConfig::default(), &authority)
        .expect("Engine should build from a complete authority")
}

fn framed<P: WirePacket>(packet: &P) -> Vec<u8> {
    let mut buffer = PacketBuffer::new();
    write_header(&mut buffer, P::WIRE_ID);
    packet.encode(&mut buffer);
    buffer.as_bytes().to_vec()
}

fn creative_item(block_runtime_id: i32) -> ItemStack {
    ItemStack {
        id: 12,
        meta: 0,
        count: 1,
        block_runtime_id,
        extra_data: Vec::new(),
    }
}

/// Test that a legacy break sound carries the translated runtime id
#[test]
fn test_inbound_break_sound_at_legacy_revision() {
    let engine = engine();
    let bytes = framed(&LevelSoundEventPacket::new(
        sound_event::BREAK,
        Vec3::new(1.0, 64.0, 1.0),
        4,
    ));

    let packet = engine
        .decode(&bytes, ProtocolRevision::V1_21_0)
        .expect("Should decode");
    let (packet, outcome) = engine
        .translate(packet, ProtocolRevision::V1_21_0, Direction::Inbound)
        .expect("Should translate");

    assert_eq!(outcome, RewriteOutcome::Rewritten);
    let Packet::LevelSoundEvent(sound) = packet else {
        panic!("Expected a sound event");
    };
    assert_eq!(sound.extra_data, 901);
    assert_eq!(sound.position, Vec3::new(1.0, 64.0, 1.0));
}

/// Test that a break sound without block data is left alone
#[test]
fn test_break_sound_without_block_is_unchanged() {
    let engine = engine();
    let packet = Packet::LevelSoundEvent(LevelSoundEventPacket::new(
        sound_event::BREAK,
        Vec3::default(),
        -1,
    ));

    let (packet, outcome) = engine
        .translate(packet, ProtocolRevision::V1_21_0, Direction::Inbound)
        .unwrap();
    assert_eq!(outcome, RewriteOutcome::Unchanged);
    let Packet::LevelSoundEvent(sound) = packet else {
        panic!("Expected a sound event");
    };
    assert_eq!(sound.extra_data, -1);
}

/// Test that sessions on the current revision are never rewritten
#[test]
fn test_current_revision_passes_unchanged() {
    let engine = engine();
    let original = Packet::LevelSoundEvent(LevelSoundEventPacket::new(
        sound_event::PLACE,
        Vec3::default(),
        901,
    ));

    for direction in [Direction::Inbound, Direction::Outbound] {
        let (packet, outcome) = engine
            .translate(original.clone(), ProtocolRevision::CANONICAL, direction)
            .unwrap();
        assert_eq!(outcome, RewriteOutcome::Unchanged);
        assert_eq!(packet, original);
    }
}

/// Test that creative content is rebuilt in order with every block id mapped
#[test]
fn test_outbound_creative_content() {
    let engine = engine();
    let original = CreativeContentPacket {
        entries: vec![
            CreativeContentEntry {
                entry_id: 1,
                item: creative_item(900),
            },
            CreativeContentEntry {
                entry_id: 2,
                item: creative_item(0),
            },
            CreativeContentEntry {
                entry_id: 3,
                item: creative_item(902),
            },
        ],
    };

    let bytes = engine
        .encode_outbound(
            Packet::CreativeContent(original.clone()),
            ProtocolRevision::V1_20_80,
        )
        .expect("Should encode");
    let decoded = engine.decode(&bytes, ProtocolRevision::V1_20_80).unwrap();

    let Packet::CreativeContent(translated) = decoded else {
        panic!("Expected creative content");
    };
    let ids: Vec<(u32, i32)> = translated
        .entries
        .iter()
        .map(|entry| (entry.entry_id, entry.item.block_runtime_id))
        .collect();
    assert_eq!(ids, vec![(1, 3), (2, 0), (3, 5)]);

    // The caller's list is untouched
    assert_eq!(original.entries[0].item.block_runtime_id, 900);
}

/// Test that a lookup miss aborts translation with the missing id
#[test]
fn test_lookup_miss_aborts() {
    let engine = engine();
    let packet = Packet::LevelSoundEvent(LevelSoundEventPacket::new(
        sound_event::PLACE,
        Vec3::default(),
        77,
    ));

    let err = engine
        .translate(packet, ProtocolRevision::V1_20_40, Direction::Inbound)
        .unwrap_err();
    match err {
        BridgeError::Translation(TranslationError::IdLookupMiss { revision, id, .. }) => {
            assert_eq!(revision, ProtocolRevision::V1_20_40);
            assert_eq!(id, 77);
        }
        other => panic!("Unexpected error: {:?}", other),
    }
}

/// Test that packets without a translation are forwarded with a reason
#[test]
fn test_unsupported_packets_pass_through() {
    let engine = engine();

    for id in [wire_id::UPDATE_SUB_CHUNK_BLOCKS, wire_id::CRAFTING_DATA] {
        let raw = Packet::Raw(RawPacket::new(id, vec![1u8, 2, 3]));
        let (packet, outcome) = engine
            .translate(raw.clone(), ProtocolRevision::V1_21_20, Direction::Outbound)
            .unwrap();
        assert!(matches!(outcome, RewriteOutcome::PassThrough { .. }));
        assert_eq!(packet, raw);
    }
}

/// Test that a VR packet without a gaze direction is never built
#[test]
fn test_vr_requires_gaze_direction() {
    let mut args = AuthInputArgs::movement(Vec3::default(), 1);
    args.play_mode = play_mode::VR;
    let err = PlayerAuthInputPacket::create(args.clone()).unwrap_err();
    assert_eq!(err, ConstructionError::MissingGazeDirection);

    args.vr_gaze_direction = Some(Vec3::new(0.0, 0.0, 1.0));
    let packet = PlayerAuthInputPacket::create(args).unwrap();
    assert_eq!(packet.vr_gaze_direction(), Some(Vec3::new(0.0, 0.0, 1.0)));
}

/// Test that payload flags always follow payload presence
#[test]
fn test_input_flags_follow_payloads() {
    let mut args = AuthInputArgs::movement(Vec3::default(), 1);
    args.input_flags = InputFlags::SNEAKING | InputFlags::PERFORM_ITEM_STACK_REQUEST;
    args.block_actions = Some(Vec::new());

    let packet = PlayerAuthInputPacket::create(args).unwrap();
    assert!(packet.has_flag(InputFlags::SNEAKING));
    assert!(packet.has_flag(InputFlags::PERFORM_BLOCK_ACTIONS));
    assert!(!packet.has_flag(InputFlags::PERFORM_ITEM_STACK_REQUEST));
}

/// Test that vehicle info only reaches revisions that understand it
#[test]
fn test_vehicle_info_gated_by_revision() {
    let engine = engine();
    let mut args = AuthInputArgs::movement(Vec3::new(5.0, 70.0, 5.0), 42);
    args.vehicle_info = Some(VehicleInfo {
        rotation_x: 0.5,
        rotation_z: -0.5,
        predicted_vehicle_unique_id: 88,
    });
    let packet = Packet::PlayerAuthInput(PlayerAuthInputPacket::create(args).unwrap());

    let old = engine
        .encode_outbound(packet.clone(), ProtocolRevision::V1_20_50)
        .unwrap();
    let Packet::VersionedPlayerAuthInput(decoded) =
        engine.decode(&old, ProtocolRevision::V1_20_50).unwrap()
    else {
        panic!("Expected versioned auth input");
    };
    assert!(decoded.vehicle_info().is_none());
    assert!(!decoded.has_flag(InputFlags::IN_CLIENT_PREDICTED_VEHICLE));

    let new = engine
        .encode_outbound(packet, ProtocolRevision::V1_20_60)
        .unwrap();
    let Packet::VersionedPlayerAuthInput(decoded) =
        engine.decode(&new, ProtocolRevision::V1_20_60).unwrap()
    else {
        panic!("Expected versioned auth input");
    };
    assert_eq!(decoded.vehicle_info().map(|v| v.predicted_vehicle_unique_id), Some(88));
    assert!(decoded.has_flag(InputFlags::IN_CLIENT_PREDICTED_VEHICLE));
    assert!(new.len() > old.len());
}

/// Test that normalizing twice is the same as normalizing once
#[test]
fn test_override_normalization_is_idempotent() {
    let registry = OverrideRegistry::standard();
    let base = Packet::PlayerAuthInput(
        PlayerAuthInputPacket::create(AuthInputArgs::movement(Vec3::default(), 3)).unwrap(),
    );

    let once = registry.normalize(base).unwrap();
    assert_eq!(once.form(), PacketForm::Versioned);
    let twice = registry.normalize(once.clone()).unwrap();
    assert_eq!(twice, once);
}

/// Test that attribute updates survive every revision, with the default
/// range synthesized where the layout lacks it
#[test]
fn test_attribute_round_trip_across_revisions() {
    let engine = engine();
    let packet = Packet::UpdateAttributes(UpdateAttributesPacket {
        actor_runtime_id: 7,
        entries: vec![UpdateAttribute {
            id: "minecraft:health".to_string(),
            min: 0.0,
            max: 20.0,
            current: 14.0,
            default_min: 0.0,
            default_max: 20.0,
            default: 20.0,
            modifiers: Vec::new(),
        }],
        tick: 100,
    });

    for revision in KNOWN_REVISIONS {
        let bytes = engine.encode_outbound(packet.clone(), revision).unwrap();
        let decoded = engine.decode(&bytes, revision).unwrap();
        let Packet::VersionedUpdateAttributes(attributes) = decoded else {
            panic!("Expected versioned attributes at {}", revision);
        };

        assert_eq!(attributes.actor_runtime_id, 7);
        assert_eq!(attributes.tick, 100);
        let entry = &attributes.entries[0];
        assert_eq!(entry.current, 14.0);
        assert_eq!((entry.default_min, entry.default_max), (0.0, 20.0));

        // Re-encoding what was decoded reproduces the same bytes
        assert_eq!(
            engine.encode(&Packet::VersionedUpdateAttributes(attributes), revision)
                .unwrap(),
            bytes
        );
    }
}

/// Test that a mapping is a bijection and rejects duplicate ids
#[test]
fn test_mapping_is_bijective() {
    let mapping = BlockStateMapping::from_pairs(ProtocolRevision::V1_21_2, palette()).unwrap();
    for pair in palette() {
        let runtime_id = mapping.to_runtime_id(pair.state_id).unwrap();
        assert_eq!(mapping.to_version_state_id(runtime_id).unwrap(), pair.state_id);
    }

    let duplicate = vec![StatePair::new(900, 3), StatePair::new(900, 4)];
    assert!(matches!(
        BlockStateMapping::from_pairs(ProtocolRevision::V1_21_2, duplicate),
        Err(TranslationError::DuplicateEntry { id: 900, .. })
    ));
}

/// Test that the engine loads legacy palettes from a directory
#[test]
fn test_engine_from_palette_directory() {
    let root = std::env::temp_dir().join(format!("bridge-palettes-{}", std::process::id()));
    std::fs::create_dir_all(&root).unwrap();
    let palettes = PaletteDirectory::new(&root);

    std::fs::write(
        palettes.path_for(ProtocolRevision::V1_21_30),
        r#"{"revision":729,"states":[{"runtime_id":900,"state_id":3}]}"#,
    )
    .unwrap();

    let mut config = BridgeConfig::default();
    config.supported_revisions = vec![ProtocolRevision::V1_21_30, ProtocolRevision::V1_21_40];

    let engine = TranslationEngine::from_config(&config, &palettes).unwrap();
    assert_eq!(engine.translator().revisions(), vec![ProtocolRevision::V1_21_30]);

    // Every legacy revision resolves a mapping; current ones have none
    for revision in engine.registry().supported() {
        let mapping = engine.translator().mapping(revision);
        if engine.registry().is_current(revision) {
            assert_eq!(mapping.unwrap_err(), TranslationError::NoMapping(revision));
        } else {
            assert_eq!(mapping.unwrap().len(), 1);
        }
    }

    // A revision without a palette file fails the build
    config.supported_revisions.push(ProtocolRevision::V1_21_20);
    let err = TranslationEngine::from_config(&config, &palettes).unwrap_err();
    assert!(matches!(err, BridgeError::Palette(PaletteError::NotFound(_))));

    std::fs::remove_dir_all(&root).unwrap();
}

/// Test loading a configuration file and building an engine from it
#[tokio::test]
async fn test_config_file_drives_engine() {
    let path = std::env::temp_dir().join(format!("bridge-it-{}.toml", std::process::id()));
    tokio::fs::write(
        &path,
        "supported_revisions = [685, 748]\ncurrent_revisions = [748]\nmax_packet_size = 4096\n",
    )
    .await
    .unwrap();

    let config = BridgeConfig::load_from(&path).await.unwrap();
    let authority: HashMap<ProtocolRevision, Vec<StatePair>> =
        [(ProtocolRevision::V1_21_0, palette())].into_iter().collect();
    let engine = TranslationEngine::from_config(&config, &authority).unwrap();

    assert_eq!(engine.max_packet_size(), 4096);
    assert!(engine.registry().is_supported(ProtocolRevision::V1_21_0));
    assert!(!engine.registry().is_supported(ProtocolRevision::V1_21_20));

    tokio::fs::remove_file(&path).await.unwrap();
}
