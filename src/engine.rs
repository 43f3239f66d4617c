//! Translation engine
//!
//! The single entry point the transport layer calls for every packet. Inbound
//! packets run decode, normalize, rewrite; outbound packets run normalize,
//! rewrite, encode. The engine owns only immutable tables and can be shared
//! across sessions behind an `Arc`.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::packets::{decode_base, read_header, write_header, Packet};
use crate::protocol::revision::{ProtocolRevision, RevisionRegistry};
use crate::translate::mapping::{IdTranslator, RuntimeIdAuthority};
use crate::translate::overrides::OverrideRegistry;
use crate::translate::rules::{Direction, RewriteOutcome, RuleSet};

/// Multi-revision packet translation engine
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    registry: RevisionRegistry,
    translator: IdTranslator,
    overrides: OverrideRegistry,
    rules: RuleSet,
    max_packet_size: usize,
}

impl TranslationEngine {
    /// Create an engine from prebuilt tables
    pub fn new(
        registry: RevisionRegistry,
        translator: IdTranslator,
        overrides: OverrideRegistry,
        rules: RuleSet,
        max_packet_size: usize,
    ) -> Self {
        Self {
            registry,
            translator,
            overrides,
            rules,
            max_packet_size,
        }
    }

    /// Build the standard engine, loading a mapping for every legacy revision
    pub fn from_config<A>(config: &BridgeConfig, authority: &A) -> Result<Self>
    where
        A: RuntimeIdAuthority + ?Sized,
    {
        let registry = RevisionRegistry::new(
            config.supported_revisions.iter().copied(),
            config.current_revisions.iter().copied(),
        )?;
        let translator = IdTranslator::build(authority, registry.legacy())?;

        Ok(Self::new(
            registry,
            translator,
            OverrideRegistry::standard(),
            RuleSet::standard(),
            config.max_packet_size,
        ))
    }

    pub fn registry(&self) -> &RevisionRegistry {
        &self.registry
    }

    pub fn translator(&self) -> &IdTranslator {
        &self.translator
    }

    pub fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }

    /// Decode a framed packet as laid out by `revision`. Wire types with an
    /// override decode straight into their versioned form.
    pub fn decode(&self, bytes: &[u8], revision: ProtocolRevision) -> Result<Packet> {
        self.registry.ensure_supported(revision)?;
        if bytes.len() > self.max_packet_size {
            return Err(ProtocolError::PacketTooLarge {
                size: bytes.len(),
                max: self.max_packet_size,
            }
            .into());
        }

        let mut buffer = PacketBuffer::from_bytes(bytes);
        let wire_id = read_header(&mut buffer)?;
        let packet = match self.overrides.lookup(wire_id) {
            Some(entry) => entry.decode(&mut buffer, revision)?,
            None => decode_base(wire_id, &mut buffer)?,
        };

        if buffer.has_remaining() {
            debug!(
                wire_id,
                packet = packet.name(),
                revision = %revision,
                trailing = buffer.remaining(),
                "Ignoring trailing bytes after packet payload"
            );
        }
        trace!(
            wire_id,
            packet = packet.name(),
            revision = %revision,
            size = bytes.len(),
            "Decoded packet"
        );
        Ok(packet)
    }

    /// Encode a packet, header included, for a session at `revision`
    pub fn encode(&self, packet: &Packet, revision: ProtocolRevision) -> Result<Bytes> {
        self.registry.ensure_supported(revision)?;

        let mut buffer = PacketBuffer::with_capacity(64);
        write_header(&mut buffer, packet.wire_id());
        packet.encode_payload(&mut buffer, revision);

        trace!(
            wire_id = packet.wire_id(),
            packet = packet.name(),
            revision = %revision,
            size = buffer.len(),
            "Encoded packet"
        );
        Ok(buffer.freeze())
    }

    /// Normalize a packet and rewrite its identifiers for one direction
    pub fn translate(
        &self,
        packet: Packet,
        revision: ProtocolRevision,
        direction: Direction,
    ) -> Result<(Packet, RewriteOutcome)> {
        self.registry.ensure_supported(revision)?;

        let packet = self.overrides.normalize(packet)?;
        let wire_id = packet.wire_id();
        let (packet, outcome) =
            self.rules
                .apply(packet, revision, direction, &self.registry, &self.translator)?;

        if outcome == RewriteOutcome::Rewritten {
            debug!(
                wire_id,
                packet = packet.name(),
                revision = %revision,
                direction = %direction,
                "Rewrote block identifiers"
            );
        }
        Ok((packet, outcome))
    }

    /// Turn bytes from a client at `revision` into a canonical packet
    pub fn decode_inbound(&self, bytes: &[u8], revision: ProtocolRevision) -> Result<Packet> {
        let packet = self.decode(bytes, revision)?;
        let (packet, _) = self.translate(packet, revision, Direction::Inbound)?;
        Ok(packet)
    }

    /// Turn a canonical packet into bytes for a client at `revision`
    pub fn encode_outbound(&self, packet: Packet, revision: ProtocolRevision) -> Result<Bytes> {
        let (packet, _) = self.translate(packet, revision, Direction::Outbound)?;
        self.encode(&packet, revision)
    }
}
