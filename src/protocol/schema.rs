//! Declarative field layout rules
//!
//! Conditional fields are described once as [`Gate`] constants. A versioned
//! codec evaluates the same gate on both its encode and decode path, so a
//! field written under a given [`Layout`] is always read back under it.

use crate::protocol::revision::ProtocolRevision;
use crate::protocol::types::{play_mode, InputFlags};

/// The facts a gate may depend on while a payload is being coded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub revision: ProtocolRevision,
    pub flags: InputFlags,
    pub play_mode: u32,
}

impl Layout {
    /// Layout for a revision with no flags or play mode known yet
    pub const fn at(revision: ProtocolRevision) -> Self {
        Self {
            revision,
            flags: InputFlags::empty(),
            play_mode: play_mode::NORMAL,
        }
    }

    pub const fn with_flags(mut self, flags: InputFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn with_play_mode(mut self, play_mode: u32) -> Self {
        self.play_mode = play_mode;
        self
    }
}

/// Presence rule for an optional field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Present from a revision onward
    Since(ProtocolRevision),
    /// Present iff the flag bit is set
    Flag(InputFlags),
    /// Present iff the flag bit is set and the revision has the field
    FlagSince(InputFlags, ProtocolRevision),
    /// Present iff the play mode equals the value
    PlayMode(u32),
}

impl Gate {
    /// Evaluate the gate against a layout
    pub fn is_open(self, layout: &Layout) -> bool {
        match self {
            Gate::Since(since) => layout.revision >= since,
            Gate::Flag(flag) => layout.flags.contains(flag),
            Gate::FlagSince(flag, since) => {
                layout.flags.contains(flag) && layout.revision >= since
            }
            Gate::PlayMode(mode) => layout.play_mode == mode,
        }
    }

    /// Whether the revision part of the gate admits the field
    pub fn admits(self, revision: ProtocolRevision) -> bool {
        match self {
            Gate::Since(since) | Gate::FlagSince(_, since) => revision >= since,
            Gate::Flag(_) | Gate::PlayMode(_) => true,
        }
    }

    /// The flag bit this gate keys on, if any
    pub fn flag(self) -> Option<InputFlags> {
        match self {
            Gate::Flag(flag) | Gate::FlagSince(flag, _) => Some(flag),
            Gate::Since(_) | Gate::PlayMode(_) => None,
        }
    }
}

/// Player auth input optional fields
pub mod auth_input {
    use super::*;

    pub const VR_GAZE_DIRECTION: Gate = Gate::PlayMode(play_mode::VR);
    pub const ITEM_INTERACTION: Gate = Gate::Flag(InputFlags::PERFORM_ITEM_INTERACTION);
    pub const ITEM_STACK_REQUEST: Gate = Gate::Flag(InputFlags::PERFORM_ITEM_STACK_REQUEST);
    pub const BLOCK_ACTIONS: Gate = Gate::Flag(InputFlags::PERFORM_BLOCK_ACTIONS);
    pub const VEHICLE_INFO: Gate = Gate::FlagSince(
        InputFlags::IN_CLIENT_PREDICTED_VEHICLE,
        ProtocolRevision::V1_20_60,
    );
}

/// Use-item transaction optional fields
pub mod transaction {
    use super::*;

    pub const TRIGGER_TYPE: Gate = Gate::Since(ProtocolRevision::V1_21_20);
    pub const CLIENT_INTERACT_PREDICTION: Gate = Gate::Since(ProtocolRevision::V1_21_20);
}

/// Entity attribute optional fields
pub mod attribute {
    use super::*;

    pub const DEFAULT_RANGE: Gate = Gate::Since(ProtocolRevision::V1_21_30);
}
