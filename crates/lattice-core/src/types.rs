use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{AIR_BLOCK_INDEX, CORE_MOD_INDEX, UNKNOWN_BLOCK_INDEX};

/// Grid-aligned chunk origin in block space (always a multiple of CHUNK_BLOCK_SIZE).
pub type ChunkPos = IVec3;

/// World coordinate in block space.
pub type WorldPos = IVec3;

/// Coordinate inside a chunk, each axis in [0, CHUNK_BLOCK_SIZE).
pub type LocalPos = IVec3;

/// Packed per-cell block identifier.
///
/// Bit layout of the single u64:
///   [0:15]   mod_id
///   [16:31]  block_id
///   [32:63]  metadata
///
/// Equality compares all 64 bits, so two cells with the same block but
/// different metadata are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ChunkBlock(pub u64);

impl ChunkBlock {
    /// Reserved air sentinel (core mod, block 0, no metadata).
    pub const AIR: ChunkBlock = ChunkBlock::new(CORE_MOD_INDEX, AIR_BLOCK_INDEX, 0);

    /// Placeholder for blocks whose mod or name could not be resolved.
    pub const UNKNOWN: ChunkBlock = ChunkBlock::new(CORE_MOD_INDEX, UNKNOWN_BLOCK_INDEX, 0);

    pub const fn new(mod_id: u16, block_id: u16, metadata: u32) -> Self {
        Self((mod_id as u64) | ((block_id as u64) << 16) | ((metadata as u64) << 32))
    }

    pub const fn mod_id(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    pub const fn block_id(self) -> u16 {
        ((self.0 >> 16) & 0xFFFF) as u16
    }

    pub const fn metadata(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Same mod and block with the metadata word replaced.
    pub const fn with_metadata(self, metadata: u32) -> Self {
        Self::new(self.mod_id(), self.block_id(), metadata)
    }

    /// Air test against the constant sentinel; never consults a registry.
    pub const fn is_air(self) -> bool {
        self.0 == Self::AIR.0
    }
}

/// Informational tag carried by block edits (UI and telemetry only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Set,
    Place,
    Break,
}

/// What a raycast is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaycastMode {
    /// Target the first non-air cell hit.
    Destroy,
    /// Target the air cell in front of the first non-air cell hit.
    Place,
}

impl RaycastMode {
    /// The edit action this mode performs.
    pub fn action(self) -> Action {
        match self {
            RaycastMode::Destroy => Action::Break,
            RaycastMode::Place => Action::Place,
        }
    }
}
