use lattice_core::constants::{
    RAYCAST_MAX_ITERATIONS, RAYCAST_MAX_STEP_HALVINGS, RAYCAST_STEP, TOTAL_VERTEX_PAGE_COUNT,
    VERTEX_PAGE_SIZE, VERTEX_STRIDE_BYTES,
};
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use crate::WorldError;

/// What `World::set_block` does when the target chunk is not resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingChunkPolicy {
    /// Drop the edit and log a warning.
    #[default]
    Ignore,
    /// Create the chunk, then apply the edit.
    Create,
}

/// Tuning for the block raycast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    /// Distance advanced per iteration, in blocks.
    pub step: f32,
    pub max_iterations: u32,
    /// Step halvings allowed while resolving one multi-axis crossing.
    pub max_step_halvings: u32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            step: RAYCAST_STEP,
            max_iterations: RAYCAST_MAX_ITERATIONS,
            max_step_halvings: RAYCAST_MAX_STEP_HALVINGS,
        }
    }
}

/// Runtime world settings. Every field falls back to the compile-time default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub page_count: u32,
    /// Vertices per page.
    pub page_size: u32,
    pub vertex_stride: u32,
    pub missing_chunk_policy: MissingChunkPolicy,
    pub raycast: RaycastConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            page_count: TOTAL_VERTEX_PAGE_COUNT,
            page_size: VERTEX_PAGE_SIZE,
            vertex_stride: VERTEX_STRIDE_BYTES,
            missing_chunk_policy: MissingChunkPolicy::default(),
            raycast: RaycastConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parse a config from RON and reject values the world cannot run with.
    pub fn from_ron(ron_str: &str) -> Result<Self, WorldError> {
        let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
        let config: WorldConfig = options
            .from_str(ron_str)
            .map_err(|e| WorldError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        if self.page_size == 0 {
            return Err(WorldError::Config("page_size must be non-zero".into()));
        }
        if self.vertex_stride == 0 {
            return Err(WorldError::Config("vertex_stride must be non-zero".into()));
        }
        // A step of more than one block could skip a cell or a whole chunk.
        if !(self.raycast.step > 0.0 && self.raycast.step <= 1.0) {
            return Err(WorldError::Config(format!(
                "raycast step {} must be in (0, 1]",
                self.raycast.step
            )));
        }
        Ok(())
    }

    /// Vertex buffer bytes needed for every page.
    pub fn vertex_bytes(&self) -> u64 {
        self.page_count as u64 * self.page_size as u64 * self.vertex_stride as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = WorldConfig::default();
        assert_eq!(config.page_count, TOTAL_VERTEX_PAGE_COUNT);
        assert_eq!(config.page_size, VERTEX_PAGE_SIZE);
        assert_eq!(config.missing_chunk_policy, MissingChunkPolicy::Ignore);
        assert_eq!(config.raycast.max_step_halvings, RAYCAST_MAX_STEP_HALVINGS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = WorldConfig::from_ron(
            r#"(page_count: 8, missing_chunk_policy: Create, raycast: (step: 0.05))"#,
        )
        .expect("should parse");
        assert_eq!(config.page_count, 8);
        assert_eq!(config.page_size, VERTEX_PAGE_SIZE);
        assert_eq!(config.missing_chunk_policy, MissingChunkPolicy::Create);
        assert_eq!(config.raycast.step, 0.05);
        assert_eq!(config.raycast.max_iterations, RAYCAST_MAX_ITERATIONS);
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let config = WorldConfig::from_ron(include_str!("../../../data/world.ron"))
            .expect("bundled config should parse");
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = WorldConfig::from_ron("(page_size: 0)").expect_err("invalid");
        assert!(matches!(err, WorldError::Config(_)));
    }

    #[test]
    fn test_malformed_ron_rejected() {
        assert!(matches!(
            WorldConfig::from_ron("(page_count: "),
            Err(WorldError::Config(_))
        ));
    }

    #[test]
    fn test_vertex_bytes() {
        let config = WorldConfig {
            page_count: 4,
            page_size: 8,
            vertex_stride: 16,
            ..Default::default()
        };
        assert_eq!(config.vertex_bytes(), 512);
    }
}
