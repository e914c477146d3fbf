// Hearth Raytrace - first-hit queries through a voxel world
//
// A trace walks the exact sequence of cells between two points and reports
// the first block, or the nearest entity, that its predicates accept.
// - world: what a world must expose, plus an in-memory implementation
// - trace: the request builder, traversal driver and target strategies
// - physics: bounding boxes and segment clipping

pub mod error;
pub mod physics;
pub mod trace;
pub mod world;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub use error::{OptionExt, TraceError, TraceResult};
pub use physics::AABB;
pub use trace::{
    block_ray_trace, block_ray_trace_with_config, entity_ray_trace, entity_ray_trace_with_config,
    not_passable, only_passable, BlockRayTrace, BlockTarget, EntityRayTrace, EntityTarget,
    RayTrace, RayTraceHit, TargetStrategy,
};
pub use world::{
    BlockId, BoxEntity, Living, LocatedBlock, Observer, SparseWorld, TraceEntity, VoxelPos,
    WorldKey, WorldLocation, WorldRegistry, WorldResolver, WorldView,
};

/// Distance in blocks traced along a direction when no limit is given
pub const DEFAULT_LIMIT: u32 = 30;

/// Defaults applied to newly constructed (and reset) traces
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub default_limit: u32,
    /// Log every traversed cell at trace level
    pub log_steps: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            log_steps: false,
        }
    }
}

impl TraceConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(anyhow::anyhow!("TraceConfig: default_limit cannot be 0"));
        }

        log::debug!(
            "[TraceConfig] Validated: default_limit={}, log_steps={}",
            self.default_limit,
            self.log_steps
        );
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: TraceConfig =
            toml::from_str(source).context("TraceConfig: failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("TraceConfig: failed to read {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}
