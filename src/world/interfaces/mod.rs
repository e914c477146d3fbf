//! Interfaces a world must provide to be traced through
//!
//! Storage, entity indexing and world loading live outside this crate. A
//! trace only ever reads through these traits.

use crate::physics::{aabb_clip_segment, AABB};
use crate::world::core::{BlockId, VoxelPos, WorldKey};
use glam::DVec3;

/// Resolves a world key to a loaded world
pub trait WorldResolver {
    type World: WorldView;

    /// The loaded world for `key`, or `None` if it is not loaded
    fn resolve(&self, key: &WorldKey) -> Option<&Self::World>;
}

/// Read-only view of a loaded world
pub trait WorldView {
    type Entity: TraceEntity;

    fn key(&self) -> &WorldKey;

    /// Block occupying the cell
    fn block_at(&self, pos: VoxelPos) -> BlockId;

    /// All entities whose volume overlaps `region`
    fn entities_in(&self, region: &AABB) -> Vec<Self::Entity>;
}

/// An entity a trace can hit
pub trait TraceEntity: Clone + 'static {
    fn bounding_box(&self) -> AABB;

    /// First point of the segment `start..=end` inside this entity
    fn clip(&self, start: DVec3, end: DVec3) -> Option<DVec3> {
        aabb_clip_segment(&self.bounding_box(), start, end)
    }
}

/// A source with eyes, such as a player or mob
pub trait Living {
    fn eye_position(&self) -> DVec3;

    fn world_key(&self) -> WorldKey;
}
