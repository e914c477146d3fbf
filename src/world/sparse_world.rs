//! In-memory world backed by hash maps
//!
//! Satisfies the world interfaces without any chunk storage. Cells never set
//! read as AIR.

use super::core::{BlockId, VoxelPos, WorldKey};
use super::interfaces::{Living, TraceEntity, WorldResolver, WorldView};
use crate::physics::{aabb_from_center_half_extents, aabb_intersects, AABB};
use glam::DVec3;
use rustc_hash::FxHashMap;

/// Entity with a fixed box-shaped volume
#[derive(Debug, Clone, PartialEq)]
pub struct BoxEntity {
    pub id: u32,
    pub bounds: AABB,
}

impl BoxEntity {
    pub fn new(id: u32, bounds: AABB) -> Self {
        Self { id, bounds }
    }

    /// Box of the given half extents centered on `center`
    pub fn centered(id: u32, center: DVec3, half_extents: DVec3) -> Self {
        Self::new(id, aabb_from_center_half_extents(center, half_extents))
    }
}

impl TraceEntity for BoxEntity {
    fn bounding_box(&self) -> AABB {
        self.bounds
    }
}

/// World data keyed by cell
#[derive(Debug, Clone)]
pub struct SparseWorld<E = BoxEntity> {
    key: WorldKey,
    blocks: FxHashMap<VoxelPos, BlockId>,
    entities: Vec<E>,
}

impl<E: TraceEntity> SparseWorld<E> {
    pub fn new(key: impl Into<WorldKey>) -> Self {
        Self {
            key: key.into(),
            blocks: FxHashMap::default(),
            entities: Vec::new(),
        }
    }

    pub fn set_block(&mut self, pos: VoxelPos, block: BlockId) {
        if block == BlockId::AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    pub fn spawn(&mut self, entity: E) {
        self.entities.push(entity);
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl<E: TraceEntity> WorldView for SparseWorld<E> {
    type Entity = E;

    fn key(&self) -> &WorldKey {
        &self.key
    }

    fn block_at(&self, pos: VoxelPos) -> BlockId {
        self.blocks.get(&pos).copied().unwrap_or(BlockId::AIR)
    }

    fn entities_in(&self, region: &AABB) -> Vec<E> {
        self.entities
            .iter()
            .filter(|entity| aabb_intersects(&entity.bounding_box(), region))
            .cloned()
            .collect()
    }
}

/// Loaded worlds by key
#[derive(Debug, Clone)]
pub struct WorldRegistry<E = BoxEntity> {
    worlds: FxHashMap<WorldKey, SparseWorld<E>>,
}

impl<E: TraceEntity> Default for WorldRegistry<E> {
    fn default() -> Self {
        Self {
            worlds: FxHashMap::default(),
        }
    }
}

impl<E: TraceEntity> WorldRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, world: SparseWorld<E>) {
        log::debug!("[WorldRegistry::load] Loading world '{}'", world.key());
        self.worlds.insert(world.key().clone(), world);
    }

    pub fn unload(&mut self, key: &WorldKey) -> Option<SparseWorld<E>> {
        log::debug!("[WorldRegistry::unload] Unloading world '{}'", key);
        self.worlds.remove(key)
    }

    pub fn get_mut(&mut self, key: &WorldKey) -> Option<&mut SparseWorld<E>> {
        self.worlds.get_mut(key)
    }
}

impl<E: TraceEntity> WorldResolver for WorldRegistry<E> {
    type World = SparseWorld<E>;

    fn resolve(&self, key: &WorldKey) -> Option<&SparseWorld<E>> {
        self.worlds.get(key)
    }
}

/// A living source standing in a world, eyes at a fixed height above its feet
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    pub world: WorldKey,
    pub feet: DVec3,
    pub eye_height: f64,
}

impl Living for Observer {
    fn eye_position(&self) -> DVec3 {
        self.feet + DVec3::new(0.0, self.eye_height, 0.0)
    }

    fn world_key(&self) -> WorldKey {
        self.world.clone()
    }
}
