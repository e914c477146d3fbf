//! World collaborators for ray traces
//!
//! - core: plain world data types (blocks, cells, keys)
//! - interfaces: what a world must expose to be traced through
//! - sparse_world: an in-memory world satisfying those interfaces

pub mod core;
pub mod interfaces;
pub mod sparse_world;

pub use self::core::{
    is_passable, BlockId, LocatedBlock, VoxelPos, WorldKey, WorldLocation, PASSABLE_BLOCKS,
};
pub use interfaces::{Living, TraceEntity, WorldResolver, WorldView};
pub use sparse_world::{BoxEntity, Observer, SparseWorld, WorldRegistry};

/// Locate the block occupying a cell
pub fn located_block_at<W: WorldView>(world: &W, pos: VoxelPos) -> LocatedBlock {
    LocatedBlock {
        world: world.key().clone(),
        position: pos,
        block: world.block_at(pos),
    }
}
