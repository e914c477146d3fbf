//! Core world data types
//!
//! Plain data shared by the world collaborators and the trace driver.

mod block;
mod location;
mod position;

pub use block::{is_passable, BlockId, PASSABLE_BLOCKS};
pub use location::{LocatedBlock, WorldKey, WorldLocation};
pub use position::VoxelPos;
