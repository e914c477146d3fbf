use super::{BlockId, VoxelPos};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a world, resolved to a loaded world at trace time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldKey(pub String);

impl WorldKey {
    pub fn new(key: impl Into<String>) -> Self {
        WorldKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorldKey {
    fn from(key: &str) -> Self {
        WorldKey::new(key)
    }
}

impl fmt::Display for WorldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cell in a specific world
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldLocation {
    pub world: WorldKey,
    pub position: VoxelPos,
}

/// A block together with where it sits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatedBlock {
    pub world: WorldKey,
    pub position: VoxelPos,
    pub block: BlockId,
}
