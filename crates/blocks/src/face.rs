//! Block faces named in interaction checks

use serde::{Deserialize, Serialize};

/// Face of a block a player interacts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockFace {
    Up,    // +Y
    Down,  // -Y
    West,  // -X
    East,  // +X
    South, // +Z
    North, // -Z
}

impl BlockFace {
    pub fn name(self) -> &'static str {
        match self {
            BlockFace::Up => "up",
            BlockFace::Down => "down",
            BlockFace::West => "west",
            BlockFace::East => "east",
            BlockFace::South => "south",
            BlockFace::North => "north",
        }
    }
}

impl std::fmt::Display for BlockFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
