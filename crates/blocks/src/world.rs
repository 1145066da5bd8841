//! Block storage seen through the `BlockAccess` trait

use crate::{BlockId, VoxelBox, VoxelCoord};
use std::collections::HashMap;

/// Read access to the block grid of a world
///
/// `None` means the cell is not available (unloaded chunk, outside the
/// world). Callers treat unavailable cells as passable.
pub trait BlockAccess {
    fn block_at(&self, coord: VoxelCoord) -> Option<BlockId>;
}

impl<F> BlockAccess for F
where
    F: Fn(VoxelCoord) -> Option<BlockId>,
{
    fn block_at(&self, coord: VoxelCoord) -> Option<BlockId> {
        self(coord)
    }
}

/// In-memory world storing only explicitly placed blocks
///
/// Cells that were never set report the fill block (usually air), or
/// nothing at all when the world was created without one.
#[derive(Debug, Clone, Default)]
pub struct SparseWorld {
    blocks: HashMap<VoxelCoord, BlockId>,
    fill: Option<BlockId>,
}

impl SparseWorld {
    /// Empty world where unset cells are `fill`
    pub fn new(fill: BlockId) -> Self {
        Self {
            blocks: HashMap::new(),
            fill: Some(fill),
        }
    }

    /// Empty world where unset cells are unavailable
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn set(&mut self, coord: VoxelCoord, id: BlockId) {
        self.blocks.insert(coord, id);
    }

    /// Set every cell of an inclusive box
    pub fn fill_box(&mut self, region: VoxelBox, id: BlockId) {
        for x in region.min.x..=region.max.x {
            for y in region.min.y..=region.max.y {
                for z in region.min.z..=region.max.z {
                    self.blocks.insert(VoxelCoord::new(x, y, z), id);
                }
            }
        }
    }

    /// Number of explicitly set cells
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockAccess for SparseWorld {
    fn block_at(&self, coord: VoxelCoord) -> Option<BlockId> {
        self.blocks.get(&coord).copied().or(self.fill)
    }
}
