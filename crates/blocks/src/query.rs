//! Bounds queries over a world and a block table

use crate::{BlockAccess, BlockBounds, BlockId, BlockProps, BlockTable, ShapeCategory, ShapeFlags, VoxelCoord};
use std::cell::RefCell;
use std::collections::HashMap;

/// Read-only view of block geometry at voxel coordinates
///
/// Missing data (unloaded cell, id not in the table) yields no properties,
/// which callers treat as passable.
pub trait BoundsQuery {
    /// Block type at a voxel
    fn block_type(&self, coord: VoxelCoord) -> Option<BlockId>;

    /// Table used to resolve block types
    fn table(&self) -> &BlockTable;

    fn props(&self, coord: VoxelCoord) -> Option<&BlockProps> {
        self.block_type(coord).and_then(|id| self.table().get(id))
    }

    /// Collision boxes at a voxel, `None` when there is no geometry
    fn bounds(&self, coord: VoxelCoord) -> Option<&BlockBounds> {
        self.props(coord).and_then(|p| p.bounds.as_ref())
    }

    fn shape_flags(&self, coord: VoxelCoord) -> ShapeFlags {
        self.props(coord).map(|p| p.flags).unwrap_or_default()
    }

    fn category(&self, coord: VoxelCoord) -> Option<ShapeCategory> {
        self.props(coord).map(BlockProps::category)
    }
}

/// Direct query against a world
pub struct WorldBounds<'a, W: BlockAccess> {
    world: &'a W,
    table: &'a BlockTable,
}

impl<'a, W: BlockAccess> WorldBounds<'a, W> {
    pub fn new(world: &'a W, table: &'a BlockTable) -> Self {
        Self { world, table }
    }
}

impl<W: BlockAccess> BoundsQuery for WorldBounds<'_, W> {
    fn block_type(&self, coord: VoxelCoord) -> Option<BlockId> {
        self.world.block_at(coord)
    }

    fn table(&self) -> &BlockTable {
        self.table
    }
}

/// Memoizing query, one per check
///
/// Path search revisits the same cells many times; the cache keeps world
/// lookups to one per cell. Not shared between threads.
pub struct BlockCache<'a, W: BlockAccess> {
    world: &'a W,
    table: &'a BlockTable,
    cells: RefCell<HashMap<VoxelCoord, Option<BlockId>>>,
}

impl<'a, W: BlockAccess> BlockCache<'a, W> {
    pub fn new(world: &'a W, table: &'a BlockTable) -> Self {
        Self {
            world,
            table,
            cells: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct cells looked up so far
    pub fn cached_cells(&self) -> usize {
        self.cells.borrow().len()
    }
}

impl<W: BlockAccess> BoundsQuery for BlockCache<'_, W> {
    fn block_type(&self, coord: VoxelCoord) -> Option<BlockId> {
        if let Some(id) = self.cells.borrow().get(&coord) {
            return *id;
        }
        let id = self.world.block_at(coord);
        self.cells.borrow_mut().insert(coord, id);
        id
    }

    fn table(&self) -> &BlockTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SparseWorld;
    use std::cell::Cell;

    #[test]
    fn test_world_bounds_resolves_props() {
        let table = BlockTable::standard();
        let stone = table.id("stone").unwrap();
        let mut world = SparseWorld::new(table.id("air").unwrap());
        world.set(VoxelCoord::new(0, 0, 0), stone);
        let query = WorldBounds::new(&world, &table);

        assert!(query.bounds(VoxelCoord::new(0, 0, 0)).unwrap().is_full_cube());
        assert!(query.bounds(VoxelCoord::new(1, 0, 0)).is_none());
        assert_eq!(
            query.category(VoxelCoord::new(0, 0, 0)),
            Some(ShapeCategory::FullCube)
        );
        assert!(query.shape_flags(VoxelCoord::new(0, 0, 0)).is_collidable());
    }

    #[test]
    fn test_unknown_id_has_no_props() {
        let table = BlockTable::standard();
        let world = |_c: VoxelCoord| Some(BlockId(u16::MAX));
        let query = WorldBounds::new(&world, &table);
        assert!(query.props(VoxelCoord::new(0, 0, 0)).is_none());
        assert_eq!(query.shape_flags(VoxelCoord::new(0, 0, 0)), ShapeFlags::empty());
    }

    #[test]
    fn test_cache_reads_world_once_per_cell() {
        let table = BlockTable::standard();
        let stone = table.id("stone").unwrap();
        let reads = Cell::new(0);
        let world = |_c: VoxelCoord| {
            reads.set(reads.get() + 1);
            Some(stone)
        };
        let cache = BlockCache::new(&world, &table);
        for _ in 0..3 {
            cache.bounds(VoxelCoord::new(2, 3, 4));
            cache.shape_flags(VoxelCoord::new(2, 3, 4));
        }
        cache.block_type(VoxelCoord::new(0, 0, 0));
        assert_eq!(reads.get(), 2);
        assert_eq!(cache.cached_cells(), 2);
    }
}
