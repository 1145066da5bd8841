//! Block geometry for line-of-sight checks
//!
//! Voxel coordinates, block bounding boxes, shape flags, the block property
//! table and read-only bounds queries over a world.

mod aabb;
mod axis;
mod coord;
mod face;
mod flags;
mod query;
mod shape;
mod table;
mod world;

pub use aabb::{Aabb, BlockBounds, BoundsError};
pub use axis::{Axis, Direction};
pub use coord::{VoxelBox, VoxelCoord};
pub use face::BlockFace;
pub use flags::ShapeFlags;
pub use query::{BlockCache, BoundsQuery, WorldBounds};
pub use shape::ShapeCategory;
pub use table::{BlockDef, BlockId, BlockProps, BlockTable, BlockTableBuilder, TableDef, TableError};
pub use world::{BlockAccess, SparseWorld};

// Re-export glam for convenience
pub use glam;
