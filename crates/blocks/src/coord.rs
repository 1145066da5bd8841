//! Integer voxel coordinates and inclusive voxel ranges

use crate::Axis;
use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

/// Integer coordinate of a block cell
///
/// Value type used as a set / map key for visited tracking. A world point
/// belongs to the voxel whose min corner is the point floored per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The voxel containing a world point
    ///
    /// Floors towards negative infinity, so `-0.5` lands in voxel `-1`.
    #[inline]
    pub fn containing(p: DVec3) -> Self {
        Self::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }

    #[inline]
    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Min corner of the voxel in world space
    #[inline]
    pub fn corner(self) -> DVec3 {
        DVec3::new(self.x as f64, self.y as f64, self.z as f64)
    }

    /// Center of the voxel in world space
    #[inline]
    pub fn center(self) -> DVec3 {
        self.corner() + DVec3::splat(0.5)
    }

    /// Neighbor offset by a step
    #[inline]
    pub fn offset(self, step: IVec3) -> Self {
        Self::new(self.x + step.x, self.y + step.y, self.z + step.z)
    }

    /// Neighbor offset by `delta` along one axis
    #[inline]
    pub fn stepped(self, axis: Axis, delta: i32) -> Self {
        self.offset(axis.unit() * delta)
    }

    /// Component along an axis
    #[inline]
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Difference `self - other`
    #[inline]
    pub fn delta(self, other: VoxelCoord) -> IVec3 {
        self.as_ivec3() - other.as_ivec3()
    }
}

impl From<IVec3> for VoxelCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from(v: [i32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<VoxelCoord> for [i32; 3] {
    fn from(c: VoxelCoord) -> Self {
        [c.x, c.y, c.z]
    }
}

impl std::fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Inclusive range of voxels
///
/// Used for the cells covered by an entity hitbox. Both corners are
/// included, matching how hitbox extents are floored per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelBox {
    pub min: VoxelCoord,
    pub max: VoxelCoord,
}

impl VoxelBox {
    /// Create a box from two corners, ordering them per axis
    pub fn new(a: VoxelCoord, b: VoxelCoord) -> Self {
        let lo = a.as_ivec3().min(b.as_ivec3());
        let hi = a.as_ivec3().max(b.as_ivec3());
        Self {
            min: lo.into(),
            max: hi.into(),
        }
    }

    /// Voxels touched by a world-space box (both ends floored)
    pub fn covering(min: DVec3, max: DVec3) -> Self {
        Self::new(VoxelCoord::containing(min), VoxelCoord::containing(max))
    }

    /// Check if this box contains the given voxel, edges included
    pub fn contains(&self, c: VoxelCoord) -> bool {
        c.x >= self.min.x
            && c.x <= self.max.x
            && c.y >= self.min.y
            && c.y <= self.max.y
            && c.z >= self.min.z
            && c.z <= self.max.z
    }
}
