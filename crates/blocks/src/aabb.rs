//! Axis-aligned bounding boxes for block geometry
//!
//! Block bounds are stored relative to the block's min corner, so a full
//! cube is `[0,0,0 .. 1,1,1]`. Composite shapes (stairs, connected fences)
//! carry several boxes; the first one is the primary box that shape rules
//! inspect, the rest are sub-boxes.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    /// A box has `min > max` on some axis
    #[error("inverted bounding box: min {min:?} exceeds max {max:?}")]
    Inverted { min: [f64; 3], max: [f64; 3] },

    /// A composite shape without any box
    #[error("composite bounds need at least one box")]
    Empty,

    /// A box component is NaN or infinite
    #[error("bounding box component is not finite")]
    NotFinite,
}

/// Axis-Aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 6]", into = "[f64; 6]")]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: DVec3,
    /// Maximum corner of the bounding box
    pub max: DVec3,
}

impl Aabb {
    /// Create a new AABB, rejecting inverted or non-finite boxes
    pub fn try_new(min: DVec3, max: DVec3) -> Result<Self, BoundsError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(BoundsError::NotFinite);
        }
        if min.cmpgt(max).any() {
            return Err(BoundsError::Inverted {
                min: min.to_array(),
                max: max.to_array(),
            });
        }
        Ok(Self { min, max })
    }

    /// Build from the six components `minX, minY, minZ, maxX, maxY, maxZ`
    pub fn from_array(v: [f64; 6]) -> Result<Self, BoundsError> {
        Self::try_new(
            DVec3::new(v[0], v[1], v[2]),
            DVec3::new(v[3], v[4], v[5]),
        )
    }

    /// Unit cube `[0,1]³`, the bounds of a full block
    pub const fn unit() -> Self {
        Self {
            min: DVec3::ZERO,
            max: DVec3::ONE,
        }
    }

    /// Smallest box containing both points (order does not matter)
    pub fn spanning(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Translate by an offset
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Test if a point is inside, including the edges
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Whether the box covers the whole unit range on the given axis index
    #[inline]
    pub fn spans_full(&self, axis: usize) -> bool {
        self.min[axis] == 0.0 && self.max[axis] == 1.0
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }
}

impl TryFrom<[f64; 6]> for Aabb {
    type Error = BoundsError;

    fn try_from(v: [f64; 6]) -> Result<Self, Self::Error> {
        Self::from_array(v)
    }
}

impl From<Aabb> for [f64; 6] {
    fn from(b: Aabb) -> Self {
        b.to_array()
    }
}

/// Bounds of one block: a primary box plus optional sub-boxes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Aabb>", into = "Vec<Aabb>")]
pub struct BlockBounds {
    boxes: Vec<Aabb>,
}

impl BlockBounds {
    /// Create from a list of boxes, the first being the primary box
    pub fn new(boxes: Vec<Aabb>) -> Result<Self, BoundsError> {
        if boxes.is_empty() {
            return Err(BoundsError::Empty);
        }
        Ok(Self { boxes })
    }

    /// Bounds made of a single box
    pub fn single(b: Aabb) -> Self {
        Self { boxes: vec![b] }
    }

    /// Full block
    pub fn full() -> Self {
        Self::single(Aabb::unit())
    }

    /// Parse a flat list of 6-tuples (`minX, minY, minZ, maxX, maxY, maxZ` per box)
    pub fn from_flat(values: &[f64]) -> Result<Self, BoundsError> {
        if values.is_empty() || values.len() % 6 != 0 {
            return Err(BoundsError::Empty);
        }
        let boxes = values
            .chunks_exact(6)
            .map(|c| Aabb::from_array([c[0], c[1], c[2], c[3], c[4], c[5]]))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(boxes)
    }

    /// The first box (for stairs: the base slab)
    #[inline]
    pub fn primary(&self) -> &Aabb {
        &self.boxes[0]
    }

    /// Boxes after the primary one
    #[inline]
    pub fn sub_boxes(&self) -> &[Aabb] {
        &self.boxes[1..]
    }

    #[inline]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Whether this is exactly one unit cube
    pub fn is_full_cube(&self) -> bool {
        self.boxes.len() == 1 && self.boxes[0] == Aabb::unit()
    }
}

impl TryFrom<Vec<Aabb>> for BlockBounds {
    type Error = BoundsError;

    fn try_from(boxes: Vec<Aabb>) -> Result<Self, Self::Error> {
        Self::new(boxes)
    }
}

impl From<BlockBounds> for Vec<Aabb> {
    fn from(b: BlockBounds) -> Self {
        b.boxes
    }
}
