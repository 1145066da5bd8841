//! Coordinate axes and signed axis directions

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (x = 0, y = 1, z = 2)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit step along this axis
    #[inline]
    pub fn unit(self) -> IVec3 {
        match self {
            Axis::X => IVec3::X,
            Axis::Y => IVec3::Y,
            Axis::Z => IVec3::Z,
        }
    }

    /// The two axes orthogonal to this one, in index order
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Read this axis' component of a vector
    #[inline]
    pub fn of(self, v: DVec3) -> f64 {
        v[self.index()]
    }
}

/// An axis together with a sign, e.g. "towards +Y"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub axis: Axis,
    pub positive: bool,
}

impl Direction {
    pub fn new(axis: Axis, positive: bool) -> Self {
        Self { axis, positive }
    }

    /// Direction of a single-axis step, `None` for zero or diagonal steps
    pub fn from_step(step: IVec3) -> Option<Self> {
        match (step.x, step.y, step.z) {
            (x, 0, 0) if x != 0 => Some(Self::new(Axis::X, x > 0)),
            (0, y, 0) if y != 0 => Some(Self::new(Axis::Y, y > 0)),
            (0, 0, z) if z != 0 => Some(Self::new(Axis::Z, z > 0)),
            _ => None,
        }
    }
}
