//! Shape categories derived from flags and bounds

use crate::{BlockBounds, ShapeFlags};
use serde::{Deserialize, Serialize};

/// Closed set of shapes the passability rules distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeCategory {
    FullCube,
    Stairs,
    Slab,
    ThinFence,
    ThickFence,
    Door,
    Liquid,
    Irregular,
}

impl ShapeCategory {
    /// Classify a block from its flags and bounds
    ///
    /// Flags win over geometry: a fence with a full-cube box is still a fence.
    pub fn classify(flags: ShapeFlags, bounds: Option<&BlockBounds>) -> Self {
        if flags.contains(ShapeFlags::LIQUID) {
            ShapeCategory::Liquid
        } else if flags.contains(ShapeFlags::STAIRS) {
            ShapeCategory::Stairs
        } else if flags.contains(ShapeFlags::THICK_FENCE) {
            ShapeCategory::ThickFence
        } else if flags.contains(ShapeFlags::THIN_FENCE) {
            ShapeCategory::ThinFence
        } else if flags.contains(ShapeFlags::DOOR) {
            ShapeCategory::Door
        } else if flags.contains(ShapeFlags::SLAB) {
            ShapeCategory::Slab
        } else if bounds.is_some_and(BlockBounds::is_full_cube) {
            ShapeCategory::FullCube
        } else {
            ShapeCategory::Irregular
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeCategory::FullCube => "full_cube",
            ShapeCategory::Stairs => "stairs",
            ShapeCategory::Slab => "slab",
            ShapeCategory::ThinFence => "thin_fence",
            ShapeCategory::ThickFence => "thick_fence",
            ShapeCategory::Door => "door",
            ShapeCategory::Liquid => "liquid",
            ShapeCategory::Irregular => "irregular",
        }
    }
}

impl std::fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
