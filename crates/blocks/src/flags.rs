//! Shape flags of block types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Geometry / behaviour flags of a block type
    ///
    /// Serialized by flag name, e.g. `"SOLID | GROUND"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ShapeFlags: u32 {
        /// Blocks movement and sight
        const SOLID = 1 << 0;
        /// Can be stood on
        const GROUND = 1 << 1;
        /// Water, lava and similar
        const LIQUID = 1 << 2;
        /// Always treated as passable for sight
        const IGNORE_PASSABLE = 1 << 3;
        /// Composite stairs shape (base slab + riser)
        const STAIRS = 1 << 4;
        /// Fences and walls (0.125 post margin)
        const THICK_FENCE = 1 << 5;
        /// Glass panes and bars (0.0625 post margin)
        const THIN_FENCE = 1 << 6;
        /// Doors and trap doors
        const DOOR = 1 << 7;
        /// Half-height block
        const SLAB = 1 << 8;
        /// Collision height of 1.5 (fences)
        const HEIGHT150 = 1 << 9;
        /// Pane edge boxes are cut back to the block center line for sight
        const FAKE_BOUNDS = 1 << 10;
    }
}

impl ShapeFlags {
    /// Either kind of fence
    pub const FENCE: ShapeFlags = ShapeFlags::THICK_FENCE.union(ShapeFlags::THIN_FENCE);

    /// Flags that make a block see-through regardless of its bounds
    pub const SEE_THROUGH: ShapeFlags = ShapeFlags::LIQUID.union(ShapeFlags::IGNORE_PASSABLE);

    /// Whether a block of this type can obstruct sight at all
    #[inline]
    pub fn is_collidable(self) -> bool {
        self.intersects(ShapeFlags::SOLID | ShapeFlags::GROUND) && !self.intersects(Self::SEE_THROUGH)
    }

    #[inline]
    pub fn is_fence(self) -> bool {
        self.intersects(Self::FENCE)
    }

    /// Post margin used by the fence quadrant test, if this is a fence
    pub fn fence_margin(self) -> Option<f64> {
        if self.contains(ShapeFlags::THICK_FENCE) {
            Some(0.125)
        } else if self.contains(ShapeFlags::THIN_FENCE) {
            Some(0.0625)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collidable() {
        assert!((ShapeFlags::SOLID | ShapeFlags::GROUND).is_collidable());
        assert!(ShapeFlags::GROUND.is_collidable());
        assert!(!ShapeFlags::empty().is_collidable());
        assert!(!(ShapeFlags::SOLID | ShapeFlags::LIQUID).is_collidable());
        assert!(!(ShapeFlags::SOLID | ShapeFlags::IGNORE_PASSABLE).is_collidable());
    }

    #[test]
    fn test_fence_margin() {
        assert_eq!(ShapeFlags::THICK_FENCE.fence_margin(), Some(0.125));
        assert_eq!(ShapeFlags::THIN_FENCE.fence_margin(), Some(0.0625));
        assert_eq!(ShapeFlags::SOLID.fence_margin(), None);
        assert!((ShapeFlags::SOLID | ShapeFlags::THIN_FENCE).is_fence());
    }

    #[test]
    fn test_flags_from_names() {
        let flags: ShapeFlags = toml::from_str::<Wrapper>("f = \"SOLID | STAIRS\"")
            .unwrap()
            .f;
        assert_eq!(flags, ShapeFlags::SOLID | ShapeFlags::STAIRS);
    }

    #[derive(Deserialize)]
    struct Wrapper {
        f: ShapeFlags,
    }
}
