//! Per-voxel passability for sight lines
//!
//! A voxel lets a segment through when it has no collision geometry, when
//! its type never obstructs sight (liquids, plants, non-solid blocks), when
//! the viewer looks steeply over or under a fence, or when the segment's
//! box misses every collision box of the block. Fences get a second chance
//! through the post quadrant test, and panes through their cut-back edges.

use crate::tracer::{AxisTracer, TraceOutcome};
use blocks::{Aabb, BlockBounds, BlockProps, BoundsQuery, ShapeFlags, VoxelCoord};
use glam::DVec3;

/// Vertical look component beyond which fences can be seen over / under
pub const STEEP_LOOK: f64 = 0.76;

/// Segments must dip below this height to slip past a pane edge
pub const PANE_SIGHT_HEIGHT: f64 = 0.974;

/// Viewer state a passability decision depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightContext {
    /// Normalized direction from the eye towards what is looked at
    pub look: DVec3,
    /// Block Y of the viewer's feet
    pub feet_y: i32,
    /// Block Y of the viewer's eye
    pub eye_y: i32,
}

impl SightContext {
    /// Context for a viewer whose eye is `eye_height` above the feet
    pub fn new(eye: DVec3, eye_height: f64, target: DVec3) -> Self {
        Self {
            look: (target - eye).normalize_or_zero(),
            feet_y: (eye.y - eye_height).floor() as i32,
            eye_y: eye.y.floor() as i32,
        }
    }

    /// Same viewer, different look direction
    pub fn with_look(self, look: DVec3) -> Self {
        Self {
            look: look.normalize_or_zero(),
            ..self
        }
    }

    /// Looking down onto a block below the feet, or up at one above them
    pub fn is_steep_past(&self, block_y: i32) -> bool {
        self.look.y < -STEEP_LOOK && self.feet_y > block_y
            || self.look.y > STEEP_LOOK && self.feet_y < block_y
    }
}

/// Passability predicate over a bounds query
pub struct Passability<'q, Q: BoundsQuery> {
    query: &'q Q,
    ctx: SightContext,
}

impl<'q, Q: BoundsQuery> Clone for Passability<'q, Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'q, Q: BoundsQuery> Copy for Passability<'q, Q> {}

impl<'q, Q: BoundsQuery> Passability<'q, Q> {
    pub fn new(query: &'q Q, ctx: SightContext) -> Self {
        Self { query, ctx }
    }

    #[inline]
    pub fn query(&self) -> &'q Q {
        self.query
    }

    #[inline]
    pub fn context(&self) -> SightContext {
        self.ctx
    }

    /// Same predicate with another look direction
    pub fn with_look(&self, look: DVec3) -> Self {
        Self {
            query: self.query,
            ctx: self.ctx.with_look(look),
        }
    }

    /// Whether a segment portion may cross `voxel`
    ///
    /// `segment` is in world coordinates. Missing world data passes.
    pub fn passes(&self, voxel: VoxelCoord, segment: &Aabb) -> bool {
        let Some(props) = self.query.props(voxel) else {
            return true;
        };
        let Some(bounds) = props.bounds.as_ref() else {
            return true;
        };
        if self.ignores(voxel, props) {
            return true;
        }
        let flags = props.flags;
        if !collides_bounds(bounds, flags, voxel, segment) {
            return true;
        }
        // Fences: segments staying inside one corner quadrant miss the post
        if let Some(margin) = flags.fence_margin() {
            if !collides_fence(voxel, segment, margin) {
                return true;
            }
        }
        flags.contains(ShapeFlags::THIN_FENCE | ShapeFlags::FAKE_BOUNDS)
            && segment.min.y - voxel.corner().y < PANE_SIGHT_HEIGHT
            && !collides_pane_edges(bounds, voxel, segment)
    }

    /// Blocks that never obstruct for this viewer, whatever the segment
    pub(crate) fn ignores(&self, voxel: VoxelCoord, props: &BlockProps) -> bool {
        if !props.flags.is_collidable() {
            return true;
        }
        props.flags.is_fence() && self.ctx.is_steep_past(voxel.y)
    }

    /// Run a prepared tracer with this predicate
    pub fn trace(&self, tracer: &mut AxisTracer) -> TraceOutcome {
        tracer.loop_with(|voxel, segment, _| self.passes(voxel, segment))
    }
}

/// Box test of a world-space segment box against a block's boxes
///
/// Touching a box counts as contact, except touching a max face that lies
/// inside the block (below 1.0).
pub fn collides_bounds(
    bounds: &BlockBounds,
    flags: ShapeFlags,
    voxel: VoxelCoord,
    segment: &Aabb,
) -> bool {
    let origin = voxel.corner();
    let mut primary = *bounds.primary();
    if flags.contains(ShapeFlags::HEIGHT150) {
        primary.min.y = 0.0;
        primary.max.y = 1.5;
    }
    collides_box(&primary, origin, segment)
        || bounds
            .sub_boxes()
            .iter()
            .any(|b| collides_box(b, origin, segment))
}

/// Box test with the primary box cut back by [`pane_edge_box`]
pub fn collides_pane_edges(bounds: &BlockBounds, voxel: VoxelCoord, segment: &Aabb) -> bool {
    let origin = voxel.corner();
    collides_box(&pane_edge_box(bounds.primary()), origin, segment)
        || bounds
            .sub_boxes()
            .iter()
            .any(|b| collides_box(b, origin, segment))
}

/// Pane box as seen for sight lines
///
/// A thin arm touching one side of the block ends at the center line, and
/// a lone post loses the half past the center on one side.
pub fn pane_edge_box(b: &Aabb) -> Aabb {
    let mut out = *b;
    let dx = b.max.x - b.min.x;
    let dz = b.max.z - b.min.z;
    if dz == 0.125 && dx != 1.0 {
        if b.min.x == 0.0 {
            out.max.x = 0.5;
        }
        if b.max.x == 1.0 {
            out.min.x = 0.5;
        }
    } else if dx == 0.125 && dz != 1.0 {
        if b.min.z == 0.0 {
            out.max.z = 0.5;
        }
        if b.max.z == 1.0 {
            out.min.z = 0.5;
        }
    } else if dx == dz && dx != 1.0 {
        if b.max.x == 0.5625 {
            out.max.x = 0.5;
        } else if b.max.z == 0.5625 {
            out.max.z = 0.5;
        } else if b.min.x == 0.4375 {
            out.min.x = 0.5;
        } else if b.min.z == 0.4375 {
            out.min.z = 0.5;
        }
    }
    out
}

fn collides_box(local: &Aabb, origin: DVec3, segment: &Aabb) -> bool {
    let world = local.translated(origin);
    if segment.min.cmpgt(world.max).any() || segment.max.cmplt(world.min).any() {
        return false;
    }
    for i in 0..3 {
        if segment.min[i] == world.max[i] && local.max[i] < 1.0 {
            return false;
        }
    }
    true
}

/// Whether a segment box can reach a fence post
///
/// `false` only when the box stays inside one XZ quadrant of the voxel and
/// keeps more than `margin` away from the center lines.
pub fn collides_fence(voxel: VoxelCoord, segment: &Aabb, margin: f64) -> bool {
    let origin = voxel.corner();
    let a = segment.min - origin;
    let b = segment.max - origin;
    let (dx1, dz1) = (0.5 - a.x, 0.5 - a.z);
    let (dx2, dz2) = (0.5 - b.x, 0.5 - b.z);
    let off_post = |dx: f64, dz: f64| dx.abs() > margin && dz.abs() > margin;
    !(off_post(dx1, dz1) && off_post(dx2, dz2) && dx1 * dx2 > 0.0 && dz1 * dz2 > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks::{BlockTable, SparseWorld, WorldBounds};

    fn aabb(v: [f64; 6]) -> Aabb {
        Aabb::from_array(v).unwrap()
    }

    fn flat_ctx() -> SightContext {
        SightContext {
            look: DVec3::Z,
            feet_y: 0,
            eye_y: 1,
        }
    }

    #[test]
    fn test_context_from_eye() {
        let ctx = SightContext::new(DVec3::new(0.5, 65.5, 0.5), 1.5, DVec3::new(0.5, 60.0, 0.5));
        assert_eq!(ctx.feet_y, 64);
        assert_eq!(ctx.eye_y, 65);
        assert_eq!(ctx.look, DVec3::NEG_Y);
    }

    #[test]
    fn test_box_touching_max_edge_inside_block_misses() {
        let slab = BlockBounds::single(aabb([0.0, 0.0, 0.0, 1.0, 0.5, 1.0]));
        let v = VoxelCoord::new(0, 0, 0);
        // Resting on top of a slab
        let on_top = aabb([0.0, 0.5, 0.2, 1.0, 0.9, 0.2]);
        assert!(!collides_bounds(&slab, ShapeFlags::SOLID, v, &on_top));
        // Touching the top of a full block counts
        let cube = BlockBounds::full();
        let on_cube = aabb([0.0, 1.0, 0.2, 1.0, 1.0, 0.2]);
        assert!(collides_bounds(&cube, ShapeFlags::SOLID, v, &on_cube));
        // Touching a min face counts
        let at_min = aabb([-1.0, 0.2, 0.2, 0.0, 0.2, 0.2]);
        assert!(collides_bounds(&slab, ShapeFlags::SOLID, v, &at_min));
    }

    #[test]
    fn test_sub_boxes_collide() {
        let stairs = BlockBounds::from_flat(&[
            0.0, 0.0, 0.0, 1.0, 0.5, 1.0, //
            0.0, 0.5, 0.0, 1.0, 1.0, 0.5,
        ])
        .unwrap();
        let v = VoxelCoord::new(2, 0, 0);
        let high_back = aabb([2.0, 0.75, 0.25, 3.0, 0.75, 0.25]);
        let high_front = aabb([2.0, 0.75, 0.75, 3.0, 0.75, 0.75]);
        assert!(collides_bounds(&stairs, ShapeFlags::STAIRS, v, &high_back));
        assert!(!collides_bounds(&stairs, ShapeFlags::STAIRS, v, &high_front));
    }

    #[test]
    fn test_fence_quadrants() {
        let v = VoxelCoord::new(0, 0, 0);
        // Corner quadrant, clear of the post
        assert!(!collides_fence(v, &aabb([0.0, 0.2, 0.0, 0.3, 0.4, 0.3]), 0.125));
        // Crosses the center line
        assert!(collides_fence(v, &aabb([0.0, 0.2, 0.0, 0.7, 0.4, 0.3]), 0.125));
        // Within the thick margin but outside the thin one
        let near = aabb([0.3, 0.2, 0.3, 0.4, 0.4, 0.4]);
        assert!(collides_fence(v, &near, 0.125));
        assert!(!collides_fence(v, &near, 0.0625));
    }

    #[test]
    fn test_pane_edge_box() {
        let post = aabb([0.4375, 0.0, 0.4375, 0.5625, 1.0, 0.5625]);
        assert_eq!(pane_edge_box(&post).max.x, 0.5);
        assert_eq!(pane_edge_box(&post).max.z, 0.5625);
        let north_arm = aabb([0.4375, 0.0, 0.0, 0.5625, 1.0, 0.5625]);
        assert_eq!(pane_edge_box(&north_arm).max.z, 0.5);
        let west_arm = aabb([0.0, 0.0, 0.4375, 0.5625, 1.0, 0.5625]);
        assert_eq!(pane_edge_box(&west_arm).max.x, 0.5);
        // Full-width panes and cubes keep their box
        let wall = aabb([0.0, 0.0, 0.4375, 1.0, 1.0, 0.5625]);
        assert_eq!(pane_edge_box(&wall), wall);
        assert_eq!(pane_edge_box(&Aabb::unit()), Aabb::unit());
    }

    #[test]
    fn test_pane_edges_let_low_segments_through() {
        let mut table = BlockTable::builder();
        let air = table.add("air", ShapeFlags::empty(), None).unwrap();
        let pane = table
            .add_boxes(
                "glass_pane",
                ShapeFlags::SOLID | ShapeFlags::GROUND | ShapeFlags::THIN_FENCE | ShapeFlags::FAKE_BOUNDS,
                &[[0.4375, 0.0, 0.4375, 0.5625, 1.0, 0.5625]],
            )
            .unwrap();
        let exact = table
            .add_boxes(
                "exact_pane",
                ShapeFlags::SOLID | ShapeFlags::GROUND | ShapeFlags::THIN_FENCE,
                &[[0.4375, 0.0, 0.4375, 0.5625, 1.0, 0.5625]],
            )
            .unwrap();
        let table = table.build();
        let mut world = SparseWorld::new(air);
        world.set(VoxelCoord::new(0, 0, 0), pane);
        world.set(VoxelCoord::new(5, 0, 0), exact);
        let query = WorldBounds::new(&world, &table);
        let p = Passability::new(&query, flat_ctx());
        let along_z = |x: f64, y: f64| aabb([x, y, 0.0, x, y, 1.0]);

        // Past the cut-back half of the post
        assert!(p.passes(VoxelCoord::new(0, 0, 0), &along_z(0.53, 0.5)));
        // Through the half that stays
        assert!(!p.passes(VoxelCoord::new(0, 0, 0), &along_z(0.47, 0.5)));
        // Too high up the pane
        assert!(!p.passes(VoxelCoord::new(0, 0, 0), &along_z(0.53, 0.99)));
        // Without the flag the full post blocks
        assert!(!p.passes(VoxelCoord::new(5, 0, 0), &along_z(5.53, 0.5)));
    }

    #[test]
    fn test_standard_pane_arm() {
        let table = BlockTable::standard();
        let mut world = SparseWorld::new(table.id("air").unwrap());
        let v = VoxelCoord::new(1, 0, 0);
        world.set(v, table.id("glass_pane_north").unwrap());
        let query = WorldBounds::new(&world, &table);
        let p = Passability::new(&query, flat_ctx());
        let along_x = |z: f64| aabb([1.0, 0.5, z, 2.0, 0.5, z]);
        assert!(p.passes(v, &along_x(0.53)));
        assert!(!p.passes(v, &along_x(0.25)));
    }

    #[test]
    fn test_steep_past() {
        let mut ctx = flat_ctx();
        ctx.feet_y = 70;
        ctx.look = DVec3::new(0.0, -0.9, 0.1).normalize();
        assert!(ctx.is_steep_past(64));
        assert!(!ctx.is_steep_past(70));
        ctx.look = DVec3::new(0.0, 0.9, 0.1).normalize();
        assert!(!ctx.is_steep_past(64));
        assert!(ctx.is_steep_past(75));
    }

    #[test]
    fn test_unloaded_and_unknown_pass() {
        let table = BlockTable::standard();
        let world = SparseWorld::unloaded();
        let query = WorldBounds::new(&world, &table);
        let p = Passability::new(&query, flat_ctx());
        assert!(p.passes(VoxelCoord::new(0, 0, 0), &aabb([0.0, 0.0, 0.0, 1.0, 1.0, 1.0])));
    }

    #[test]
    fn test_liquid_and_plants_pass() {
        let table = BlockTable::standard();
        let mut world = SparseWorld::new(table.id("air").unwrap());
        world.set(VoxelCoord::new(0, 0, 0), table.id("water").unwrap());
        world.set(VoxelCoord::new(1, 0, 0), table.id("torch").unwrap());
        world.set(VoxelCoord::new(2, 0, 0), table.id("stone").unwrap());
        let query = WorldBounds::new(&world, &table);
        let p = Passability::new(&query, flat_ctx());
        let through = |x: f64| aabb([x, 0.5, 0.5, x + 1.0, 0.5, 0.5]);
        assert!(p.passes(VoxelCoord::new(0, 0, 0), &through(0.0)));
        assert!(p.passes(VoxelCoord::new(1, 0, 0), &through(1.0)));
        assert!(!p.passes(VoxelCoord::new(2, 0, 0), &through(2.0)));
    }
}
