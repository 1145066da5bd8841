//! Block-to-block crossing test used by the path search
//!
//! Decides whether a sight line may move from one voxel into an adjacent
//! one through their shared face. A short trace along the shared edge
//! settles most cases; when it collides, the entered block's shape category
//! gets the final word.

use crate::passability::Passability;
use crate::tracer::{AxisTracer, TraceOutcome};
use blocks::{Aabb, Axis, BlockBounds, BoundsQuery, Direction, ShapeCategory, VoxelBox, VoxelCoord};
use glam::DVec3;

/// Share of the entered voxel the edge trace covers
const EDGE_TRACE_DEPTH: f64 = 0.99;

/// Tolerance when checking that two half blocks close a face
const FILL_EPSILON: f64 = 0.001;

/// Direction the search must not continue in after crossing a partial block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisHint {
    pub exclude: Option<Direction>,
}

impl AxisHint {
    /// Read and clear the hint
    pub fn take(&mut self) -> Option<Direction> {
        self.exclude.take()
    }
}

/// Result of a shape's face rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceVerdict {
    Pass,
    /// Pass, but the search may not keep moving in this direction
    PassExcluding(Direction),
    Blocked,
}

/// One attempted move between adjacent voxels whose edge trace collided
#[derive(Debug, Clone, Copy)]
pub struct Crossing<'a> {
    /// Voxel being entered
    pub to: VoxelCoord,
    /// Step from the current voxel into `to`
    pub dir: Direction,
    /// Bounds of the entered block
    pub next: &'a BlockBounds,
    /// Bounds of the block being left, if it obstructs at all
    pub last: Option<&'a Aabb>,
    /// Axis through which the edge trace hit the entered block
    pub edge_axis: Option<Axis>,
    /// Block Y of the viewer's eye
    pub eye_y: i32,
    /// Whether this is the first move away from the target
    pub first_hop: bool,
}

/// Shape-specific face rules
pub trait FaceRule {
    fn cross_face(self, crossing: &Crossing<'_>) -> FaceVerdict;
}

impl FaceRule for ShapeCategory {
    fn cross_face(self, crossing: &Crossing<'_>) -> FaceVerdict {
        match self {
            ShapeCategory::Liquid => FaceVerdict::Pass,
            ShapeCategory::Stairs => {
                stairs_face(crossing).unwrap_or_else(|| solid_face(crossing, false))
            }
            ShapeCategory::ThinFence | ShapeCategory::ThickFence | ShapeCategory::Door => {
                solid_face(crossing, true)
            }
            ShapeCategory::FullCube | ShapeCategory::Slab | ShapeCategory::Irregular => {
                solid_face(crossing, false)
            }
        }
    }
}

/// Stairs seen from the side: a riser filling the entered face blocks, and
/// so does the base slab when the eye is on the slab's solid side.
fn stairs_face(c: &Crossing<'_>) -> Option<FaceVerdict> {
    let axis = c.dir.axis;
    if axis == Axis::Y {
        return None;
    }
    let base = c.next.primary();
    if c.eye_y > c.to.y && base.max.y == 1.0 || c.eye_y < c.to.y && base.min.y == 0.0 {
        return Some(FaceVerdict::Blocked);
    }
    let across = if axis == Axis::X { Axis::Z } else { Axis::X };
    let a = axis.index();
    let riser_on_face = c.next.sub_boxes().iter().any(|b| {
        b.spans_full(across.index())
            && if c.dir.positive {
                b.min[a] == 0.0
            } else {
                b.max[a] == 1.0
            }
    });
    riser_on_face.then_some(FaceVerdict::Blocked)
}

/// Face rule for blocks whose primary box may form a wall across the move
///
/// Connectors (fences, doors) only check whether the edge trace hit them
/// through the moving axis. Other walls that leave the far side open let
/// the line in but forbid continuing that way.
fn solid_face(c: &Crossing<'_>, connector: bool) -> FaceVerdict {
    let axis = c.dir.axis;
    let a = axis.index();
    let [o1, o2] = axis.others();
    let next = c.next.primary();

    if next.spans_full(o1.index()) && next.spans_full(o2.index()) {
        let open = if c.dir.positive {
            next.min[a] != 0.0
        } else {
            next.max[a] != 1.0
        };
        if !connector && open {
            return FaceVerdict::PassExcluding(c.dir);
        }
        return if c.edge_axis == Some(axis) {
            FaceVerdict::Blocked
        } else {
            FaceVerdict::Pass
        };
    }

    // Two half blocks stacked against each other close the face
    if let Some(last) = c.last {
        if !c.first_hop && closes_face(axis, c.dir.positive, last, next) {
            return FaceVerdict::Blocked;
        }
    }
    FaceVerdict::Pass
}

fn closes_face(axis: Axis, positive: bool, last: &Aabb, next: &Aabb) -> bool {
    let a = axis.index();
    let touching = if positive {
        last.max[a] == 1.0 && next.min[a] == 0.0
    } else {
        last.min[a] == 0.0 && next.max[a] == 1.0
    };
    if !touching {
        return false;
    }
    let [o1, o2] = axis.others();
    let both_full = |o: Axis| last.spans_full(o.index()) && next.spans_full(o.index());
    let fills = |o: Axis| {
        let i = o.index();
        (filled_span(last.min[i], last.max[i], next.min[i], next.max[i]) - 1.0).abs() <= FILL_EPSILON
    };
    both_full(o1) && fills(o2) || both_full(o2) && fills(o1)
}

/// Length of the union of two ranges
fn filled_span(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
    (a_max - a_min) + (b_max - b_min) - (a_max.min(b_max) - a_min.max(b_min)).max(0.0)
}

fn nested(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> bool {
    b_min <= a_min && a_max <= b_max || a_min <= b_min && b_max <= a_max
}

/// Axes tested for planar exclusion, in order; the later one wins
fn exclusion_order(axis: Axis) -> [Axis; 2] {
    match axis {
        Axis::X => [Axis::Y, Axis::Z],
        Axis::Y => [Axis::X, Axis::Z],
        Axis::Z => [Axis::Y, Axis::X],
    }
}

/// Moving along `axis` between two blocks that are both full along the
/// move and one other axis, with nested ranges on the remaining axis:
/// the open side of that axis is the only way on.
fn planar_exclusion(axis: Axis, last: &Aabb, next: &Aabb, hint: &mut AxisHint) {
    let a = axis.index();
    let [first, second] = exclusion_order(axis);
    for (b, c) in [(first, second), (second, first)] {
        let c = c.index();
        let full = |x: &Aabb| x.spans_full(a) && x.spans_full(c);
        let i = b.index();
        if full(last) && full(next) && nested(next.min[i], next.max[i], last.min[i], last.max[i]) {
            hint.exclude = if next.min[i] == 0.0 {
                Some(Direction::new(b, false))
            } else if next.max[i] == 1.0 {
                Some(Direction::new(b, true))
            } else {
                None
            };
        }
    }
}

/// Edge trace end: 99% into the entered voxel along the move, starting
/// from the min corner of the voxel being left.
fn edge_trace_end(from: VoxelCoord, to: VoxelCoord, dir: Direction) -> DVec3 {
    let mut end = from.corner();
    let a = dir.axis.index();
    let depth = if dir.positive {
        EDGE_TRACE_DEPTH
    } else {
        1.0 - EDGE_TRACE_DEPTH
    };
    end[a] = to.get(dir.axis) as f64 + depth;
    end
}

impl<'q, Q: BoundsQuery> Passability<'q, Q> {
    /// Whether the sight line may move from `from` into the adjacent `to`
    ///
    /// `target_box` cells always pass (the attacked entity's own hitbox).
    /// `hint` receives the direction the search must not continue in.
    pub fn can_pass_through(
        &self,
        tracer: &mut AxisTracer,
        from: VoxelCoord,
        to: VoxelCoord,
        target_box: Option<&VoxelBox>,
        first_hop: bool,
        hint: &mut AxisHint,
    ) -> bool {
        let query = self.query();
        let Some(props) = query.props(to) else {
            return true;
        };
        let Some(next) = props.bounds.as_ref() else {
            return true;
        };
        if self.ignores(to, props) {
            return true;
        }
        let Some(dir) = Direction::from_step(to.delta(from)) else {
            return false;
        };

        let last = query
            .props(from)
            .filter(|p| p.flags.is_collidable())
            .and_then(|p| p.bounds.as_ref())
            .map(BlockBounds::primary);
        if let Some(last) = last {
            planar_exclusion(dir.axis, last, next.primary(), hint);
        }

        if target_box.is_some_and(|b| b.contains(to)) {
            return true;
        }

        tracer.set(from.corner(), edge_trace_end(from, to, dir));
        tracer.set_ignore_initially_colliding(true);
        let outcome = self.trace(tracer);
        tracer.set_ignore_initially_colliding(false);
        if outcome == TraceOutcome::Clear {
            return true;
        }

        let crossing = Crossing {
            to,
            dir,
            next,
            last,
            edge_axis: tracer.colliding_axis(),
            eye_y: self.context().eye_y,
            first_hop,
        };
        let verdict = props.category().cross_face(&crossing);
        tracing::trace!("Crossing {} -> {} ({}): {:?}", from, to, props.name, verdict);
        match verdict {
            FaceVerdict::Pass => true,
            FaceVerdict::PassExcluding(excluded) => {
                hint.exclude = Some(excluded);
                true
            }
            FaceVerdict::Blocked => false,
        }
    }
}
