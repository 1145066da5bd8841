//! Neighbour-hopping fallback when the direct sight line is blocked
//!
//! Starting at the target voxel, the search repeatedly steps to one of the
//! up to three neighbours facing the eye, as long as the line can cross
//! into it, it does not overshoot the eye's height band and it was not
//! tried before. From every accepted neighbour a fresh trace to the eye is
//! run; the first clear trace makes the target visible.

use crate::crossing::AxisHint;
use crate::passability::Passability;
use crate::tracer::{AxisTracer, TraceOutcome};
use blocks::{Axis, BoundsQuery, Direction, VoxelBox, VoxelCoord};
use glam::DVec3;
use std::collections::HashSet;

/// Vertical direction share above which the vertical neighbour may go first
const VERTICAL_PREFERENCE: f64 = 0.5;

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A hop reached a clear line to the eye
    Visible,
    /// No acceptable neighbour left
    Obstructed,
    /// A trace from a hop needed too many steps
    StepLimit,
    /// Too many hops
    HopLimit,
}

impl SearchOutcome {
    #[inline]
    pub fn is_visible(self) -> bool {
        self == SearchOutcome::Visible
    }
}

/// Search result with counters for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    /// Accepted neighbours
    pub hops: u32,
    /// Steps of the last trace run
    pub steps: u32,
    /// Voxel the search ended on
    pub last_voxel: VoxelCoord,
}

/// Input of one search
#[derive(Debug, Clone)]
pub struct PathRequest {
    /// Voxel the search starts from (target block, defender feet)
    pub origin: VoxelCoord,
    pub eye: DVec3,
    /// Voxels that always pass and are exempt from the height band check
    pub target_box: Option<VoxelBox>,
    /// Treat reaching the eye's own voxel as visible
    pub stop_at_eye_voxel: bool,
}

/// Path search over a passability predicate
pub struct PathSearch<'q, Q: BoundsQuery> {
    passability: Passability<'q, Q>,
    max_hops: u32,
}

impl<'q, Q: BoundsQuery> PathSearch<'q, Q> {
    pub fn new(passability: Passability<'q, Q>, max_hops: u32) -> Self {
        Self {
            passability,
            max_hops,
        }
    }

    /// Run the search, reusing `tracer` for all traces
    pub fn run(&self, tracer: &mut AxisTracer, request: &PathRequest) -> SearchResult {
        let eye = request.eye;
        let eye_voxel = VoxelCoord::containing(eye);
        let y_range = request.target_box.map(|b| (b.min.y, b.max.y));

        let mut visited = HashSet::new();
        let mut hint = AxisHint::default();
        let mut current = request.origin;
        let mut hops = 0;

        let finish = |outcome, hops, steps, voxel| {
            tracing::debug!(
                "Path search from {} ended {:?} after {} hops at {}",
                request.origin,
                outcome,
                hops,
                voxel
            );
            SearchResult {
                outcome,
                hops,
                steps,
                last_voxel: voxel,
            }
        };

        loop {
            if hops >= self.max_hops {
                return finish(SearchOutcome::HopLimit, hops, tracer.steps_done(), current);
            }

            let dir = (eye - current.corner()).normalize_or_zero();
            let crossing = self.passability.with_look(-dir);
            let first_hop = current == request.origin;

            let mut accepted = None;
            for candidate in neighbors_in_direction(current, dir, eye, hint.take()) {
                if crossing.can_pass_through(
                    tracer,
                    current,
                    candidate,
                    request.target_box.as_ref(),
                    first_hop,
                    &mut hint,
                ) && correct_dir(candidate.y, request.origin.y, eye_voxel.y, y_range)
                    && !visited.contains(&candidate)
                {
                    accepted = Some(candidate);
                    break;
                }
            }

            let Some(next) = accepted else {
                return finish(SearchOutcome::Obstructed, hops, tracer.steps_done(), current);
            };
            if request.stop_at_eye_voxel && next == eye_voxel {
                return finish(SearchOutcome::Visible, hops, tracer.steps_done(), next);
            }

            visited.insert(next);
            hops += 1;
            current = next;

            tracer.set(next.corner(), eye);
            tracer.set_ignore_initially_colliding(true);
            let outcome = self.passability.trace(tracer);
            tracer.set_ignore_initially_colliding(false);
            tracing::trace!("Hop {} to {}: {:?}", hops, next, outcome);

            match outcome {
                TraceOutcome::Clear => {
                    return finish(SearchOutcome::Visible, hops, tracer.steps_done(), next)
                }
                TraceOutcome::StepLimit => {
                    return finish(SearchOutcome::StepLimit, hops, tracer.steps_done(), next)
                }
                TraceOutcome::Blocked { .. } => {}
            }
        }
    }
}

/// Up to three neighbours of `current` facing along `dir`, most promising first
///
/// The vertical neighbour leads when it is closest to the eye (Manhattan
/// distance from its min corner) and the direction is at least half
/// vertical. Otherwise the closer horizontal neighbour leads and the
/// vertical one comes last. Neighbours along a zero direction component or
/// in the `exclude` direction are left out.
pub fn neighbors_in_direction(
    current: VoxelCoord,
    dir: DVec3,
    eye: DVec3,
    exclude: Option<Direction>,
) -> Vec<VoxelCoord> {
    let step = |axis: Axis| {
        let v = axis.of(dir);
        if v > 0.0 {
            1
        } else if v < 0.0 {
            -1
        } else {
            0
        }
    };
    let candidate = |axis: Axis| current.stepped(axis, step(axis));
    let manhattan = |axis: Axis| {
        let d = candidate(axis).corner() - eye;
        d.x.abs() + d.y.abs() + d.z.abs()
    };

    let (dx, dy, dz) = (manhattan(Axis::X), manhattan(Axis::Y), manhattan(Axis::Z));
    let order = if dy <= dx && dy <= dz && dir.y.abs() >= VERTICAL_PREFERENCE {
        if dx < dz {
            [Axis::Y, Axis::X, Axis::Z]
        } else {
            [Axis::Y, Axis::Z, Axis::X]
        }
    } else if dx < dz {
        [Axis::X, Axis::Z, Axis::Y]
    } else {
        [Axis::Z, Axis::X, Axis::Y]
    };

    order
        .into_iter()
        .filter(|&axis| {
            let s = step(axis);
            s != 0 && exclude != Some(Direction::new(axis, s > 0))
        })
        .map(candidate)
        .collect()
}

/// Height band check for a neighbour
///
/// The search may not climb past the eye when the eye is above the origin,
/// sink below it when the eye is below, or leave the eye's layer when both
/// are level. Neighbours inside `exempt` (inclusive Y range) always pass.
pub fn correct_dir(neighbor_y: i32, origin_y: i32, eye_y: i32, exempt: Option<(i32, i32)>) -> bool {
    if let Some((min, max)) = exempt {
        if neighbor_y >= min && neighbor_y <= max {
            return true;
        }
    }
    match eye_y.cmp(&origin_y) {
        std::cmp::Ordering::Greater => neighbor_y <= eye_y,
        std::cmp::Ordering::Less => neighbor_y >= eye_y,
        std::cmp::Ordering::Equal => neighbor_y == eye_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passability::SightContext;
    use blocks::{BlockTable, SparseWorld, WorldBounds};

    fn wall_world(table: &BlockTable, z: i32) -> SparseWorld {
        let mut world = SparseWorld::new(table.id("air").unwrap());
        world.fill_box(
            VoxelBox::new(VoxelCoord::new(-8, -8, z), VoxelCoord::new(8, 8, z)),
            table.id("stone").unwrap(),
        );
        world
    }

    fn search(world: &SparseWorld, table: &BlockTable, request: &PathRequest) -> SearchResult {
        let query = WorldBounds::new(world, table);
        let ctx = SightContext::new(request.eye, 1.5, request.origin.center());
        let search = PathSearch::new(Passability::new(&query, ctx), 60);
        let mut tracer = AxisTracer::new(60);
        search.run(&mut tracer, request)
    }

    #[test]
    fn test_neighbor_order_horizontal() {
        let eye = DVec3::new(0.5, 0.5, 5.5);
        let current = VoxelCoord::new(0, 0, 0);
        let dir = (eye - current.corner()).normalize();
        assert_eq!(
            neighbors_in_direction(current, dir, eye, None),
            vec![
                VoxelCoord::new(0, 0, 1),
                VoxelCoord::new(1, 0, 0),
                VoxelCoord::new(0, 1, 0),
            ]
        );
    }

    #[test]
    fn test_neighbor_order_vertical_first() {
        let eye = DVec3::new(1.5, 6.5, 0.5);
        let current = VoxelCoord::new(0, 0, 0);
        let dir = (eye - current.corner()).normalize();
        assert_eq!(
            neighbors_in_direction(current, dir, eye, None),
            vec![
                VoxelCoord::new(0, 1, 0),
                VoxelCoord::new(1, 0, 0),
                VoxelCoord::new(0, 0, 1),
            ]
        );
    }

    #[test]
    fn test_neighbor_exclusion_and_zero_components() {
        let current = VoxelCoord::new(0, 0, 0);
        let neighbors = neighbors_in_direction(
            current,
            DVec3::new(0.0, -0.6, 0.8),
            DVec3::new(0.0, -3.0, 4.0),
            Some(Direction::new(Axis::Y, false)),
        );
        assert_eq!(neighbors, vec![VoxelCoord::new(0, 0, 1)]);
    }

    #[test]
    fn test_correct_dir() {
        // Eye above origin: no climbing past the eye
        assert!(correct_dir(5, 0, 5, None));
        assert!(!correct_dir(6, 0, 5, None));
        // Eye below origin
        assert!(correct_dir(-2, 0, -2, None));
        assert!(!correct_dir(-3, 0, -2, None));
        // Level: stay on the layer
        assert!(correct_dir(3, 3, 3, None));
        assert!(!correct_dir(4, 3, 3, None));
        // Hitbox rows are exempt
        assert!(correct_dir(4, 3, 3, Some((3, 4))));
    }

    #[test]
    fn test_cycle_terminates_obstructed() {
        let table = BlockTable::standard();
        let world = wall_world(&table, 2);
        let request = PathRequest {
            origin: VoxelCoord::new(0, 0, 0),
            eye: DVec3::new(0.5, 0.5, 5.5),
            target_box: None,
            stop_at_eye_voxel: false,
        };
        let result = search(&world, &table, &request);
        assert_eq!(result.outcome, SearchOutcome::Obstructed);
        // (0,0,1) then (1,0,1); stepping back to (0,0,1) is refused
        assert_eq!(result.hops, 2);
        assert_eq!(result.last_voxel, VoxelCoord::new(1, 0, 1));
    }

    #[test]
    fn test_finds_way_around_partial_wall() {
        let table = BlockTable::standard();
        let mut world = SparseWorld::new(table.id("air").unwrap());
        world.set(VoxelCoord::new(0, 0, 2), table.id("stone").unwrap());
        let request = PathRequest {
            origin: VoxelCoord::new(0, 0, 0),
            eye: DVec3::new(0.5, 0.5, 5.5),
            target_box: None,
            stop_at_eye_voxel: false,
        };
        let result = search(&world, &table, &request);
        assert_eq!(result.outcome, SearchOutcome::Visible);
        assert!(result.hops >= 1);
    }

    #[test]
    fn test_hop_limit() {
        let table = BlockTable::standard();
        let world = wall_world(&table, 6);
        let query = WorldBounds::new(&world, &table);
        let eye = DVec3::new(0.5, 0.5, 20.5);
        let ctx = SightContext::new(eye, 1.5, DVec3::new(0.5, 0.5, 0.5));
        let search = PathSearch::new(Passability::new(&query, ctx), 3);
        let mut tracer = AxisTracer::new(60);
        let result = search.run(
            &mut tracer,
            &PathRequest {
                origin: VoxelCoord::new(0, 0, 0),
                eye,
                target_box: None,
                stop_at_eye_voxel: false,
            },
        );
        assert_eq!(result.outcome, SearchOutcome::HopLimit);
        assert_eq!(result.hops, 3);
    }

    #[test]
    fn test_step_limited_hop_trace() {
        let table = BlockTable::standard();
        let world = SparseWorld::new(table.id("air").unwrap());
        let query = WorldBounds::new(&world, &table);
        let eye = DVec3::new(0.5, 0.5, 30.5);
        let ctx = SightContext::new(eye, 1.5, DVec3::new(0.5, 0.5, 0.5));
        let search = PathSearch::new(Passability::new(&query, ctx), 60);
        let mut tracer = AxisTracer::new(10);
        let result = search.run(
            &mut tracer,
            &PathRequest {
                origin: VoxelCoord::new(0, 0, 0),
                eye,
                target_box: None,
                stop_at_eye_voxel: false,
            },
        );
        assert_eq!(result.outcome, SearchOutcome::StepLimit);
    }

    #[test]
    fn test_eye_voxel_short_circuit() {
        let table = BlockTable::standard();
        let world = SparseWorld::new(table.id("air").unwrap());
        let request = PathRequest {
            origin: VoxelCoord::new(0, 0, 0),
            eye: DVec3::new(0.5, 0.5, 1.5),
            target_box: None,
            stop_at_eye_voxel: true,
        };
        let result = search(&world, &table, &request);
        assert_eq!(result.outcome, SearchOutcome::Visible);
        assert_eq!(result.hops, 0);
        assert_eq!(result.last_voxel, VoxelCoord::new(0, 0, 1));
    }
}
