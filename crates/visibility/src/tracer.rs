//! Axis-stepping segment tracer
//!
//! Walks a line segment voxel by voxel. At every step the tracer advances to
//! whichever integer boundary the segment reaches first (ties in the order
//! Y, X, Z), enters the neighbouring voxel and asks a predicate whether the
//! portion of the segment inside that voxel may pass.
//!
//! The voxel containing the start point is asked first, with the portion
//! from the start to where the segment leaves it. Every boundary crossing
//! counts as one step; the trace gives up once more than `max_steps`
//! crossings were needed.

use blocks::{Aabb, Axis, VoxelCoord};
use glam::DVec3;

/// Tie-break order for simultaneous boundary crossings
const AXIS_ORDER: [Axis; 3] = [Axis::Y, Axis::X, Axis::Z];

/// How a trace ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    /// Reached the end point
    Clear,
    /// Stopped at an impassable voxel, entered through `axis`
    /// (`None` for the start voxel)
    Blocked {
        voxel: VoxelCoord,
        axis: Option<Axis>,
    },
    /// Needed more than `max_steps` crossings
    StepLimit,
}

impl TraceOutcome {
    /// Blocked and step-limited traces both count as obstructed
    #[inline]
    pub fn is_obstructed(self) -> bool {
        !matches!(self, TraceOutcome::Clear)
    }
}

/// Discrete segment tracer
#[derive(Debug, Clone)]
pub struct AxisTracer {
    start: DVec3,
    end: DVec3,
    steps_done: u32,
    max_steps: u32,
    collides: bool,
    colliding_axis: Option<Axis>,
    ignore_initially_colliding: bool,
    stop_voxel: VoxelCoord,
    outcome: TraceOutcome,
}

impl AxisTracer {
    pub fn new(max_steps: u32) -> Self {
        Self {
            start: DVec3::ZERO,
            end: DVec3::ZERO,
            steps_done: 0,
            max_steps,
            collides: false,
            colliding_axis: None,
            ignore_initially_colliding: false,
            stop_voxel: VoxelCoord::new(0, 0, 0),
            outcome: TraceOutcome::Clear,
        }
    }

    /// Prepare a trace from `start` to `end`, clearing the previous result
    pub fn set(&mut self, start: DVec3, end: DVec3) {
        self.start = start;
        self.end = end;
        self.steps_done = 0;
        self.collides = false;
        self.colliding_axis = None;
        self.stop_voxel = VoxelCoord::containing(start);
        self.outcome = TraceOutcome::Clear;
    }

    /// Never report a collision for the voxel containing the start point
    pub fn set_ignore_initially_colliding(&mut self, ignore: bool) {
        self.ignore_initially_colliding = ignore;
    }

    pub fn set_max_steps(&mut self, max_steps: u32) {
        self.max_steps = max_steps;
    }

    /// Run the trace
    ///
    /// `passable(voxel, segment_box, entry_axis)` receives the world-space
    /// box of the segment portion inside `voxel` and returns whether the
    /// segment may cross it.
    pub fn loop_with<F>(&mut self, mut passable: F) -> TraceOutcome
    where
        F: FnMut(VoxelCoord, &Aabb, Option<Axis>) -> bool,
    {
        let start = self.start;
        let delta = self.end - start;
        let mut voxel = VoxelCoord::containing(start);
        self.stop_voxel = voxel;

        if delta == DVec3::ZERO {
            self.outcome = TraceOutcome::Clear;
            return self.outcome;
        }

        // Parametric time (0..1) of the next boundary per axis and the time
        // needed to cross one voxel.
        let mut t_next = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        let mut step = [0i32; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            let d = delta[i];
            let p = start[i];
            if d > 0.0 {
                step[i] = 1;
                t_delta[i] = 1.0 / d;
                t_next[i] = (voxel.get(axis) as f64 + 1.0 - p) / d;
            } else if d < 0.0 {
                step[i] = -1;
                t_delta[i] = -1.0 / d;
                t_next[i] = (voxel.get(axis) as f64 - p) / d;
            }
        }

        let point_at = |t: f64| start + delta * t;
        let soonest = |t_next: &[f64; 3]| {
            AXIS_ORDER
                .into_iter()
                .fold(None::<Axis>, |best, axis| match best {
                    Some(b) if t_next[b.index()] <= t_next[axis.index()] => Some(b),
                    _ => Some(axis),
                })
                .unwrap_or(Axis::Y)
        };

        let mut t = 0.0;
        let mut t_exit = t_next.iter().copied().fold(1.0, f64::min);

        if !self.ignore_initially_colliding
            && !passable(voxel, &Aabb::spanning(point_at(t), point_at(t_exit)), None)
        {
            return self.block(voxel, None);
        }

        while t_exit < 1.0 {
            let axis = soonest(&t_next);
            let i = axis.index();

            self.steps_done += 1;
            if self.steps_done > self.max_steps {
                self.stop_voxel = voxel;
                self.outcome = TraceOutcome::StepLimit;
                return self.outcome;
            }

            voxel = voxel.stepped(axis, step[i]);
            t = t_next[i];
            t_next[i] += t_delta[i];
            t_exit = t_next.iter().copied().fold(1.0, f64::min);

            if !passable(voxel, &Aabb::spanning(point_at(t), point_at(t_exit)), Some(axis)) {
                return self.block(voxel, Some(axis));
            }
        }

        self.stop_voxel = voxel;
        self.outcome = TraceOutcome::Clear;
        self.outcome
    }

    fn block(&mut self, voxel: VoxelCoord, axis: Option<Axis>) -> TraceOutcome {
        self.collides = true;
        self.colliding_axis = axis;
        self.stop_voxel = voxel;
        self.outcome = TraceOutcome::Blocked { voxel, axis };
        self.outcome
    }

    #[inline]
    pub fn collides(&self) -> bool {
        self.collides
    }

    #[inline]
    pub fn steps_done(&self) -> u32 {
        self.steps_done
    }

    #[inline]
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Axis of the crossing that entered the blocking voxel
    #[inline]
    pub fn colliding_axis(&self) -> Option<Axis> {
        self.colliding_axis
    }

    /// Voxel the last trace stopped in
    #[inline]
    pub fn stop_voxel(&self) -> VoxelCoord {
        self.stop_voxel
    }

    #[inline]
    pub fn outcome(&self) -> TraceOutcome {
        self.outcome
    }

    pub fn start(&self) -> DVec3 {
        self.start
    }

    pub fn end(&self) -> DVec3 {
        self.end
    }
}
