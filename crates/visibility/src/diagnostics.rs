//! Look-direction diagnostics for block interaction
//!
//! Checks whether the viewer's look direction actually hits the target
//! block by comparing, per axis, the time window during which the look ray
//! is within the block's coordinate range. The results only add tags; they
//! never decide a verdict.

use crate::tags::Tag;
use blocks::{Axis, VoxelCoord};
use glam::DVec3;

/// Squared distance from the block center beyond which a hit point is off the block
const BLOCK_MISS_DIST_SQ: f64 = 0.75;

/// Unit look vector for yaw and pitch in degrees
///
/// Yaw 0 looks towards +Z, yaw 90 towards -X; positive pitch looks down.
pub fn look_direction(yaw: f32, pitch: f32) -> DVec3 {
    let yaw = (yaw as f64).to_radians();
    let pitch = (pitch as f64).to_radians();
    let xz = pitch.cos();
    DVec3::new(-yaw.sin() * xz, -pitch.sin(), yaw.cos() * xz)
}

/// Per-axis entry and exit time of the look ray for one block
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    min: f64,
    max: f64,
}

impl Window {
    fn new(eye: f64, dir: f64, block_diff: i32) -> Self {
        let offset = eye - eye.floor();
        let to_edge = if dir < 0.0 { offset } else { 1.0 - offset };
        let min = if block_diff == 0 {
            0.0
        } else if dir == 0.0 {
            f64::INFINITY
        } else {
            (to_edge + (block_diff.abs() - 1) as f64) / dir.abs()
        };
        let max = if dir == 0.0 {
            f64::MAX
        } else if min == 0.0 {
            to_edge / dir.abs()
        } else {
            min + 1.0 / dir.abs()
        };
        Self { min, max }
    }
}

/// Rounding half up, matching the client's block snapping
#[inline]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Snap a coordinate onto the block's range if it lies outside
fn onto_block(coord: f64, block: i32) -> f64 {
    if coord.floor() as i32 == block {
        coord
    } else {
        round_half_up(coord)
    }
}

/// Pull a coordinate back onto the block face that faces the eye
fn post_correct(block: i32, block_diff: i32, coord: f64) -> f64 {
    let edge = if block_diff < 0 { block + 1 } else { block };
    if coord.floor() as i32 == edge {
        coord
    } else {
        edge as f64
    }
}

fn off_block(block: VoxelCoord, p: DVec3) -> bool {
    block.center().distance_squared(p) > BLOCK_MISS_DIST_SQ
}

/// Tags describing how the look ray from `eye` along `dir` misses `block`
pub fn time_window_tags(eye: DVec3, dir: DVec3, block: VoxelCoord) -> Vec<Tag> {
    let eye_voxel = VoxelCoord::containing(eye);
    let diff = block.delta(eye_voxel);

    let w = Axis::ALL.map(|a| {
        let i = a.index();
        Window::new(eye[i], dir[i], diff[i])
    });
    let t_collide = w.iter().fold(0.0_f64, |t, w| t.max(w.min));
    if !t_collide.is_finite() {
        // Never moves towards the block on some axis
        return vec![Tag::EarlyBlockMiss, Tag::TimeMiss, Tag::LateBlockMiss];
    }

    let mut tags = Vec::new();
    let mut collide = DVec3::ZERO;
    for a in Axis::ALL {
        let i = a.index();
        collide[i] = onto_block(eye[i] + dir[i] * t_collide, block.get(a));
    }
    if off_block(block, collide) {
        tags.push(Tag::EarlyBlockMiss);
    }

    // Entering one axis' range only after leaving both others
    let late = |i: usize| {
        let [j, k] = Axis::ALL[i].others().map(Axis::index);
        w[i].min > w[j].max && w[i].min > w[k].max
    };
    if late(0) || late(1) || late(2) {
        tags.push(Tag::TimeMiss);
        for a in Axis::ALL {
            let i = a.index();
            collide[i] = post_correct(block.get(a), diff[i], collide[i]);
        }
    }

    for (i, w) in w.iter().enumerate() {
        if w.min == t_collide {
            collide[i] = round_half_up(collide[i]);
        }
    }
    if off_block(block, collide) {
        tags.push(Tag::LateBlockMiss);
    }

    tracing::trace!(
        "Look windows for {}: collide at t={:.3} {:?} tags={:?}",
        block,
        t_collide,
        collide,
        tags
    );
    tags
}
