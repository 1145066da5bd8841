//! Visibility checks for block interaction and combat
//!
//! Each check first runs a direct trace between the target and the eye.
//! When that trace collides, a [`PathSearch`] looks for a line around the
//! obstruction before the target is declared hidden.

use crate::config::VisibilityConfig;
use crate::diagnostics::{look_direction, time_window_tags};
use crate::passability::{Passability, SightContext};
use crate::path_search::{PathRequest, PathSearch, SearchOutcome, SearchResult};
use crate::tags::{join_tags, Tag};
use crate::tracer::{AxisTracer, TraceOutcome};
use blocks::{Aabb, BlockAccess, BlockCache, BlockFace, BlockTable, VoxelBox, VoxelCoord};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A player looking at something
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    /// Feet position
    pub position: DVec3,
    pub eye_height: f64,
    /// Degrees
    #[serde(default)]
    pub yaw: f32,
    /// Degrees, positive looks down
    #[serde(default)]
    pub pitch: f32,
}

impl Viewer {
    pub fn eye(&self) -> DVec3 {
        self.position + DVec3::Y * self.eye_height
    }

    /// Unit look vector from yaw and pitch
    pub fn look(&self) -> DVec3 {
        look_direction(self.yaw, self.pitch)
    }
}

/// The entity being attacked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Defender {
    /// Feet position (bottom center)
    pub position: DVec3,
    pub width: f64,
    pub height: f64,
}

impl Defender {
    /// Hitbox with the half width rounded to 1/1000
    pub fn hitbox(&self) -> Aabb {
        let half = (self.width * 500.0).round() / 1000.0;
        let reach = DVec3::new(half, 0.0, half);
        Aabb::spanning(
            self.position - reach,
            self.position + reach + DVec3::Y * self.height,
        )
    }
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    pub obstructed: bool,
    pub tags: Vec<Tag>,
    /// Path search hops
    pub hops: u32,
    /// Steps of the last trace
    pub steps: u32,
}

impl Verdict {
    fn visible(tags: Vec<Tag>) -> Self {
        Self {
            tags,
            ..Default::default()
        }
    }

    /// Fold a path search result into the verdict
    fn searched(mut tags: Vec<Tag>, result: &SearchResult) -> Self {
        let obstructed = !result.outcome.is_visible();
        match result.outcome {
            SearchOutcome::Visible => {}
            SearchOutcome::Obstructed => tags.push(Tag::Raytracing),
            SearchOutcome::StepLimit => tags.push(Tag::RaytracingMaxSteps),
            SearchOutcome::HopLimit => {
                tags.push(Tag::Raytracing);
                tags.push(Tag::PathHopLimit);
            }
        }
        Self {
            obstructed,
            tags,
            hops: result.hops,
            steps: result.steps,
        }
    }
}

/// Runs visibility checks against a shared block table
///
/// Holds no per-check state: tracers and caches live in the call frame, so
/// one checker can serve many threads.
#[derive(Debug, Clone)]
pub struct VisibilityChecker {
    config: VisibilityConfig,
    table: Arc<BlockTable>,
}

impl VisibilityChecker {
    pub fn new(config: VisibilityConfig, table: Arc<BlockTable>) -> Self {
        Self { config, table }
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    pub fn table(&self) -> &Arc<BlockTable> {
        &self.table
    }

    /// Whether `viewer` can see the `face` of the block at `target`
    pub fn check_block_interaction<W: BlockAccess>(
        &self,
        world: &W,
        viewer: &Viewer,
        target: VoxelCoord,
        face: BlockFace,
    ) -> Verdict {
        let eye = viewer.eye();
        if VoxelCoord::containing(eye) == target {
            return Verdict::visible(vec![Tag::SameBlock]);
        }

        let mut tags = Vec::new();
        if self.config.debug {
            tags.extend(time_window_tags(eye, viewer.look(), target));
        }

        let max_steps = self.config.interact_max_steps;
        let query = BlockCache::new(world, &self.table);
        let passability = Passability::new(
            &query,
            SightContext::new(eye, viewer.eye_height, target.center()),
        );

        let mut tracer = AxisTracer::new(max_steps);
        tracer.set(target.corner(), eye);
        tracer.set_ignore_initially_colliding(true);
        let verdict = match passability.trace(&mut tracer) {
            TraceOutcome::Clear => Verdict {
                steps: tracer.steps_done(),
                ..Verdict::visible(tags)
            },
            TraceOutcome::StepLimit => {
                tags.push(Tag::RaytracingMaxSteps);
                Verdict {
                    obstructed: true,
                    tags,
                    hops: 0,
                    steps: tracer.steps_done(),
                }
            }
            TraceOutcome::Blocked { voxel, .. } => {
                tracing::debug!("Direct line to {} blocked at {}", target, voxel);
                let search = PathSearch::new(passability, self.config.hops_for(max_steps));
                let result = search.run(
                    &mut tracer,
                    &PathRequest {
                        origin: target,
                        eye,
                        target_box: None,
                        stop_at_eye_voxel: false,
                    },
                );
                Verdict::searched(tags, &result)
            }
        };

        if self.config.debug {
            tracing::debug!(
                "Interact {} face {}: obstructed={} pitch={} yaw={} tags={}",
                target,
                face,
                verdict.obstructed,
                viewer.pitch,
                viewer.yaw,
                join_tags(&verdict.tags)
            );
        }
        verdict
    }

    /// Whether the attacker's eye can see any part of the defender
    pub fn check_combat<W: BlockAccess>(
        &self,
        world: &W,
        attacker: &Viewer,
        defender: &Defender,
    ) -> Verdict {
        let eye = attacker.eye();
        let hitbox = defender.hitbox();
        if hitbox.contains_point(eye) {
            return Verdict::visible(vec![Tag::SameBlock]);
        }

        let max_steps = self.config.combat_max_steps;
        let query = BlockCache::new(world, &self.table);
        let passability = Passability::new(
            &query,
            SightContext::new(eye, attacker.eye_height, defender.position),
        );

        let mut tracer = AxisTracer::new(max_steps);
        tracer.set(defender.position, eye);
        let verdict = match passability.trace(&mut tracer) {
            TraceOutcome::Clear => Verdict {
                steps: tracer.steps_done(),
                ..Verdict::default()
            },
            TraceOutcome::StepLimit => Verdict {
                obstructed: true,
                tags: vec![Tag::RaytracingMaxSteps],
                hops: 0,
                steps: tracer.steps_done(),
            },
            TraceOutcome::Blocked { voxel, .. } => {
                tracing::debug!("Direct line to defender blocked at {}", voxel);
                let search = PathSearch::new(passability, self.config.hops_for(max_steps));
                let result = search.run(
                    &mut tracer,
                    &PathRequest {
                        origin: VoxelCoord::containing(defender.position),
                        eye,
                        target_box: Some(VoxelBox::covering(hitbox.min, hitbox.max)),
                        stop_at_eye_voxel: true,
                    },
                );
                Verdict::searched(Vec::new(), &result)
            }
        };

        if self.config.debug {
            tracing::debug!(
                "Combat at {:?}: obstructed={} tags={}",
                defender.position,
                verdict.obstructed,
                join_tags(&verdict.tags)
            );
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks::SparseWorld;

    fn checker() -> VisibilityChecker {
        VisibilityChecker::new(VisibilityConfig::default(), Arc::new(BlockTable::standard()))
    }

    fn viewer_at(x: f64, y: f64, z: f64) -> Viewer {
        Viewer {
            position: DVec3::new(x, y, z),
            eye_height: 1.5,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    #[test]
    fn test_hitbox_rounding() {
        let d = Defender {
            position: DVec3::new(10.0, 64.0, -3.0),
            width: 0.6,
            height: 1.8,
        };
        let hitbox = d.hitbox();
        assert!((hitbox.min.x - 9.7).abs() < 1e-12);
        assert!((hitbox.max.z - -2.7).abs() < 1e-12);
        assert_eq!(hitbox.min.y, 64.0);
        assert!((hitbox.max.y - 65.8).abs() < 1e-12);
    }

    #[test]
    fn test_interact_with_block_at_eye() {
        let checker = checker();
        let world = SparseWorld::new(checker.table().id("stone").unwrap());
        let viewer = viewer_at(0.5, 0.0, 0.5);
        let verdict = checker.check_block_interaction(&world, &viewer, VoxelCoord::new(0, 1, 0), BlockFace::Up);
        assert!(!verdict.obstructed);
        assert_eq!(verdict.tags, vec![Tag::SameBlock]);
    }

    #[test]
    fn test_interact_in_air() {
        let checker = checker();
        let world = SparseWorld::new(checker.table().id("air").unwrap());
        let viewer = viewer_at(0.5, 0.0, 0.5);
        let verdict = checker.check_block_interaction(&world, &viewer, VoxelCoord::new(0, 0, 5), BlockFace::North);
        assert!(!verdict.obstructed);
        assert_eq!(verdict.hops, 0);
    }

    #[test]
    fn test_interact_step_limit() {
        let table = Arc::new(BlockTable::standard());
        let config = VisibilityConfig {
            interact_max_steps: 3,
            ..Default::default()
        };
        let checker = VisibilityChecker::new(config, table.clone());
        let world = SparseWorld::new(table.id("air").unwrap());
        let viewer = viewer_at(0.5, 0.0, 0.5);
        let verdict = checker.check_block_interaction(&world, &viewer, VoxelCoord::new(0, 0, 10), BlockFace::North);
        assert!(verdict.obstructed);
        assert_eq!(verdict.tags, vec![Tag::RaytracingMaxSteps]);
    }

    #[test]
    fn test_combat_eye_inside_hitbox() {
        let checker = checker();
        let world = SparseWorld::new(checker.table().id("stone").unwrap());
        let attacker = viewer_at(0.5, 0.0, 0.5);
        let defender = Defender {
            position: DVec3::new(0.5, 0.0, 0.5),
            width: 0.6,
            height: 1.8,
        };
        let verdict = checker.check_combat(&world, &attacker, &defender);
        assert!(!verdict.obstructed);
    }

    #[test]
    fn test_combat_in_open() {
        let checker = checker();
        let world = SparseWorld::new(checker.table().id("air").unwrap());
        let attacker = viewer_at(0.5, 0.0, 0.5);
        let defender = Defender {
            position: DVec3::new(0.5, 0.0, 3.5),
            width: 0.6,
            height: 1.8,
        };
        assert!(!checker.check_combat(&world, &attacker, &defender).obstructed);
    }
}
