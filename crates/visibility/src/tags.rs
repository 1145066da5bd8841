//! Diagnostic tags attached to a verdict

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Line blocked and the path search found no way around
    Raytracing,
    /// Direct trace needed more steps than allowed
    #[serde(rename = "raytracing_maxsteps")]
    RaytracingMaxSteps,
    /// Look direction misses the block before correction
    EarlyBlockMiss,
    /// Look direction never is inside the block on all axes at once
    TimeMiss,
    /// Look direction misses the block after correction
    LateBlockMiss,
    /// Path search gave up after too many hops
    PathHopLimit,
    /// Eye inside the target (block or hitbox)
    SameBlock,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Raytracing => "raytracing",
            Tag::RaytracingMaxSteps => "raytracing_maxsteps",
            Tag::EarlyBlockMiss => "early_block_miss",
            Tag::TimeMiss => "time_miss",
            Tag::LateBlockMiss => "late_block_miss",
            Tag::PathHopLimit => "path_hop_limit",
            Tag::SameBlock => "same_block",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags joined with `+` for log lines
pub fn join_tags(tags: &[Tag]) -> String {
    tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join("+")
}
