//! Line-of-sight checks through voxel block geometry
//!
//! Decides whether a player could plausibly see the block they interact
//! with or the entity they attack. A voxel-stepping trace runs from the
//! target to the eye; when block geometry is in the way, a neighbour-hopping
//! path search looks for a line around it.

mod check;
mod config;
mod crossing;
mod diagnostics;
mod error;
mod passability;
mod path_search;
mod tags;
mod tracer;
mod violation;

pub use check::{Defender, Verdict, Viewer, VisibilityChecker};
pub use config::VisibilityConfig;
pub use crossing::{AxisHint, Crossing, FaceRule, FaceVerdict};
pub use diagnostics::{look_direction, time_window_tags};
pub use error::ConfigError;
pub use passability::{
    collides_bounds, collides_fence, collides_pane_edges, pane_edge_box, Passability,
    SightContext, PANE_SIGHT_HEIGHT, STEEP_LOOK,
};
pub use path_search::{
    correct_dir, neighbors_in_direction, PathRequest, PathSearch, SearchOutcome, SearchResult,
};
pub use tags::{join_tags, Tag};
pub use tracer::{AxisTracer, TraceOutcome};
pub use violation::{
    BlockInteractVisible, CheckKind, FightVisible, Judgement, LogAndCancel, Violation,
    ViolationActions, VisibleData,
};

// Re-export for convenience
pub use blocks;
pub use glam;
