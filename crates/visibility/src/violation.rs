//! Violation level accounting on top of the visibility checks

use crate::check::{Defender, Verdict, Viewer, VisibilityChecker};
use crate::tags::{join_tags, Tag};
use blocks::{BlockAccess, BlockFace, VoxelCoord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which check raised a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    BlockInteractVisible,
    FightVisible,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckKind::BlockInteractVisible => "blockinteract.visible",
            CheckKind::FightVisible => "fight.visible",
        })
    }
}

/// One violation handed to the action executor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation<'a> {
    pub check: CheckKind,
    /// Violation level after this violation
    pub vl: f64,
    /// Amount added by this violation
    pub added: f64,
    pub tags: &'a [Tag],
}

/// Executes configured penalties for a violation
pub trait ViolationActions {
    /// Returns whether the triggering action should be cancelled
    fn execute(&mut self, violation: &Violation<'_>) -> bool;
}

/// Logs every violation and cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndCancel;

impl ViolationActions for LogAndCancel {
    fn execute(&mut self, violation: &Violation<'_>) -> bool {
        tracing::warn!(
            "{} failed: vl={:.2} (+{}) tags={}",
            violation.check,
            violation.vl,
            violation.added,
            join_tags(violation.tags)
        );
        true
    }
}

/// Per-player violation level of one check
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibleData {
    pub vl: f64,
}

/// Outcome of a wrapped check
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub cancel: bool,
    pub verdict: Verdict,
}

/// Block interaction visibility with violation accounting
///
/// An obstructed interaction adds 1 to the level and runs the actions;
/// a visible one decays the level.
#[derive(Debug, Clone)]
pub struct BlockInteractVisible {
    checker: VisibilityChecker,
}

impl BlockInteractVisible {
    pub fn new(checker: VisibilityChecker) -> Self {
        Self { checker }
    }

    pub fn check<W, A>(
        &self,
        world: &W,
        viewer: &Viewer,
        target: VoxelCoord,
        face: BlockFace,
        data: &mut VisibleData,
        actions: &mut A,
    ) -> Judgement
    where
        W: BlockAccess,
        A: ViolationActions,
    {
        let verdict = self.checker.check_block_interaction(world, viewer, target, face);
        let cancel = if verdict.obstructed {
            data.vl += 1.0;
            actions.execute(&Violation {
                check: CheckKind::BlockInteractVisible,
                vl: data.vl,
                added: 1.0,
                tags: &verdict.tags,
            })
        } else {
            data.vl *= self.checker.config().vl_decay;
            false
        };
        Judgement { cancel, verdict }
    }
}

/// Combat visibility with violation accounting
///
/// An obstructed attack adds 1 to the level and runs the actions. The level
/// does not decay here.
#[derive(Debug, Clone)]
pub struct FightVisible {
    checker: VisibilityChecker,
}

impl FightVisible {
    pub fn new(checker: VisibilityChecker) -> Self {
        Self { checker }
    }

    pub fn check<W, A>(
        &self,
        world: &W,
        attacker: &Viewer,
        defender: &Defender,
        data: &mut VisibleData,
        actions: &mut A,
    ) -> Judgement
    where
        W: BlockAccess,
        A: ViolationActions,
    {
        let verdict = self.checker.check_combat(world, attacker, defender);
        let cancel = verdict.obstructed && {
            data.vl += 1.0;
            actions.execute(&Violation {
                check: CheckKind::FightVisible,
                vl: data.vl,
                added: 1.0,
                tags: &verdict.tags,
            })
        };
        Judgement { cancel, verdict }
    }
}
