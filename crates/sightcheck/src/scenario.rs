//! Scenario files: a block table, a world and a list of checks

use anyhow::{Context, Result};
use blocks::{BlockFace, BlockTable, SparseWorld, TableDef, VoxelBox, VoxelCoord};
use serde::Deserialize;
use sightline_visibility::{
    join_tags, BlockInteractVisible, Defender, FightVisible, LogAndCancel, Verdict, Viewer,
    VisibilityChecker, VisibilityConfig, VisibleData,
};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<VisibilityConfig>,
    /// Block table; the built-in set when absent
    #[serde(default)]
    pub table: Option<TableDef>,
    #[serde(default)]
    pub world: WorldDef,
    #[serde(default)]
    pub interact: Vec<InteractCase>,
    #[serde(default)]
    pub combat: Vec<CombatCase>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldDef {
    /// Block for every cell not set explicitly; unloaded when absent
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub set: Vec<CellDef>,
    #[serde(default, rename = "fill_box")]
    pub boxes: Vec<BoxDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellDef {
    pub at: VoxelCoord,
    pub block: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxDef {
    pub min: VoxelCoord,
    pub max: VoxelCoord,
    pub block: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    Visible,
    Obstructed,
}

impl Expect {
    fn of(verdict: &Verdict) -> Self {
        if verdict.obstructed {
            Expect::Obstructed
        } else {
            Expect::Visible
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Expect::Visible => "visible",
            Expect::Obstructed => "obstructed",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractCase {
    pub name: String,
    pub viewer: Viewer,
    pub target: VoxelCoord,
    #[serde(default = "default_face")]
    pub face: BlockFace,
    #[serde(default)]
    pub expect: Option<Expect>,
}

fn default_face() -> BlockFace {
    BlockFace::Up
}

#[derive(Debug, Clone, Deserialize)]
pub struct CombatCase {
    pub name: String,
    pub attacker: Viewer,
    pub defender: Defender,
    #[serde(default)]
    pub expect: Option<Expect>,
}

/// Result of one scenario check
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub kind: &'static str,
    pub verdict: Verdict,
    pub expect: Option<Expect>,
    pub cancel: bool,
}

impl CaseReport {
    pub fn matches(&self) -> bool {
        self.expect.map_or(true, |e| e == Expect::of(&self.verdict))
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.expect {
            None => "----",
            Some(_) if self.matches() => "PASS",
            Some(_) => "FAIL",
        };
        write!(
            f,
            "[{}] {} {}: {} (hops={}, steps={}",
            status,
            self.kind,
            self.name,
            Expect::of(&self.verdict),
            self.verdict.hops,
            self.verdict.steps
        )?;
        if !self.verdict.tags.is_empty() {
            write!(f, ", tags={}", join_tags(&self.verdict.tags))?;
        }
        if let Some(expect) = self.expect {
            if !self.matches() {
                write!(f, ", expected {}", expect)?;
            }
        }
        write!(f, ")")
    }
}

/// Summary of a scenario run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub cases: Vec<CaseReport>,
    pub interact_vl: f64,
    pub fight_vl: f64,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.cases.iter().filter(|c| !c.matches()).count()
    }
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse scenario")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In scenario {}", path.display()))
    }

    pub fn build_table(&self) -> Result<BlockTable> {
        match &self.table {
            Some(def) => Ok(def.build()?),
            None => Ok(BlockTable::standard()),
        }
    }

    pub fn build_world(&self, table: &BlockTable) -> Result<SparseWorld> {
        let mut world = match &self.world.fill {
            Some(name) => SparseWorld::new(table.lookup(name)?),
            None => SparseWorld::unloaded(),
        };
        for b in &self.world.boxes {
            world.fill_box(VoxelBox::new(b.min, b.max), table.lookup(&b.block)?);
        }
        for cell in &self.world.set {
            world.set(cell.at, table.lookup(&cell.block)?);
        }
        Ok(world)
    }

    /// Run every check in file order
    ///
    /// Violation levels accumulate across the checks of one kind, as they
    /// would for a single player.
    pub fn run(&self, config: VisibilityConfig) -> Result<RunReport> {
        let table = Arc::new(self.build_table()?);
        let world = self.build_world(&table)?;
        let checker = VisibilityChecker::new(config, table);
        tracing::info!(
            "Running {} interact and {} combat checks over {} cells",
            self.interact.len(),
            self.combat.len(),
            world.len()
        );

        let mut report = RunReport::default();
        let mut actions = LogAndCancel;

        let interact = BlockInteractVisible::new(checker.clone());
        let mut data = VisibleData::default();
        for case in &self.interact {
            let judgement = interact.check(
                &world,
                &case.viewer,
                case.target,
                case.face,
                &mut data,
                &mut actions,
            );
            report.cases.push(CaseReport {
                name: case.name.clone(),
                kind: "interact",
                verdict: judgement.verdict,
                expect: case.expect,
                cancel: judgement.cancel,
            });
        }
        report.interact_vl = data.vl;

        let fight = FightVisible::new(checker);
        let mut data = VisibleData::default();
        for case in &self.combat {
            let judgement = fight.check(&world, &case.attacker, &case.defender, &mut data, &mut actions);
            report.cases.push(CaseReport {
                name: case.name.clone(),
                kind: "combat",
                verdict: judgement.verdict,
                expect: case.expect,
                cancel: judgement.cancel,
            });
        }
        report.fight_vl = data.vl;

        Ok(report)
    }
}
