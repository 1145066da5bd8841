//! Block property table
//!
//! Maps block ids to their shape flags and bounds. A table is built once
//! (programmatically or from TOML) and then shared read-only, usually behind
//! an `Arc`.
//!
//! # TOML format
//!
//! ```toml
//! standard = true          # start from the built-in block set
//!
//! [[block]]
//! name = "stone_wall"
//! like = "fence"           # copy flags / bounds of an earlier block
//!
//! [[block]]
//! name = "half_wall"
//! flags = "SOLID | GROUND"
//! bounds = [[0.0, 0.0, 0.0, 1.0, 0.5, 0.5]]
//! ```

use crate::{Aabb, BlockBounds, BoundsError, ShapeCategory, ShapeFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Index of a block type in a [`BlockTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u16);

/// Errors raised while building or loading a block table
#[derive(Error, Debug)]
pub enum TableError {
    #[error("block '{0}' is defined twice")]
    DuplicateName(String),

    #[error("unknown block '{0}'")]
    UnknownBlock(String),

    #[error("invalid bounds for block '{name}': {source}")]
    InvalidBounds {
        name: String,
        #[source]
        source: BoundsError,
    },

    #[error("block table is full ({0} entries)")]
    TooManyBlocks(usize),

    #[error("failed to parse block table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Properties of one block type
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProps {
    pub name: String,
    pub flags: ShapeFlags,
    /// `None` for blocks without collision geometry (air, plants)
    pub bounds: Option<BlockBounds>,
    category: ShapeCategory,
}

impl BlockProps {
    pub fn new(name: impl Into<String>, flags: ShapeFlags, bounds: Option<BlockBounds>) -> Self {
        let category = ShapeCategory::classify(flags, bounds.as_ref());
        Self {
            name: name.into(),
            flags,
            bounds,
            category,
        }
    }

    #[inline]
    pub fn category(&self) -> ShapeCategory {
        self.category
    }
}

/// Immutable block id → properties table
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    blocks: Vec<BlockProps>,
    by_name: HashMap<String, BlockId>,
}

impl BlockTable {
    pub fn builder() -> BlockTableBuilder {
        BlockTableBuilder::default()
    }

    /// The built-in block set (see [`BlockTableBuilder::standard`])
    pub fn standard() -> Self {
        BlockTableBuilder::standard().build()
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockProps> {
        self.blocks.get(id.0 as usize)
    }

    /// Id of a block by name
    pub fn id(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Like [`BlockTable::id`] but with an error for unknown names
    pub fn lookup(&self, name: &str) -> Result<BlockId, TableError> {
        self.id(name)
            .ok_or_else(|| TableError::UnknownBlock(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over `(id, props)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockProps)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, p)| (BlockId(i as u16), p))
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, TableError> {
        let def: TableDef = toml::from_str(text)?;
        def.build()
    }

    /// Load a table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_toml_str(&text)?;
        tracing::info!("Loaded block table from {} ({} blocks)", path.display(), table.len());
        Ok(table)
    }
}

/// Builder for [`BlockTable`]
#[derive(Debug, Default)]
pub struct BlockTableBuilder {
    table: BlockTable,
}

impl BlockTableBuilder {
    /// Register a block type
    pub fn add(
        &mut self,
        name: &str,
        flags: ShapeFlags,
        bounds: Option<BlockBounds>,
    ) -> Result<BlockId, TableError> {
        if self.table.by_name.contains_key(name) {
            return Err(TableError::DuplicateName(name.to_string()));
        }
        let index = self.table.blocks.len();
        if index > u16::MAX as usize {
            return Err(TableError::TooManyBlocks(index));
        }
        let id = BlockId(index as u16);
        self.table
            .blocks
            .push(BlockProps::new(name, flags, bounds));
        self.table.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register a block from raw 6-tuples
    pub fn add_boxes(
        &mut self,
        name: &str,
        flags: ShapeFlags,
        boxes: &[[f64; 6]],
    ) -> Result<BlockId, TableError> {
        let bounds = parse_boxes(name, boxes)?;
        self.add(name, flags, bounds)
    }

    /// Register `name` with the flags and bounds of an existing block
    pub fn add_like(&mut self, name: &str, like: &str) -> Result<BlockId, TableError> {
        let source = self
            .table
            .id(like)
            .and_then(|id| self.table.get(id))
            .cloned()
            .ok_or_else(|| TableError::UnknownBlock(like.to_string()))?;
        self.add(name, source.flags, source.bounds)
    }

    pub fn build(self) -> BlockTable {
        self.table
    }

    /// Builder pre-populated with the common block shapes
    ///
    /// Includes air, full cubes, liquids, plants, slabs, stairs for each
    /// facing plus one upside-down set, fences, panes and closed doors.
    /// Stairs facings name the side the riser stands on.
    pub fn standard() -> Self {
        let mut b = Self::default();
        for (name, flags, boxes) in STANDARD_BLOCKS {
            let added = parse_boxes(name, boxes).and_then(|bounds| b.add(name, *flags, bounds));
            debug_assert!(added.is_ok(), "built-in block '{name}' rejected: {added:?}");
        }
        b
    }
}

fn parse_boxes(name: &str, boxes: &[[f64; 6]]) -> Result<Option<BlockBounds>, TableError> {
    if boxes.is_empty() {
        return Ok(None);
    }
    let invalid = |source| TableError::InvalidBounds {
        name: name.to_string(),
        source,
    };
    let parsed = boxes
        .iter()
        .map(|b| Aabb::from_array(*b))
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;
    BlockBounds::new(parsed).map(Some).map_err(invalid)
}

// ============================================================================
// TOML definitions
// ============================================================================

/// Serialized form of a block table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableDef {
    /// Start from the built-in block set
    #[serde(default)]
    pub standard: bool,
    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockDef>,
}

/// Serialized form of one block type
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDef {
    pub name: String,
    /// Copy flags and bounds from an earlier block
    #[serde(default)]
    pub like: Option<String>,
    #[serde(default)]
    pub flags: ShapeFlags,
    /// One `[minX, minY, minZ, maxX, maxY, maxZ]` entry per box
    #[serde(default)]
    pub bounds: Vec<[f64; 6]>,
}

impl TableDef {
    pub fn build(&self) -> Result<BlockTable, TableError> {
        let mut builder = if self.standard {
            BlockTableBuilder::standard()
        } else {
            BlockTableBuilder::default()
        };
        for def in &self.blocks {
            match &def.like {
                Some(like) => builder.add_like(&def.name, like)?,
                None => builder.add_boxes(&def.name, def.flags, &def.bounds)?,
            };
        }
        let table = builder.build();
        tracing::debug!("Built block table with {} blocks", table.len());
        Ok(table)
    }
}

// ============================================================================
// Built-in blocks
// ============================================================================

const SOLID_GROUND: ShapeFlags = ShapeFlags::SOLID.union(ShapeFlags::GROUND);
const FENCE: ShapeFlags = SOLID_GROUND
    .union(ShapeFlags::THICK_FENCE)
    .union(ShapeFlags::HEIGHT150);
const PANE: ShapeFlags = SOLID_GROUND
    .union(ShapeFlags::THIN_FENCE)
    .union(ShapeFlags::FAKE_BOUNDS);
const STAIRS: ShapeFlags = SOLID_GROUND.union(ShapeFlags::STAIRS);
const SLAB: ShapeFlags = SOLID_GROUND.union(ShapeFlags::SLAB);
const DOOR: ShapeFlags = SOLID_GROUND.union(ShapeFlags::DOOR);

const FULL: [f64; 6] = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
const BOTTOM_HALF: [f64; 6] = [0.0, 0.0, 0.0, 1.0, 0.5, 1.0];
const TOP_HALF: [f64; 6] = [0.0, 0.5, 0.0, 1.0, 1.0, 1.0];

type BlockEntry = (&'static str, ShapeFlags, &'static [[f64; 6]]);

const STANDARD_BLOCKS: &[BlockEntry] = &[
    ("air", ShapeFlags::empty(), &[]),
    ("stone", SOLID_GROUND, &[FULL]),
    ("dirt", SOLID_GROUND, &[FULL]),
    ("glass", SOLID_GROUND, &[FULL]),
    ("water", ShapeFlags::LIQUID, &[FULL]),
    ("lava", ShapeFlags::LIQUID, &[FULL]),
    ("tall_grass", ShapeFlags::IGNORE_PASSABLE, &[]),
    ("torch", ShapeFlags::IGNORE_PASSABLE, &[[0.4, 0.0, 0.4, 0.6, 0.6, 0.6]]),
    ("slab_bottom", SLAB, &[BOTTOM_HALF]),
    ("slab_top", SLAB, &[TOP_HALF]),
    ("stairs_east", STAIRS, &[BOTTOM_HALF, [0.5, 0.5, 0.0, 1.0, 1.0, 1.0]]),
    ("stairs_west", STAIRS, &[BOTTOM_HALF, [0.0, 0.5, 0.0, 0.5, 1.0, 1.0]]),
    ("stairs_south", STAIRS, &[BOTTOM_HALF, [0.0, 0.5, 0.5, 1.0, 1.0, 1.0]]),
    ("stairs_north", STAIRS, &[BOTTOM_HALF, [0.0, 0.5, 0.0, 1.0, 1.0, 0.5]]),
    ("stairs_east_top", STAIRS, &[TOP_HALF, [0.5, 0.0, 0.0, 1.0, 0.5, 1.0]]),
    ("fence", FENCE, &[[0.375, 0.0, 0.375, 0.625, 1.5, 0.625]]),
    ("glass_pane", PANE, &[[0.4375, 0.0, 0.4375, 0.5625, 1.0, 0.5625]]),
    ("glass_pane_north", PANE, &[[0.4375, 0.0, 0.0, 0.5625, 1.0, 0.5625]]),
    ("door_north", DOOR, &[[0.0, 0.0, 0.0, 1.0, 1.0, 0.1875]]),
    ("door_south", DOOR, &[[0.0, 0.0, 0.8125, 1.0, 1.0, 1.0]]),
    ("door_west", DOOR, &[[0.0, 0.0, 0.0, 0.1875, 1.0, 1.0]]),
    ("door_east", DOOR, &[[0.8125, 0.0, 0.0, 1.0, 1.0, 1.0]]),
];
