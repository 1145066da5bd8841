//! Block table loading from files
//!
//! Verifies that:
//! 1. A table file extends the built-in set
//! 2. Loader errors name the offending block or file
//! 3. A loaded table drives bounds queries over a world

use blocks::{
    BlockTable, BoundsQuery, ShapeCategory, ShapeFlags, SparseWorld, TableError, VoxelCoord,
    WorldBounds,
};
use std::io::Write;

fn write_table(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_extends_standard_set() {
    let file = write_table(
        r#"
        standard = true

        [[block]]
        name = "iron_bars"
        like = "glass_pane"

        [[block]]
        name = "pressure_plate"
        flags = "IGNORE_PASSABLE"
        bounds = [[0.0625, 0.0, 0.0625, 0.9375, 0.0625, 0.9375]]
        "#,
    );

    let table = BlockTable::load(file.path()).unwrap();
    let standard = BlockTable::standard();
    assert_eq!(table.len(), standard.len() + 2);

    let bars = table.get(table.id("iron_bars").unwrap()).unwrap();
    assert_eq!(bars.category(), ShapeCategory::ThinFence);
    assert!(bars.flags.contains(ShapeFlags::FAKE_BOUNDS));
    let plate = table.get(table.id("pressure_plate").unwrap()).unwrap();
    assert!(!plate.flags.is_collidable());
}

#[test]
fn test_load_without_standard_set() {
    let file = write_table(
        r#"
        [[block]]
        name = "air"

        [[block]]
        name = "rock"
        flags = "SOLID | GROUND"
        bounds = [[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]]
        "#,
    );

    let table = BlockTable::load(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.id("stone").is_none());
    let air = table.get(table.lookup("air").unwrap()).unwrap();
    assert_eq!(air.flags, ShapeFlags::empty());
    assert!(air.bounds.is_none());
}

#[test]
fn test_load_reports_bad_bounds() {
    let file = write_table(
        r#"
        [[block]]
        name = "upside_down"
        flags = "SOLID"
        bounds = [[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]]
        "#,
    );

    let err = BlockTable::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("upside_down"), "got: {err}");
}

#[test]
fn test_load_reports_duplicate_of_standard() {
    let file = write_table(
        r#"
        standard = true

        [[block]]
        name = "stone"
        "#,
    );

    assert!(matches!(
        BlockTable::load(file.path()),
        Err(TableError::DuplicateName(name)) if name == "stone"
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BlockTable::load(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, TableError::Io { .. }));
}

#[test]
fn test_loaded_table_drives_queries() {
    let file = write_table(
        r#"
        standard = true

        [[block]]
        name = "tall_fence"
        like = "fence"
        "#,
    );
    let table = BlockTable::load(file.path()).unwrap();

    let mut world = SparseWorld::new(table.lookup("air").unwrap());
    world.set(VoxelCoord::new(0, 64, 0), table.lookup("tall_fence").unwrap());
    let query = WorldBounds::new(&world, &table);

    let flags = query.shape_flags(VoxelCoord::new(0, 64, 0));
    assert!(flags.contains(ShapeFlags::HEIGHT150));
    assert_eq!(
        query.bounds(VoxelCoord::new(0, 64, 0)).unwrap().primary().max.y,
        1.5
    );
    assert!(query.bounds(VoxelCoord::new(0, 65, 0)).is_none());
}
