//! End-to-end placement scenarios driven through the public engine API.

use workgrid::board::{BoardConfig, GridCoord, WorldPoint};
use workgrid::engine::{CannotPlaceReason, PlacementEngine};
use workgrid::pieces::{CellShape, PieceKind, PieceSpec, Rotation};

type Engine = PlacementEngine<&'static str, &'static str, CellShape>;

const ORIGIN: GridCoord = GridCoord { x: 0, z: 0 };

/// A 6x6 board, fully buildable, with a locked 2x2 patch in the corner.
/// The locked cells are also buildable so pieces can ride tools there.
fn workshop_config() -> BoardConfig {
    let mut buildable = Vec::new();
    for z in 0..6 {
        for x in 0..6 {
            buildable.push(GridCoord::new(x, z));
        }
    }
    BoardConfig {
        width: 6,
        height: 6,
        cell_size: 1.0,
        buildable,
        locked: vec![
            GridCoord::new(0, 0),
            GridCoord::new(1, 0),
            GridCoord::new(0, 1),
            GridCoord::new(1, 1),
        ],
    }
}

fn workshop() -> Engine {
    let mut engine = Engine::new();
    engine
        .add_board("shop", &workshop_config(), WorldPoint::ORIGIN)
        .unwrap();
    engine
}

fn normal(shape: CellShape) -> PieceSpec<CellShape> {
    PieceSpec::new(shape, PieceKind::Normal)
}

fn tool(shape: CellShape) -> PieceSpec<CellShape> {
    PieceSpec::new(shape, PieceKind::Tool)
}

/// Snapshot of the observable state of one cell.
fn cell_state(engine: &Engine, coord: GridCoord) -> (bool, bool, bool, bool) {
    let cell = engine.get_board("shop").unwrap().cell(coord).unwrap();
    (
        cell.is_buildable(),
        cell.is_locked(),
        cell.is_occupied(),
        cell.has_infrastructure(),
    )
}

#[test]
fn place_then_remove_restores_cell_state() {
    let mut engine = workshop();
    engine.add_piece("slab", normal(CellShape::rect(2, 1))).unwrap();
    engine.add_piece("bench", tool(CellShape::rect(2, 2))).unwrap();

    let slab_cells = [GridCoord::new(3, 3), GridCoord::new(4, 3)];
    let bench_cells = [
        GridCoord::new(0, 0),
        GridCoord::new(1, 0),
        GridCoord::new(0, 1),
        GridCoord::new(1, 1),
    ];

    let before_slab: Vec<_> = slab_cells.iter().map(|&c| cell_state(&engine, c)).collect();
    let before_bench: Vec<_> = bench_cells.iter().map(|&c| cell_state(&engine, c)).collect();

    engine
        .place(&"slab", GridCoord::new(3, 3), Rotation::R0, &"shop")
        .unwrap();
    engine.place(&"bench", ORIGIN, Rotation::R0, &"shop").unwrap();

    let _ = engine.remove(&"slab").unwrap();
    let _ = engine.remove(&"bench").unwrap();

    let after_slab: Vec<_> = slab_cells.iter().map(|&c| cell_state(&engine, c)).collect();
    let after_bench: Vec<_> = bench_cells.iter().map(|&c| cell_state(&engine, c)).collect();
    assert_eq!(before_slab, after_slab);
    assert_eq!(before_bench, after_bench);

    let piece = engine.get_piece(&"slab").unwrap();
    assert!(!piece.placed());
    assert!(piece.board().is_none());
}

#[test]
fn tools_unlock_the_cells_they_cover() {
    let mut engine = workshop();
    engine.add_piece("bench", tool(CellShape::rect(2, 2))).unwrap();
    engine.place(&"bench", ORIGIN, Rotation::R0, &"shop").unwrap();

    for &coord in &[
        GridCoord::new(0, 0),
        GridCoord::new(1, 0),
        GridCoord::new(0, 1),
        GridCoord::new(1, 1),
    ] {
        let cell = engine.get_board("shop").unwrap().cell(coord).unwrap();
        assert!(!cell.is_locked());
        assert_eq!(cell.infrastructure(), Some(&"bench"));
        assert!(!cell.is_occupied());
    }
}

#[test]
fn tool_placement_preconditions() {
    let mut engine = workshop();
    engine.add_piece("bench", tool(CellShape::rect(2, 2))).unwrap();
    engine.add_piece("jig", tool(CellShape::single())).unwrap();
    engine.add_piece("block", normal(CellShape::single())).unwrap();

    // Unlocked cells never take a tool.
    assert!(!engine.can_place(&"jig", GridCoord::new(4, 4), Rotation::R0, &"shop"));
    let err = engine
        .place(&"jig", GridCoord::new(4, 4), Rotation::R0, &"shop")
        .unwrap_err();
    assert_eq!(err.reason(), CannotPlaceReason::NotLocked);

    // A cell occupied by a placed piece rejects tools even while locked.
    engine.place(&"block", ORIGIN, Rotation::R0, &"shop").unwrap();
    assert!(!engine.can_place(&"bench", ORIGIN, Rotation::R0, &"shop"));
    let _ = engine.remove(&"block").unwrap();

    // Infrastructure from one tool blocks another.
    engine.place(&"jig", ORIGIN, Rotation::R0, &"shop").unwrap();
    assert!(!engine.can_place(&"bench", ORIGIN, Rotation::R0, &"shop"));
    let err = engine
        .place(&"bench", ORIGIN, Rotation::R0, &"shop")
        .unwrap_err();
    assert_eq!(err.reason(), CannotPlaceReason::InfrastructurePresent);
}

#[test]
fn rejected_placement_mutates_nothing() {
    let mut engine = workshop();
    engine.add_piece("block", normal(CellShape::single())).unwrap();
    engine.add_piece("beam", normal(CellShape::rect(3, 1))).unwrap();

    engine
        .place(&"block", GridCoord::new(4, 2), Rotation::R0, &"shop")
        .unwrap();

    // The beam's last cell lands on the block, so the whole footprint fails.
    let origin = GridCoord::new(2, 2);
    assert!(!engine.can_place(&"beam", origin, Rotation::R0, &"shop"));
    let err = engine.place(&"beam", origin, Rotation::R0, &"shop").unwrap_err();
    assert_eq!(err.reason(), CannotPlaceReason::Occupied);

    for &coord in &[GridCoord::new(2, 2), GridCoord::new(3, 2)] {
        let cell = engine.get_board("shop").unwrap().cell(coord).unwrap();
        assert!(!cell.is_occupied());
    }
    assert!(!engine.get_piece(&"beam").unwrap().placed());

    // Footprints reaching past the edge fail the same way.
    assert!(!engine.can_place(&"beam", GridCoord::new(4, 0), Rotation::R0, &"shop"));
    let err = engine
        .place(&"beam", GridCoord::new(4, 0), Rotation::R0, &"shop")
        .unwrap_err();
    assert_eq!(err.reason(), CannotPlaceReason::OutOfBounds);
}

#[test]
fn dragging_over_the_current_position_revalidates() {
    let mut engine = workshop();
    engine.add_piece("slab", normal(CellShape::rect(2, 1))).unwrap();

    engine
        .place(&"slab", GridCoord::new(2, 2), Rotation::R0, &"shop")
        .unwrap();

    // The new footprint overlaps the piece's own cell at (3, 2).
    assert!(engine.can_place(&"slab", GridCoord::new(3, 2), Rotation::R0, &"shop"));
    engine
        .place(&"slab", GridCoord::new(3, 2), Rotation::R0, &"shop")
        .unwrap();

    let board = engine.get_board("shop").unwrap();
    assert!(!board.cell(GridCoord::new(2, 2)).unwrap().is_occupied());
    assert_eq!(board.cell(GridCoord::new(3, 2)).unwrap().placed(), Some(&"slab"));
    assert_eq!(board.cell(GridCoord::new(4, 2)).unwrap().placed(), Some(&"slab"));
}

#[test]
fn placement_transfers_ownership_across_boards() {
    let mut engine = workshop();
    engine
        .add_board("annex", &workshop_config(), WorldPoint::new(32.0, 0.0, 0.0))
        .unwrap();
    engine.add_piece("slab", normal(CellShape::rect(2, 1))).unwrap();

    engine
        .place(&"slab", GridCoord::new(2, 2), Rotation::R0, &"shop")
        .unwrap();
    assert_eq!(engine.get_piece(&"slab").unwrap().board(), Some(&"shop"));
    assert!(engine.get_board("shop").unwrap().is_bound(&"slab"));

    engine
        .place(&"slab", GridCoord::new(2, 2), Rotation::R0, &"annex")
        .unwrap();
    assert_eq!(engine.get_piece(&"slab").unwrap().board(), Some(&"annex"));
    assert!(!engine.get_board("shop").unwrap().is_bound(&"slab"));
    assert!(engine.get_board("annex").unwrap().is_bound(&"slab"));

    let shop_cell = engine.get_board("shop").unwrap().cell(GridCoord::new(2, 2));
    assert!(!shop_cell.unwrap().is_occupied());
    let annex_cell = engine.get_board("annex").unwrap().cell(GridCoord::new(2, 2));
    assert_eq!(annex_cell.unwrap().placed(), Some(&"slab"));
}

#[test]
fn rotation_changes_the_committed_footprint() {
    let mut engine = workshop();
    engine.add_piece("beam", normal(CellShape::rect(3, 1))).unwrap();

    // A quarter turn clockwise swings the beam from +x to -z, so place it
    // low enough that the rotated footprint stays on the board.
    let origin = GridCoord::new(2, 4);
    engine.place(&"beam", origin, Rotation::R90, &"shop").unwrap();

    let board = engine.get_board("shop").unwrap();
    for &coord in &[
        GridCoord::new(2, 4),
        GridCoord::new(2, 3),
        GridCoord::new(2, 2),
    ] {
        assert_eq!(board.cell(coord).unwrap().placed(), Some(&"beam"));
    }
}

#[test]
fn fully_supported_riders_become_passengers() {
    let mut engine = workshop();
    engine.add_piece("bench", tool(CellShape::rect(2, 2))).unwrap();
    engine.add_piece("slab", normal(CellShape::rect(2, 1))).unwrap();

    // Unplaced tools lift trivially.
    assert_eq!(engine.tool_lift_passengers(&"bench"), Some(Vec::new()));

    engine.place(&"bench", ORIGIN, Rotation::R0, &"shop").unwrap();
    engine.place(&"slab", ORIGIN, Rotation::R0, &"shop").unwrap();

    let passengers = engine.tool_lift_passengers(&"bench").unwrap();
    assert_eq!(passengers, vec!["slab"]);
}

#[test]
fn partially_supported_riders_reject_the_lift() {
    let mut engine = workshop();
    engine.add_piece("bench", tool(CellShape::rect(2, 2))).unwrap();
    engine.add_piece("slab", normal(CellShape::rect(2, 1))).unwrap();

    engine.place(&"bench", ORIGIN, Rotation::R0, &"shop").unwrap();
    // The slab covers (1,0) on the bench and (2,0) hanging off the side.
    engine
        .place(&"slab", GridCoord::new(1, 0), Rotation::R0, &"shop")
        .unwrap();

    assert_eq!(engine.tool_lift_passengers(&"bench"), None);
}

#[test]
fn fill_percentage_counts_target_cells() {
    let mut engine = Engine::new();
    let config = BoardConfig {
        width: 3,
        height: 1,
        cell_size: 1.0,
        buildable: vec![GridCoord::new(0, 0), GridCoord::new(1, 0)],
        locked: vec![GridCoord::new(2, 0)],
    };
    engine.add_board("shop", &config, WorldPoint::ORIGIN).unwrap();

    // Two buildable cells plus one locked cell: three targets, none filled.
    assert_eq!(engine.fill_percentage(&"shop"), 0.0);

    engine.add_piece("block", normal(CellShape::single())).unwrap();
    engine.place(&"block", ORIGIN, Rotation::R0, &"shop").unwrap();
    let one_third = engine.fill_percentage(&"shop");
    assert!((one_third - 100.0 / 3.0).abs() < 1e-4);

    // Filling the second buildable cell is monotonically non-decreasing.
    engine.add_piece("block2", normal(CellShape::single())).unwrap();
    engine
        .place(&"block2", GridCoord::new(1, 0), Rotation::R0, &"shop")
        .unwrap();
    let two_thirds = engine.fill_percentage(&"shop");
    assert!(two_thirds > one_third);
    assert!((two_thirds - 200.0 / 3.0).abs() < 1e-4);
}

#[test]
fn obstacles_occupy_cells_but_do_not_fill() {
    let mut engine = workshop();
    engine
        .add_piece("crate", normal(CellShape::single()).obstacle())
        .unwrap();
    engine.place(&"crate", GridCoord::new(3, 3), Rotation::R0, &"shop").unwrap();

    assert_eq!(engine.fill_percentage(&"shop"), 0.0);
    // It still blocks other placements.
    engine.add_piece("block", normal(CellShape::single())).unwrap();
    assert!(!engine.can_place(&"block", GridCoord::new(3, 3), Rotation::R0, &"shop"));
}

#[test]
fn fill_percentage_is_zero_without_target_cells() {
    let mut engine = Engine::new();
    engine
        .add_board("empty", &BoardConfig::empty(), WorldPoint::ORIGIN)
        .unwrap();
    assert_eq!(engine.fill_percentage(&"empty"), 0.0);
    assert_eq!(engine.fill_percentage(&"missing"), 0.0);
}

#[test]
fn occupied_cells_never_report_can_build() {
    let mut engine = workshop();
    engine.add_piece("plate", normal(CellShape::rect(2, 2))).unwrap();
    engine
        .place(&"plate", GridCoord::new(2, 2), Rotation::R0, &"shop")
        .unwrap();

    let board = engine.get_board("shop").unwrap();
    for (_, cell) in board.grid().iter() {
        if cell.is_occupied() {
            assert!(!cell.can_build());
        }
    }
}
