//! Types that make up a single puzzle board.

use std::collections::HashSet;

use crate::pieces::PieceId;

pub use self::{
    cell::{Cell, CellFlag},
    common::{GridCoord, WorldPoint},
    config::BoardConfig,
    errors::{ConfigError, GridError},
    grid::CellGrid,
    notify::{ChangeNotifier, ListenerId},
};

mod cell;
mod common;
mod config;
mod errors;
mod grid;
mod notify;

/// An independent puzzle surface: one cell grid, a world anchor, and the
/// set of pieces currently bound to it.
///
/// A board's grid is never shared with another board, and a piece's owning
/// board always matches the board whose grid holds its occupied cells. The
/// [`PlacementEngine`][crate::engine::PlacementEngine] maintains both
/// halves of that invariant; boards expose no public cell mutation.
#[derive(Debug)]
pub struct Board<I: PieceId> {
    grid: CellGrid<Cell<I>>,
    pieces: HashSet<I>,
}

impl<I: PieceId> Board<I> {
    /// Build a board from level configuration.
    ///
    /// `anchor` is the world-space origin resolved by the scene collaborator
    /// that instantiated the level; it seeds the grid's world transforms.
    /// Cells named in the buildable and locked lists get those flags;
    /// everything else defaults to not-buildable and unlocked. This fully
    /// replaces prior state, and configuration errors are fatal here.
    pub fn from_config(config: &BoardConfig, anchor: WorldPoint) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut grid = CellGrid::new(
            config.width,
            config.height,
            config.cell_size,
            anchor,
            |_| Cell::default(),
        )?;
        for &coord in &config.buildable {
            let _ = grid.update(coord, |cell| cell.set_buildable(true));
        }
        for &coord in &config.locked {
            let _ = grid.update(coord, |cell| cell.set_locked(true));
        }
        Ok(Self {
            grid,
            pieces: HashSet::new(),
        })
    }

    /// The board's grid.
    pub fn grid(&self) -> &CellGrid<Cell<I>> {
        &self.grid
    }

    /// World-space anchor of the board.
    pub fn anchor(&self) -> WorldPoint {
        self.grid.origin()
    }

    /// Get the cell at the given coordinate, or `None` out of range.
    pub fn cell(&self, coord: GridCoord) -> Option<&Cell<I>> {
        self.grid.get(coord)
    }

    /// Register a change listener on the board's grid.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(GridCoord) + 'static,
    {
        self.grid.subscribe(listener)
    }

    /// Unregister a change listener. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.grid.unsubscribe(id)
    }

    /// Ids of the pieces currently bound to this board.
    pub fn pieces(&self) -> impl Iterator<Item = &I> {
        self.pieces.iter()
    }

    /// Whether the piece is currently bound to this board.
    pub fn is_bound(&self, piece: &I) -> bool {
        self.pieces.contains(piece)
    }

    pub(crate) fn grid_mut(&mut self) -> &mut CellGrid<Cell<I>> {
        &mut self.grid
    }

    /// Bind a piece to this board. Idempotent.
    pub(crate) fn register(&mut self, piece: I) {
        let _ = self.pieces.insert(piece);
    }

    /// Unbind a piece from this board. No-op when absent.
    pub(crate) fn unregister(&mut self, piece: &I) {
        let _ = self.pieces.remove(piece);
    }

    /// Drop all piece bindings and replace the grid with the cleared
    /// placeholder. The board stays usable and can be re-initialized from a
    /// new configuration.
    pub(crate) fn clear(&mut self) {
        self.grid = CellGrid::empty();
        self.pieces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BoardConfig {
        BoardConfig {
            width: 3,
            height: 2,
            cell_size: 1.5,
            buildable: vec![GridCoord::new(0, 0), GridCoord::new(1, 0)],
            locked: vec![GridCoord::new(2, 1)],
        }
    }

    #[test]
    fn from_config_applies_cell_lists() {
        let board: Board<u32> =
            Board::from_config(&config(), WorldPoint::new(1.0, 2.0, 3.0)).unwrap();

        assert!(board.cell(GridCoord::new(0, 0)).unwrap().is_buildable());
        assert!(board.cell(GridCoord::new(1, 0)).unwrap().is_buildable());
        assert!(!board.cell(GridCoord::new(2, 0)).unwrap().is_buildable());
        assert!(board.cell(GridCoord::new(2, 1)).unwrap().is_locked());
        assert!(!board.cell(GridCoord::new(0, 1)).unwrap().is_locked());
        assert_eq!(board.anchor(), WorldPoint::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn from_config_rejects_invalid_layouts() {
        let mut bad = config();
        bad.locked.push(GridCoord::new(3, 0));
        assert!(Board::<u32>::from_config(&bad, WorldPoint::ORIGIN).is_err());
    }

    #[test]
    fn registration_is_idempotent() {
        let mut board: Board<u32> = Board::from_config(&config(), WorldPoint::ORIGIN).unwrap();
        board.register(5);
        board.register(5);
        assert_eq!(board.pieces().count(), 1);

        board.unregister(&5);
        board.unregister(&5);
        assert_eq!(board.pieces().count(), 0);
    }

    #[test]
    fn clear_leaves_the_empty_placeholder() {
        let mut board: Board<u32> = Board::from_config(&config(), WorldPoint::ORIGIN).unwrap();
        board.register(1);
        board.clear();

        assert_eq!(board.grid().width(), 0);
        assert_eq!(board.grid().height(), 0);
        assert_eq!(board.pieces().count(), 0);
        assert!(board.cell(GridCoord::new(0, 0)).is_none());
    }
}
