//! Defines the grid container shared by all boards.

use crate::board::{
    common::{GridCoord, WorldPoint},
    errors::GridError,
    notify::{ChangeNotifier, ListenerId},
};

/// Fixed-topology 2D cell store with world-coordinate conversion and change
/// notification. Generic over the cell payload so every board can own an
/// independent instance of its own cell type.
///
/// The grid never resizes. A board that reloads from new configuration
/// replaces its grid wholesale.
#[derive(Debug)]
pub struct CellGrid<T> {
    width: u32,
    height: u32,
    cell_size: f32,
    origin: WorldPoint,
    cells: Box<[T]>,
    notifier: ChangeNotifier,
}

impl<T> CellGrid<T> {
    /// Allocate a `width` by `height` grid, calling `factory` once per cell
    /// in row-major order.
    ///
    /// The degenerate `0x0` grid is legal (it is the cleared placeholder);
    /// a zero width paired with a nonzero height, or the reverse, is a
    /// configuration error, as is a non-positive or non-finite `cell_size`.
    pub fn new<F>(
        width: u32,
        height: u32,
        cell_size: f32,
        origin: WorldPoint,
        mut factory: F,
    ) -> Result<Self, GridError>
    where
        F: FnMut(GridCoord) -> T,
    {
        if (width == 0) != (height == 0) {
            return Err(GridError::Dimensions { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::CellSize { cell_size });
        }
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for z in 0..height {
            for x in 0..width {
                cells.push(factory(GridCoord::new(x as i32, z as i32)));
            }
        }
        Ok(Self {
            width,
            height,
            cell_size,
            origin,
            cells: cells.into_boxed_slice(),
            notifier: ChangeNotifier::default(),
        })
    }

    /// The `0x0` cleared placeholder grid.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cell_size: 1.0,
            origin: WorldPoint::ORIGIN,
            cells: Vec::new().into_boxed_slice(),
            notifier: ChangeNotifier::default(),
        }
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Side length of a square cell in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space position of the cell at `(0, 0)`.
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Whether the coordinate addresses a cell of this grid.
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.index(coord).is_some()
    }

    /// Get a reference to the cell at the given coordinate. Returns `None`
    /// for out-of-range coordinates; callers treat "no cell" and "cell
    /// denies the operation" identically.
    pub fn get(&self, coord: GridCoord) -> Option<&T> {
        self.index(coord).and_then(|index| self.cells.get(index))
    }

    /// Mutate the cell at the given coordinate through `f`, then notify
    /// every registered listener with the coordinate before returning.
    /// Returns `false` without invoking `f` when the coordinate is out of
    /// range.
    pub fn update<F>(&mut self, coord: GridCoord, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.index(coord) {
            Some(index) => {
                f(&mut self.cells[index]);
                self.notifier.notify(coord);
                true
            }
            None => false,
        }
    }

    /// Iterate the cells in row-major order together with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (
                GridCoord::new((index % width) as i32, (index / width) as i32),
                cell,
            )
        })
    }

    /// Register a change listener. Listeners are invoked synchronously from
    /// [`update`][CellGrid::update], in registration order.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(GridCoord) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    /// Unregister a change listener. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Convert a world-space position to the coordinate of the cell
    /// containing it. Floor division: positions left of or behind the
    /// origin map to negative coordinates rather than clamping, so the
    /// result may be out of range.
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        GridCoord::new(
            ((point.x - self.origin.x) / self.cell_size).floor() as i32,
            ((point.z - self.origin.z) / self.cell_size).floor() as i32,
        )
    }

    /// World-space position of the cell's minimum corner:
    /// `origin + (x, 0, z) * cell_size`.
    pub fn grid_to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + coord.x as f32 * self.cell_size,
            self.origin.y,
            self.origin.z + coord.z as f32 * self.cell_size,
        )
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if coord.x < 0 || coord.z < 0 {
            return None;
        }
        let (x, z) = (coord.x as u32, coord.z as u32);
        if x < self.width && z < self.height {
            Some((z * self.width + x) as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn grid(width: u32, height: u32) -> CellGrid<u32> {
        CellGrid::new(width, height, 2.0, WorldPoint::new(10.0, 0.0, -4.0), |_| 0).unwrap()
    }

    #[test]
    fn factory_runs_row_major() {
        let mut coords = Vec::new();
        let _ = CellGrid::new(2, 2, 1.0, WorldPoint::ORIGIN, |coord| coords.push(coord)).unwrap();
        assert_eq!(
            coords,
            vec![
                GridCoord::new(0, 0),
                GridCoord::new(1, 0),
                GridCoord::new(0, 1),
                GridCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn empty_grid_is_legal_but_half_degenerate_is_not() {
        assert!(CellGrid::new(0, 0, 1.0, WorldPoint::ORIGIN, |_| 0u8).is_ok());
        assert_eq!(
            CellGrid::new(0, 3, 1.0, WorldPoint::ORIGIN, |_| 0u8).unwrap_err(),
            GridError::Dimensions {
                width: 0,
                height: 3
            }
        );
        assert_eq!(
            CellGrid::new(3, 0, 1.0, WorldPoint::ORIGIN, |_| 0u8).unwrap_err(),
            GridError::Dimensions {
                width: 3,
                height: 0
            }
        );
    }

    #[test]
    fn rejects_bad_cell_size() {
        for bad in &[0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(CellGrid::new(1, 1, *bad, WorldPoint::ORIGIN, |_| 0u8).is_err());
        }
    }

    #[test]
    fn out_of_range_reads_return_none() {
        let grid = grid(3, 2);
        assert!(grid.get(GridCoord::new(0, 0)).is_some());
        assert!(grid.get(GridCoord::new(2, 1)).is_some());
        assert!(grid.get(GridCoord::new(3, 0)).is_none());
        assert!(grid.get(GridCoord::new(0, 2)).is_none());
        assert!(grid.get(GridCoord::new(-1, 0)).is_none());
        assert!(grid.get(GridCoord::new(0, -1)).is_none());
    }

    #[test]
    fn update_mutates_and_reports_range() {
        let mut grid = grid(2, 2);
        assert!(grid.update(GridCoord::new(1, 1), |cell| *cell = 9));
        assert_eq!(grid.get(GridCoord::new(1, 1)), Some(&9));
        assert!(!grid.update(GridCoord::new(2, 0), |cell| *cell = 9));
    }

    #[test]
    fn update_notifies_synchronously_with_the_coordinate() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut grid = grid(2, 2);
        let listener = {
            let seen = Rc::clone(&seen);
            grid.subscribe(move |coord| seen.borrow_mut().push(coord))
        };

        let coord = GridCoord::new(1, 0);
        assert!(grid.update(coord, |cell| *cell = 1));
        assert_eq!(*seen.borrow(), vec![coord]);

        assert!(grid.unsubscribe(listener));
        assert!(grid.update(coord, |cell| *cell = 2));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn world_to_grid_floors_toward_negative_infinity() {
        let grid = grid(3, 2);
        // Origin is (10, 0, -4) with cell size 2.
        assert_eq!(
            grid.world_to_grid(WorldPoint::new(10.0, 0.0, -4.0)),
            GridCoord::new(0, 0)
        );
        assert_eq!(
            grid.world_to_grid(WorldPoint::new(13.9, 5.0, -0.1)),
            GridCoord::new(1, 1)
        );
        assert_eq!(
            grid.world_to_grid(WorldPoint::new(9.9, 0.0, -4.1)),
            GridCoord::new(-1, -1)
        );
    }

    #[test]
    fn grid_to_world_anchors_cell_corners() {
        let grid = grid(3, 2);
        let point = grid.grid_to_world(GridCoord::new(2, 1));
        assert_eq!((point.x, point.y, point.z), (14.0, 0.0, -2.0));
    }

    #[test]
    fn iter_visits_every_cell_once() {
        let grid = grid(3, 2);
        let coords: Vec<GridCoord> = grid.iter().map(|(coord, _)| coord).collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], GridCoord::new(0, 0));
        assert_eq!(coords[5], GridCoord::new(2, 1));
    }
}
