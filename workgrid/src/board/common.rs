//! Coordinate and world-space primitives shared by the board types.

use serde::{Deserialize, Serialize};

/// The coordinates of a [`Cell`][crate::board::Cell] in a board's grid.
/// The grid plane is `x`/`z`; components are signed so that world-position
/// conversion and rotated footprint offsets can express out-of-range
/// positions. Bounds are enforced at grid access, never by clamping.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    /// Horizontal position of the cell.
    pub x: i32,
    /// Depth position of the cell.
    pub z: i32,
}

impl GridCoord {
    /// Construct a [`GridCoord`] from the given `x` and `z`.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Translate this coordinate by the given offset, component-wise.
    pub fn offset(self, by: GridCoord) -> Self {
        Self {
            x: self.x + by.x,
            z: self.z + by.z,
        }
    }
}

impl From<(i32, i32)> for GridCoord {
    /// Construct a [`GridCoord`] from the given `(x, z)` pair.
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

impl From<GridCoord> for (i32, i32) {
    /// Convert the [`GridCoord`] into an `(x, z)` pair.
    fn from(coord: GridCoord) -> Self {
        (coord.x, coord.z)
    }
}

/// A position in world space. The grid lies in the `x`/`z` plane; `y`
/// points up and is carried through conversions unchanged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldPoint {
    /// Horizontal world position.
    pub x: f32,
    /// Vertical world position.
    pub y: f32,
    /// Depth world position.
    pub z: f32,
}

impl WorldPoint {
    /// The world-space origin.
    pub const ORIGIN: WorldPoint = WorldPoint {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Construct a [`WorldPoint`] from the given components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
