//! Errors used by the board, grid, and configuration types.

use thiserror::Error;

use crate::board::common::GridCoord;

/// Error constructing a [`CellGrid`][crate::board::CellGrid].
#[derive(Debug, Error, Copy, Clone, PartialEq)]
pub enum GridError {
    /// Exactly one of the two dimensions was zero. The `0x0` empty grid is
    /// legal as a cleared placeholder; `0xN` and `Nx0` are not.
    #[error("degenerate grid dimensions {width}x{height}, only 0x0 may be empty")]
    Dimensions {
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
    },
    /// Cell size must be a positive, finite world length.
    #[error("invalid cell size {cell_size}")]
    CellSize {
        /// Requested cell side length.
        cell_size: f32,
    },
}

/// Fatal error found in a board's level configuration. Surfaced immediately
/// at board initialization, never deferred.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying grid rejected the dimensions or cell size.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// A buildable or locked entry referenced a cell outside the grid.
    #[error("configured cell {coord:?} is outside the {width}x{height} grid")]
    CoordOutOfRange {
        /// The offending entry.
        coord: GridCoord,
        /// Configured grid width.
        width: u32,
        /// Configured grid height.
        height: u32,
    },
    /// The configuration file could not be parsed.
    #[error("malformed board configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
