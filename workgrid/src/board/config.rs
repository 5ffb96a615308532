//! Level configuration consumed when a board is (re)initialized.

use serde::{Deserialize, Serialize};

use crate::board::{common::GridCoord, errors::ConfigError, GridError};

/// Immutable description of a board layout.
///
/// Cells default to not-buildable and unlocked; the two coordinate lists
/// opt individual cells in. The struct carries no asset-system baggage: it
/// deserializes from JSON and is trivially constructed in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of cell columns.
    pub width: u32,
    /// Number of cell rows.
    pub height: u32,
    /// Side length of a square cell in world units.
    pub cell_size: f32,
    /// Cells that may hold placed pieces.
    #[serde(default)]
    pub buildable: Vec<GridCoord>,
    /// Cells that start locked and need a tool before they open up.
    #[serde(default)]
    pub locked: Vec<GridCoord>,
}

impl BoardConfig {
    /// The configuration of the cleared placeholder board.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cell_size: 1.0,
            buildable: Vec::new(),
            locked: Vec::new(),
        }
    }

    /// Parse and validate a configuration from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for fatal errors: degenerate dimensions
    /// (other than `0x0`), a bad cell size, or coordinate entries outside
    /// the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.width == 0) != (self.height == 0) {
            return Err(GridError::Dimensions {
                width: self.width,
                height: self.height,
            }
            .into());
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GridError::CellSize {
                cell_size: self.cell_size,
            }
            .into());
        }
        for &coord in self.buildable.iter().chain(self.locked.iter()) {
            if !self.contains(coord) {
                return Err(ConfigError::CoordOutOfRange {
                    coord,
                    width: self.width,
                    height: self.height,
                });
            }
        }
        Ok(())
    }

    fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.width
            && (coord.z as u32) < self.height
    }
}
