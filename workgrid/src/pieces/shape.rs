//! Concrete footprint built from explicit cell offsets.

use std::collections::HashSet;

use thiserror::Error;

use crate::{
    board::GridCoord,
    pieces::{Footprint, Rotation},
};

/// Error building a [`CellShape`]. Missing or inconsistent footprint data
/// is fatal: a piece catalog entry without geometry cannot be placed at
/// all, so the problem surfaces here rather than at placement time.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ShapeError {
    /// A shape must cover at least one cell.
    #[error("footprint data is empty")]
    Empty,
    /// The same offset appeared more than once.
    #[error("duplicate footprint offset {0:?}")]
    Duplicate(GridCoord),
}

/// A piece footprint described as the set of cells it covers, normalized so
/// the minimum corner of its bounding box sits at the origin.
///
/// Rotation pivots about the origin cell without re-normalizing, so rotated
/// footprints may extend into coordinates below the origin. The grid's
/// bounds check rejects those like any other out-of-range cell.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CellShape {
    offsets: Vec<GridCoord>,
}

impl CellShape {
    /// Build a shape from the given offsets, normalizing them so the
    /// minimum `x` and `z` are zero. Rejects empty and duplicate input.
    pub fn new(offsets: impl IntoIterator<Item = GridCoord>) -> Result<Self, ShapeError> {
        let mut offsets: Vec<GridCoord> = offsets.into_iter().collect();
        if offsets.is_empty() {
            return Err(ShapeError::Empty);
        }
        // Nonempty was just checked, so the minimums exist.
        let min_x = offsets.iter().map(|offset| offset.x).min().unwrap();
        let min_z = offsets.iter().map(|offset| offset.z).min().unwrap();
        for offset in offsets.iter_mut() {
            offset.x -= min_x;
            offset.z -= min_z;
        }
        let mut seen = HashSet::with_capacity(offsets.len());
        for &offset in &offsets {
            if !seen.insert(offset) {
                return Err(ShapeError::Duplicate(offset));
            }
        }
        Ok(Self { offsets })
    }

    /// A single-cell shape.
    pub fn single() -> Self {
        Self::rect(1, 1)
    }

    /// A solid `width` by `height` rectangle. Panics if either dimension
    /// is 0.
    pub fn rect(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0);
        let mut offsets = Vec::with_capacity(width as usize * height as usize);
        for z in 0..height {
            for x in 0..width {
                offsets.push(GridCoord::new(x as i32, z as i32));
            }
        }
        Self { offsets }
    }

    /// Number of cells the shape covers. Rotation-invariant.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the shape covers no cells. Always `false` for a constructed
    /// shape; provided for completeness.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The normalized offsets making up the shape.
    pub fn offsets(&self) -> &[GridCoord] {
        &self.offsets
    }
}

impl Footprint for CellShape {
    fn occupied_cells(&self, origin: GridCoord, rotation: Rotation) -> Vec<GridCoord> {
        self.offsets
            .iter()
            .map(|&offset| origin.offset(rotation.apply(offset)))
            .collect()
    }

    fn max_dimensions(&self) -> (u32, u32) {
        // Offsets are normalized to start at the origin, so the maximum
        // corner is the extent.
        let width = self.offsets.iter().map(|offset| offset.x).max().unwrap_or(-1);
        let height = self.offsets.iter().map(|offset| offset.z).max().unwrap_or(-1);
        ((width + 1) as u32, (height + 1) as u32)
    }
}
