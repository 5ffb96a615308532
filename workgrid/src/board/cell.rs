//! Defines the per-cell state of a board's grid.

use enumflags2::BitFlags;

/// Boolean state carried by each cell.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum CellFlag {
    /// The cell may hold a placed piece once it is free.
    Buildable = 0b01,
    /// The cell is locked and needs a tool on it before it opens up.
    Locked = 0b10,
}

/// A single cell in a board's grid.
///
/// Occupancy is layered: the placed slot holds an ordinary piece while the
/// infrastructure slot holds the tool that unlocked the cell. The two slots
/// are independent and may both be populated at once (a tool plus a rider
/// resting on it).
#[derive(Debug)]
pub struct Cell<I> {
    flags: BitFlags<CellFlag>,
    placed: Option<I>,
    infrastructure: Option<I>,
}

impl<I> Default for Cell<I> {
    /// A cell that is neither buildable nor locked, with both slots empty.
    fn default() -> Self {
        Self {
            flags: BitFlags::empty(),
            placed: None,
            infrastructure: None,
        }
    }
}

impl<I> Cell<I> {
    /// Whether the cell may ever hold a placed piece.
    pub fn is_buildable(&self) -> bool {
        self.flags.contains(CellFlag::Buildable)
    }

    /// Whether the cell is still locked.
    pub fn is_locked(&self) -> bool {
        self.flags.contains(CellFlag::Locked)
    }

    /// Whether a piece may be placed here right now: the placed slot is
    /// empty and the cell is buildable.
    pub fn can_build(&self) -> bool {
        self.placed.is_none() && self.is_buildable()
    }

    /// Whether the placed slot holds a piece.
    pub fn is_occupied(&self) -> bool {
        self.placed.is_some()
    }

    /// Whether the infrastructure slot holds a tool.
    pub fn has_infrastructure(&self) -> bool {
        self.infrastructure.is_some()
    }

    /// The piece occupying the placed slot, if any.
    pub fn placed(&self) -> Option<&I> {
        self.placed.as_ref()
    }

    /// The tool occupying the infrastructure slot, if any.
    pub fn infrastructure(&self) -> Option<&I> {
        self.infrastructure.as_ref()
    }

    pub(crate) fn set_buildable(&mut self, buildable: bool) {
        self.set_flag(CellFlag::Buildable, buildable);
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.set_flag(CellFlag::Locked, locked);
    }

    fn set_flag(&mut self, flag: CellFlag, value: bool) {
        if value {
            self.flags |= BitFlags::from(flag);
        } else {
            self.flags &= !BitFlags::from(flag);
        }
    }

    pub(crate) fn set_placed(&mut self, piece: I) {
        self.placed = Some(piece);
    }

    pub(crate) fn clear_placed(&mut self) -> Option<I> {
        self.placed.take()
    }

    pub(crate) fn set_infrastructure(&mut self, piece: I) {
        self.infrastructure = Some(piece);
    }

    pub(crate) fn clear_infrastructure(&mut self) -> Option<I> {
        self.infrastructure.take()
    }
}
