//! Errors used by the placement engine.

use std::fmt::{self, Debug};

use thiserror::Error;

use crate::board::ConfigError;

/// Error returned when adding or reloading a board.
#[derive(Debug, Error)]
pub enum AddBoardError<B: Debug> {
    /// A board with the given key already exists.
    #[error("board with key {0:?} already exists")]
    Duplicate(B),
    /// No board with the given key exists (reload only).
    #[error("no board with key {0:?}")]
    Unknown(B),
    /// The level configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error returned when trying to add a piece that already existed.
#[derive(Error)]
#[error("piece with id {id:?} already exists")]
pub struct AddPieceError<I: Debug, P> {
    /// Id of the piece that was attempted to be added.
    id: I,
    /// The spec that was not added because another piece with the same id
    /// already existed.
    spec: P,
}

impl<I: Debug, P> AddPieceError<I, P> {
    pub(super) fn new(id: I, spec: P) -> Self {
        Self { id, spec }
    }

    /// The id that was added.
    pub fn id(&self) -> &I {
        &self.id
    }

    /// The spec that was added.
    pub fn spec(&self) -> &P {
        &self.spec
    }

    /// Extract the id and spec from this error.
    pub fn into_inner(self) -> (I, P) {
        (self.id, self.spec)
    }
}

impl<I: Debug, P> From<AddPieceError<I, P>> for (I, P) {
    /// Allows retrieving the inner id and spec from the error with into.
    fn from(err: AddPieceError<I, P>) -> Self {
        err.into_inner()
    }
}

impl<I: Debug, P> Debug for AddPieceError<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Reason why a footprint could not be placed.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotPlaceReason {
    /// No piece with the given id exists.
    #[error("no piece with the given id")]
    UnknownPiece,
    /// No board with the given key exists.
    #[error("no board with the given key")]
    UnknownBoard,
    /// Part of the footprint fell outside the board's grid.
    #[error("part of the footprint is outside the board")]
    OutOfBounds,
    /// A covered cell already holds a placed piece.
    #[error("a covered cell already holds a placed piece")]
    Occupied,
    /// A covered cell is not buildable.
    #[error("a covered cell is not buildable")]
    NotBuildable,
    /// A tool may only cover still-locked cells.
    #[error("a covered cell is not locked")]
    NotLocked,
    /// A covered cell already carries another tool's infrastructure.
    #[error("a covered cell already has infrastructure")]
    InfrastructurePresent,
}

/// Error caused when attempting to place a piece at an invalid position.
#[derive(Error)]
#[error("could not place piece {piece:?}: {reason:?}")]
pub struct PlaceError<I: Debug> {
    /// Reason placement was aborted.
    #[source]
    reason: CannotPlaceReason,
    /// Id of the piece whose placement was attempted.
    piece: I,
}

impl<I: Debug> PlaceError<I> {
    pub(super) fn new(reason: CannotPlaceReason, piece: I) -> Self {
        Self { reason, piece }
    }

    /// Get the reason placement was aborted.
    pub fn reason(&self) -> CannotPlaceReason {
        self.reason
    }

    /// Get the id of the piece whose placement was attempted.
    pub fn piece(&self) -> &I {
        &self.piece
    }

    /// Extract the piece id from this error.
    pub fn into_piece(self) -> I {
        self.piece
    }
}

impl<I: Debug> Debug for PlaceError<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Reason why a piece could not be removed.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotRemoveReason {
    /// No piece with the given id exists.
    #[error("no piece with the given id")]
    UnknownPiece,
    /// The piece is not currently placed.
    #[error("the piece is not currently placed")]
    NotPlaced,
    /// The piece has no owning board and no board is active.
    #[error("no owning board and no active board to fall back to")]
    NoBoard,
}

/// Error caused when attempting to remove a piece from its board.
#[derive(Error)]
#[error("could not remove piece {piece:?}: {reason:?}")]
pub struct RemoveError<I: Debug> {
    /// Reason removal was aborted.
    #[source]
    reason: CannotRemoveReason,
    /// Id of the piece whose removal was attempted.
    piece: I,
}

impl<I: Debug> RemoveError<I> {
    pub(super) fn new(reason: CannotRemoveReason, piece: I) -> Self {
        Self { reason, piece }
    }

    /// Get the reason removal was aborted.
    pub fn reason(&self) -> CannotRemoveReason {
        self.reason
    }

    /// Get the id of the piece whose removal was attempted.
    pub fn piece(&self) -> &I {
        &self.piece
    }

    /// Extract the piece id from this error.
    pub fn into_piece(self) -> I {
        self.piece
    }
}

impl<I: Debug> Debug for RemoveError<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
