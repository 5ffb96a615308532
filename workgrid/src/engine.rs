//! The placement engine: validates and commits footprint-level occupancy
//! changes across a set of independent boards.
//!
//! All mutation of cell state flows through the engine's commit paths,
//! which is the discipline that keeps the layered-occupancy invariant
//! intact. Queries like [`can_place`][PlacementEngine::can_place] are
//! speculative and leave the grids untouched, so a drag-in-progress can
//! re-validate every frame without committing anything.

use std::{
    borrow::Borrow,
    collections::{hash_map::Entry, HashMap},
    fmt::Debug,
    hash::Hash,
};

use log::warn;

use crate::{
    board::{Board, BoardConfig, GridCoord, WorldPoint},
    pieces::{Footprint, PieceId, PieceKind, PieceSpec, Rotation},
};

pub use self::errors::{
    AddBoardError, AddPieceError, CannotPlaceReason, CannotRemoveReason, PlaceError, RemoveError,
};

mod errors;

/// Trait for types that identify a board within an engine. Keys are treated
/// as disposable and cheaply cloneable.
///
/// Auto-implemented for any type which implements `Debug`, `Clone`, `Eq`,
/// and `Hash`.
pub trait BoardKey: Debug + Clone + Eq + Hash {}
impl<T: Debug + Clone + Eq + Hash> BoardKey for T {}

/// A committed placement: where a piece sits and the exact cells it covers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Placement {
    origin: GridCoord,
    rotation: Rotation,
    cells: Vec<GridCoord>,
}

impl Placement {
    /// The origin cell the footprint was resolved from.
    pub fn origin(&self) -> GridCoord {
        self.origin
    }

    /// The rotation the footprint was resolved with.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The cells the placement covers.
    pub fn cells(&self) -> &[GridCoord] {
        &self.cells
    }

    /// Whether the placement covers the given cell.
    pub fn contains(&self, coord: GridCoord) -> bool {
        self.cells.contains(&coord)
    }
}

/// A piece's full record: its spec plus its current binding.
#[derive(Debug)]
struct PieceState<B, S> {
    spec: PieceSpec<S>,
    board: Option<B>,
    placement: Option<Placement>,
}

/// Read-only handle to a piece registered with the engine.
#[derive(Debug)]
pub struct PieceRef<'a, B, S> {
    state: &'a PieceState<B, S>,
}

impl<'a, B, S> PieceRef<'a, B, S> {
    /// The piece's category.
    pub fn kind(&self) -> PieceKind {
        self.state.spec.kind()
    }

    /// Whether the piece is excluded from fill counting.
    pub fn is_obstacle(&self) -> bool {
        self.state.spec.is_obstacle()
    }

    /// The piece's shape.
    pub fn shape(&self) -> &'a S {
        self.state.spec.shape()
    }

    /// The key of the board the piece is bound to, if any.
    pub fn board(&self) -> Option<&'a B> {
        self.state.board.as_ref()
    }

    /// The piece's current placement, if it is placed.
    pub fn placement(&self) -> Option<&'a Placement> {
        self.state.placement.as_ref()
    }

    /// Whether the piece is currently placed.
    pub fn placed(&self) -> bool {
        self.state.placement.is_some()
    }
}

// Derive for Copy/Clone include bounds on the generic parameters, however,
// we can implement copy and clone regardless of whether our generics do.
impl<B, S> Clone for PieceRef<'_, B, S> {
    fn clone(&self) -> Self {
        Self { state: self.state }
    }
}
impl<B, S> Copy for PieceRef<'_, B, S> {}

/// Orchestrates placement across a set of boards.
///
/// The engine owns the boards, the piece registry, and the designated
/// active board. All state is explicit: multi-board setups and tests pass
/// an engine around instead of reaching for a global.
pub struct PlacementEngine<B: BoardKey, I: PieceId, S: Footprint> {
    boards: HashMap<B, Board<I>>,
    pieces: HashMap<I, PieceState<B, S>>,
    active: Option<B>,
}

impl<B: BoardKey, I: PieceId, S: Footprint> PlacementEngine<B, I, S> {
    /// Construct an engine with no boards and no pieces.
    pub fn new() -> Self {
        Self {
            boards: HashMap::new(),
            pieces: HashMap::new(),
            active: None,
        }
    }

    /// Add a board built from level configuration. `anchor` is the world
    /// origin resolved for the board by the scene collaborator. The first
    /// board added becomes the active board.
    pub fn add_board(
        &mut self,
        key: B,
        config: &BoardConfig,
        anchor: WorldPoint,
    ) -> Result<(), AddBoardError<B>> {
        if self.boards.contains_key(&key) {
            return Err(AddBoardError::Duplicate(key));
        }
        let board = Board::from_config(config, anchor)?;
        let _ = self.boards.insert(key.clone(), board);
        if self.active.is_none() {
            self.active = Some(key);
        }
        Ok(())
    }

    /// Replace a board's contents from a new configuration. Every piece
    /// bound to the board is destroyed first; this is a full replacement,
    /// never an incremental diff.
    pub fn reload_board(
        &mut self,
        key: &B,
        config: &BoardConfig,
        anchor: WorldPoint,
    ) -> Result<(), AddBoardError<B>> {
        if !self.boards.contains_key(key) {
            return Err(AddBoardError::Unknown(key.clone()));
        }
        // Build the replacement before tearing anything down so a bad
        // configuration leaves the old board intact.
        let board = Board::from_config(config, anchor)?;
        let _ = self.clear_board(key);
        let _ = self.boards.insert(key.clone(), board);
        Ok(())
    }

    /// Destroy every piece bound to the board and discard its grid, leaving
    /// the cleared placeholder. The key stays valid for a later reload.
    /// Returns `false` for unknown keys.
    pub fn clear_board(&mut self, key: &B) -> bool {
        let bound: Vec<I> = match self.boards.get(key) {
            Some(board) => board.pieces().cloned().collect(),
            None => return false,
        };
        for piece in bound {
            let _ = self.pieces.remove(&piece);
        }
        // The key was just looked up successfully.
        self.boards.get_mut(key).unwrap().clear();
        true
    }

    /// Get the board with the given key, if it exists.
    pub fn get_board<Q: ?Sized>(&self, key: &Q) -> Option<&Board<I>>
    where
        B: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.boards.get(key)
    }

    /// Mutably get the board with the given key, if it exists. Boards
    /// expose no public cell mutation, so this grants listener registration
    /// and nothing more.
    pub fn get_board_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut Board<I>>
    where
        B: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.boards.get_mut(key)
    }

    /// Iterate the keys of the boards in the engine.
    pub fn boards(&self) -> impl Iterator<Item = &B> {
        self.boards.keys()
    }

    /// The designated active board, used as the fallback owner during
    /// removal.
    pub fn active(&self) -> Option<&B> {
        self.active.as_ref()
    }

    /// Designate the active board. Returns `false` for unknown keys.
    pub fn set_active(&mut self, key: B) -> bool {
        if self.boards.contains_key(&key) {
            self.active = Some(key);
            true
        } else {
            false
        }
    }

    /// Add a piece to the registry. The piece starts unbound; it occupies
    /// no cells until placed.
    pub fn add_piece(
        &mut self,
        id: I,
        spec: PieceSpec<S>,
    ) -> Result<(), AddPieceError<I, PieceSpec<S>>> {
        match self.pieces.entry(id.clone()) {
            Entry::Occupied(_) => Err(AddPieceError::new(id, spec)),
            Entry::Vacant(entry) => {
                let _ = entry.insert(PieceState {
                    spec,
                    board: None,
                    placement: None,
                });
                Ok(())
            }
        }
    }

    /// Get a read-only handle to the piece with the given id.
    pub fn get_piece<Q: ?Sized>(&self, id: &Q) -> Option<PieceRef<B, S>>
    where
        I: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.pieces.get(id).map(|state| PieceRef { state })
    }

    /// Iterate all registered pieces.
    pub fn iter_pieces(&self) -> impl Iterator<Item = (&I, PieceRef<B, S>)> {
        self.pieces.iter().map(|(id, state)| (id, PieceRef { state }))
    }

    /// Destroy a piece, clearing its cells first if it is placed. Piece
    /// lifetime is independent of grid state, so this works whether or not
    /// the piece is on a board. Returns `false` for unknown ids.
    pub fn remove_piece(&mut self, id: &I) -> bool {
        let _ = self.unbind(id);
        self.pieces.remove(id).is_some()
    }

    /// Check whether the piece may be placed with the given footprint on
    /// the given board. Speculative: the grid is left untouched, so this
    /// can drive per-frame placement feedback. Unknown ids are simply not
    /// placeable.
    pub fn can_place(&self, piece: &I, origin: GridCoord, rotation: Rotation, board: &B) -> bool {
        self.check_place(piece, origin, rotation, board).is_ok()
    }

    /// Validate and commit a placement. Validation runs over the entire
    /// footprint before any cell is touched, so a rejected placement
    /// mutates nothing.
    ///
    /// Tool pieces take the infrastructure slot of every covered cell and
    /// unlock it; normal pieces take the placed slot. A piece that was
    /// already placed is cleanly unbound from its previous cells first, so
    /// this call also moves pieces, including across boards: ownership
    /// transfers to the target board as part of the commit.
    pub fn place(
        &mut self,
        piece: &I,
        origin: GridCoord,
        rotation: Rotation,
        board: &B,
    ) -> Result<(), PlaceError<I>> {
        let cells = match self.check_place(piece, origin, rotation, board) {
            Ok(cells) => cells,
            Err(reason) => return Err(PlaceError::new(reason, piece.clone())),
        };

        // Clear the previous footprint before committing the new one so a
        // move within overlapping cells leaves no stale occupancy behind.
        let _ = self.unbind(piece);

        // check_place verified that the piece and board exist.
        let state = self.pieces.get_mut(piece).unwrap();
        let kind = state.spec.kind();
        state.board = Some(board.clone());
        state.placement = Some(Placement {
            origin,
            rotation,
            cells: cells.clone(),
        });

        let board = self.boards.get_mut(board).unwrap();
        board.register(piece.clone());
        for &coord in &cells {
            let piece = piece.clone();
            let _ = board.grid_mut().update(coord, |cell| match kind {
                PieceKind::Tool => {
                    cell.set_infrastructure(piece);
                    cell.set_locked(false);
                }
                PieceKind::Normal => cell.set_placed(piece),
            });
        }
        Ok(())
    }

    /// Remove the piece from its owning board, falling back to the active
    /// board when no owner was recorded. Returns the placement that was
    /// cleared.
    ///
    /// Cells whose current occupant is some other piece are skipped with a
    /// diagnostic instead of being cleared: stale bookkeeping must never
    /// silently clear another piece's occupancy.
    pub fn remove(&mut self, piece: &I) -> Result<Placement, RemoveError<I>> {
        match self.pieces.get(piece) {
            None => {
                return Err(RemoveError::new(
                    CannotRemoveReason::UnknownPiece,
                    piece.clone(),
                ))
            }
            Some(state) if state.placement.is_none() => {
                return Err(RemoveError::new(
                    CannotRemoveReason::NotPlaced,
                    piece.clone(),
                ))
            }
            Some(state) => {
                let owner = state.board.clone().or_else(|| self.active.clone());
                let resolvable = match owner {
                    Some(key) => self.boards.contains_key(&key),
                    None => false,
                };
                if !resolvable {
                    return Err(RemoveError::new(CannotRemoveReason::NoBoard, piece.clone()));
                }
            }
        }
        // unbind only comes back empty for unknown or unplaced pieces, both
        // rejected above.
        Ok(self.unbind(piece).unwrap())
    }

    /// Support check run before lifting a tool. Collects the distinct
    /// pieces resting on the tool's footprint; each must sit entirely
    /// within it. Returns the passengers that must be relocated together
    /// with the tool, or `None` when any occupant extends outside the
    /// footprint and the pickup has to be rejected (lifting the tool would
    /// drop a partially supported piece). An unplaced tool lifts trivially
    /// with no passengers.
    pub fn tool_lift_passengers(&self, tool: &I) -> Option<Vec<I>> {
        let state = self.pieces.get(tool)?;
        let placement = match &state.placement {
            Some(placement) => placement,
            None => return Some(Vec::new()),
        };
        let board = state.board.as_ref().and_then(|key| self.boards.get(key))?;

        let mut passengers: Vec<I> = Vec::new();
        for &coord in placement.cells() {
            let occupant = match board.cell(coord).and_then(|cell| cell.placed()) {
                Some(occupant) => occupant,
                None => continue,
            };
            if passengers.iter().any(|passenger| passenger == occupant) {
                continue;
            }
            let supported = match self.pieces.get(occupant).and_then(|s| s.placement.as_ref()) {
                Some(occupied) => occupied
                    .cells()
                    .iter()
                    .all(|&cell| placement.contains(cell)),
                None => {
                    // The grid says the piece is here but the registry has
                    // no placement for it. Reject rather than drop it.
                    warn!(
                        "occupant {:?} at {:?} has no recorded placement, rejecting lift of {:?}",
                        occupant, coord, tool
                    );
                    false
                }
            };
            if !supported {
                return None;
            }
            passengers.push(occupant.clone());
        }
        Some(passengers)
    }

    /// Fill ratio of a board's target cells, in percent.
    ///
    /// A cell is a target when it is buildable, locked, or bearing
    /// infrastructure (it is or was meant to receive something regardless
    /// of its current lock state). It counts as filled when its placed
    /// occupant is a non-obstacle normal piece. A board with no target
    /// cells reports 0 rather than NaN.
    pub fn fill_percentage<Q: ?Sized>(&self, board: &Q) -> f32
    where
        B: Borrow<Q>,
        Q: Hash + Eq,
    {
        let board = match self.boards.get(board) {
            Some(board) => board,
            None => return 0.0,
        };
        let mut targets = 0u32;
        let mut filled = 0u32;
        for (_, cell) in board.grid().iter() {
            if !(cell.is_buildable() || cell.is_locked() || cell.has_infrastructure()) {
                continue;
            }
            targets += 1;
            let counted = cell.placed().map_or(false, |occupant| {
                self.pieces.get(occupant).map_or(false, |state| {
                    state.spec.kind() == PieceKind::Normal && !state.spec.is_obstacle()
                })
            });
            if counted {
                filled += 1;
            }
        }
        if targets == 0 {
            0.0
        } else {
            filled as f32 * 100.0 / targets as f32
        }
    }

    /// Shared validation behind [`can_place`][PlacementEngine::can_place]
    /// and [`place`][PlacementEngine::place]. Returns the covered cells on
    /// success. A cell that already holds this same piece in the relevant
    /// slot passes: re-validating a piece over its own current position
    /// (dragging in place) is always consistent.
    fn check_place(
        &self,
        piece: &I,
        origin: GridCoord,
        rotation: Rotation,
        board: &B,
    ) -> Result<Vec<GridCoord>, CannotPlaceReason> {
        let state = self.pieces.get(piece).ok_or(CannotPlaceReason::UnknownPiece)?;
        let board = self.boards.get(board).ok_or(CannotPlaceReason::UnknownBoard)?;
        let cells = state.spec.shape().occupied_cells(origin, rotation);
        for &coord in &cells {
            let cell = board.cell(coord).ok_or(CannotPlaceReason::OutOfBounds)?;
            match state.spec.kind() {
                PieceKind::Tool => {
                    if cell.infrastructure() == Some(piece) {
                        continue;
                    }
                    if cell.has_infrastructure() {
                        return Err(CannotPlaceReason::InfrastructurePresent);
                    }
                    if !cell.is_locked() {
                        return Err(CannotPlaceReason::NotLocked);
                    }
                    if cell.is_occupied() {
                        return Err(CannotPlaceReason::Occupied);
                    }
                }
                PieceKind::Normal => {
                    if cell.placed() == Some(piece) {
                        continue;
                    }
                    if !cell.can_build() {
                        return Err(if cell.is_occupied() {
                            CannotPlaceReason::Occupied
                        } else {
                            CannotPlaceReason::NotBuildable
                        });
                    }
                }
            }
        }
        Ok(cells)
    }

    /// Clear the piece's current footprint, if any, from its resolvable
    /// owning board and drop the binding. Mismatched cells are skipped with
    /// a diagnostic. Returns the placement that was taken down.
    fn unbind(&mut self, piece: &I) -> Option<Placement> {
        let (owner, placement, kind) = {
            let state = self.pieces.get_mut(piece)?;
            let placement = state.placement.take()?;
            (state.board.take(), placement, state.spec.kind())
        };
        let owner = match owner.or_else(|| self.active.clone()) {
            Some(owner) => owner,
            None => {
                warn!(
                    "piece {:?} has no resolvable board, its cells are left as-is",
                    piece
                );
                return Some(placement);
            }
        };
        let board = match self.boards.get_mut(&owner) {
            Some(board) => board,
            None => {
                warn!(
                    "piece {:?} recorded unknown board {:?}, its cells are left as-is",
                    piece, owner
                );
                return Some(placement);
            }
        };
        board.unregister(piece);
        for &coord in placement.cells() {
            let matches = match (kind, board.cell(coord)) {
                (PieceKind::Tool, Some(cell)) => cell.infrastructure() == Some(piece),
                (PieceKind::Normal, Some(cell)) => cell.placed() == Some(piece),
                (_, None) => false,
            };
            if !matches {
                warn!(
                    "cell {:?} does not hold piece {:?}, skipping its cleanup",
                    coord, piece
                );
                continue;
            }
            let _ = board.grid_mut().update(coord, |cell| match kind {
                PieceKind::Tool => {
                    let _ = cell.clear_infrastructure();
                    cell.set_locked(true);
                }
                PieceKind::Normal => {
                    let _ = cell.clear_placed();
                }
            });
        }
        Some(placement)
    }
}

impl<B: BoardKey, I: PieceId, S: Footprint> Default for PlacementEngine<B, I, S> {
    fn default() -> Self {
        Self::new()
    }
}
