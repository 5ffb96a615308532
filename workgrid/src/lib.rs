//! Multi-board grid placement engine for tile-based building games.
//!
//! A game world is a set of independent [`Board`][board::Board]s, each
//! owning a [`CellGrid`][board::CellGrid] of layered cells. Pieces cover
//! multiple cells, rotate in quarter turns, and come in two categories:
//! ordinary pieces occupy the placed layer of buildable cells, while tool
//! pieces occupy the infrastructure layer of locked cells and unlock the
//! region they cover. The [`PlacementEngine`][engine::PlacementEngine]
//! validates footprints all-or-nothing, commits them, and answers the
//! aggregate queries a game loop needs: fill ratio, and whether a tool can
//! be lifted together with the pieces resting on it.
//!
//! Everything is synchronous and single-threaded: a placement check
//! followed by a commit cannot be invalidated in between, and grid change
//! notifications are delivered before the mutating call returns.

pub mod board;
pub mod engine;
pub mod pieces;
