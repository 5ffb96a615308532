//! Piece identity, categories, rotation, and the footprint contract.

use std::{fmt::Debug, hash::Hash};

use crate::board::GridCoord;

pub use self::shape::{CellShape, ShapeError};

mod shape;

/// Trait for types that identify a piece within an engine. Ids are treated
/// as disposable and cheaply cloneable. If you need a complex id type that
/// isn't cheap to clone, you may want to wrap it in `Rc` or `Arc`.
///
/// Auto-implemented for any type which implements `Debug`, `Clone`, `Eq`,
/// and `Hash`.
pub trait PieceId: Debug + Clone + Eq + Hash {}
impl<T: Debug + Clone + Eq + Hash> PieceId for T {}

/// The two piece categories.
///
/// The category decides which cell slot a piece occupies and which validity
/// predicate applies during placement: normal pieces take the placed slot
/// of buildable cells, tool pieces take the infrastructure slot of locked
/// cells and unlock them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    /// Ordinary piece.
    Normal,
    /// Tool piece.
    Tool,
}

/// Cardinal rotation applied to a footprint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Rotation {
    /// No rotation.
    R0,
    /// A quarter turn clockwise.
    R90,
    /// A half turn.
    R180,
    /// Three quarter turns clockwise.
    R270,
}

impl Rotation {
    /// The four rotations in clockwise order starting from [`Rotation::R0`].
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// The rotation one quarter turn clockwise from this one.
    pub fn rotated_cw(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// Apply this rotation to an offset about the origin. A quarter turn
    /// clockwise maps `(x, z)` to `(z, -x)`; composing four quarter turns
    /// returns the original offset exactly, so the mapping round-trips and
    /// never changes the number of distinct offsets in a set.
    pub fn apply(self, offset: GridCoord) -> GridCoord {
        match self {
            Rotation::R0 => offset,
            Rotation::R90 => GridCoord::new(offset.z, -offset.x),
            Rotation::R180 => GridCoord::new(-offset.x, -offset.z),
            Rotation::R270 => GridCoord::new(-offset.z, offset.x),
        }
    }
}

#[cfg(feature = "rng_gen")]
mod rng_gen {
    use rand::{
        distributions::{Distribution, Standard},
        Rng,
    };

    use super::Rotation;

    impl Distribution<Rotation> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rotation {
            Rotation::ALL[rng.gen_range(0, 4)]
        }
    }
}

/// Contract for resolving the cells a piece type covers. Produced by the
/// piece-type catalog; the engine only consumes it.
///
/// Implementations must satisfy the rotation law: composing the 90 degree
/// mapping four times is the identity, and the number of covered cells is
/// the same for every rotation.
pub trait Footprint {
    /// The exact set of grid coordinates covered when the piece sits at
    /// `origin` with the given rotation.
    fn occupied_cells(&self, origin: GridCoord, rotation: Rotation) -> Vec<GridCoord>;

    /// Axis-aligned bounding dimensions of the unrotated shape, used to
    /// size placement-search areas.
    fn max_dimensions(&self) -> (u32, u32);
}

/// Descriptor for a piece added to the engine: its shape, its category, and
/// whether it is an obstacle. Obstacles participate in occupancy like any
/// other piece but are excluded from fill counting.
#[derive(Debug, Clone)]
pub struct PieceSpec<S> {
    shape: S,
    kind: PieceKind,
    obstacle: bool,
}

impl<S> PieceSpec<S> {
    /// Describe a piece with the given shape and category.
    pub fn new(shape: S, kind: PieceKind) -> Self {
        Self {
            shape,
            kind,
            obstacle: false,
        }
    }

    /// Mark the piece as an obstacle.
    pub fn obstacle(mut self) -> Self {
        self.obstacle = true;
        self
    }

    /// The piece's shape.
    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// The piece's category.
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Whether the piece is excluded from fill counting.
    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_cw_cycles_through_all() {
        let mut rotation = Rotation::R0;
        for &expected in Rotation::ALL.iter().skip(1) {
            rotation = rotation.rotated_cw();
            assert_eq!(rotation, expected);
        }
        assert_eq!(rotation.rotated_cw(), Rotation::R0);
    }

    #[test]
    fn four_quarter_turns_are_the_identity() {
        let offset = GridCoord::new(3, -2);
        let mut rotated = offset;
        for _ in 0..4 {
            rotated = Rotation::R90.apply(rotated);
        }
        assert_eq!(rotated, offset);
    }

    #[test]
    fn apply_matches_composed_quarter_turns() {
        let offset = GridCoord::new(5, 1);
        let mut composed = offset;
        for &rotation in Rotation::ALL.iter() {
            assert_eq!(rotation.apply(offset), composed);
            composed = Rotation::R90.apply(composed);
        }
    }
}
