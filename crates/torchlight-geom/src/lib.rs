//! Positions, integer cells and the fixed neighbor order used for light placement.
#![forbid(unsafe_code)]

use core::fmt;
use core::ops::{Add, Sub};
use core::str::FromStr;

/// Continuous entity position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing this position (component-wise floor).
    #[inline]
    pub fn cell(self) -> Cell {
        Cell::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Integer block coordinate. Encoded as `"x y z"` when stored in entity tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, o: Offset) -> Cell {
        self + o
    }

    /// Canonical tag key, e.g. `"-1 64 0"`.
    pub fn key(self) -> String {
        self.to_string()
    }

    /// Cell-space center, handy for placing entities inside a cell.
    #[inline]
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCellError {
    #[error("expected 3 space-separated integers, got {0}")]
    Arity(usize),
    #[error("invalid coordinate {0:?}")]
    Coordinate(String),
}

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ParseCellError::Arity(parts.len()));
        }
        let coord = |p: &str| {
            p.parse::<i32>()
                .map_err(|_| ParseCellError::Coordinate(p.to_string()))
        };
        Ok(Cell::new(coord(parts[0])?, coord(parts[1])?, coord(parts[2])?))
    }
}

/// Unit step along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

impl Offset {
    pub const POS_Y: Offset = Offset::new(0, 1, 0);
    pub const NEG_Y: Offset = Offset::new(0, -1, 0);
    pub const POS_X: Offset = Offset::new(1, 0, 0);
    pub const NEG_X: Offset = Offset::new(-1, 0, 0);
    pub const POS_Z: Offset = Offset::new(0, 0, 1);
    pub const NEG_Z: Offset = Offset::new(0, 0, -1);

    #[inline]
    pub const fn new(dx: i32, dy: i32, dz: i32) -> Self {
        Self { dx, dy, dz }
    }
}

/// Neighbor search order: above, then the four horizontals, then below.
pub const NEIGHBOR_OFFSETS: [Offset; 6] = [
    Offset::POS_Y,
    Offset::POS_X,
    Offset::NEG_X,
    Offset::POS_Z,
    Offset::NEG_Z,
    Offset::NEG_Y,
];

impl Add<Offset> for Cell {
    type Output = Cell;
    #[inline]
    fn add(self, o: Offset) -> Cell {
        Cell::new(self.x + o.dx, self.y + o.dy, self.z + o.dz)
    }
}
