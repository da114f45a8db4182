#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid cell, calibration and direction types.
//!
//! A schematic grid is a set of equal square cells identified by integer
//! ids. Every schematic geometry produced by the workspace passes through
//! cell centroids, and every levee or street element resolves to one of the
//! eight [`Direction`]s out of a cell.

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Identifier of a grid cell as assigned by the grid builder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A square grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Cell id.
    pub id: CellId,
    /// Cell centroid.
    pub centroid: Point<f64>,
}

/// Grid metadata handed in by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMetadata {
    /// Side length of every cell.
    pub cell_size: f64,
    /// Any known cell centroid.
    pub reference_point: Point<f64>,
}

/// Additive correction that makes float-to-grid rounding exact.
///
/// `round((coord + offset) / cell_size)` maps every true cell centroid to
/// an integer grid coordinate with zero rounding error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    /// Side length of every cell.
    pub cell_size: f64,
    /// Offset added to x before scaling.
    pub offset_x: f64,
    /// Offset added to y before scaling.
    pub offset_y: f64,
}

impl Calibration {
    /// Length of a cell diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.cell_size * std::f64::consts::SQRT_2
    }
}

/// Integer grid coordinate produced by snapping a float coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    /// Column.
    pub tx: i64,
    /// Row (grows northwards).
    pub ty: i64,
}

impl GridCoord {
    #[must_use]
    pub const fn new(tx: i64, ty: i64) -> Self {
        Self { tx, ty }
    }
}

/// One of the eight directions out of a cell, carrying the numeric code
/// used by the model input files (1-4 cardinal, 5-8 diagonal).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    North = 1,
    East = 2,
    South = 3,
    West = 4,
    NorthEast = 5,
    SouthEast = 6,
    SouthWest = 7,
    NorthWest = 8,
}

impl Direction {
    /// Returns the numeric direction code (1-8).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Creates a direction from its numeric code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not in the range 1-8.
    pub const fn from_code(code: u8) -> Result<Self, InvalidDirectionError> {
        match code {
            1 => Ok(Self::North),
            2 => Ok(Self::East),
            3 => Ok(Self::South),
            4 => Ok(Self::West),
            5 => Ok(Self::NorthEast),
            6 => Ok(Self::SouthEast),
            7 => Ok(Self::SouthWest),
            8 => Ok(Self::NorthWest),
            _ => Err(InvalidDirectionError { code }),
        }
    }

    /// Unit step `(dx, dy)` towards the neighbouring cell in this direction.
    #[must_use]
    pub const fn unit_offset(self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
            Self::NorthEast => (1, 1),
            Self::SouthEast => (1, -1),
            Self::SouthWest => (-1, -1),
            Self::NorthWest => (-1, 1),
        }
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::NorthEast => Self::SouthWest,
            Self::SouthEast => Self::NorthWest,
            Self::SouthWest => Self::NorthEast,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// The octagon side facing this direction.
    #[must_use]
    pub const fn side(self) -> OctagonSide {
        OctagonSide(match self {
            Self::North => 0,
            Self::NorthEast => 1,
            Self::East => 2,
            Self::SouthEast => 3,
            Self::South => 4,
            Self::SouthWest => 5,
            Self::West => 6,
            Self::NorthWest => 7,
        })
    }

    /// All directions in code order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::North,
            Self::East,
            Self::South,
            Self::West,
            Self::NorthEast,
            Self::SouthEast,
            Self::SouthWest,
            Self::NorthWest,
        ]
    }
}

/// Error returned when a direction code is outside 1-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDirectionError {
    /// The invalid code that was provided.
    pub code: u8,
}

impl fmt::Display for InvalidDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid direction code {}: expected 1-8", self.code)
    }
}

impl std::error::Error for InvalidDirectionError {}

/// One of the eight sides of the octagon inscribed in a cell.
///
/// Sides are numbered 0-7 clockwise from north, 45 degrees apart. Side `k`
/// is centred on azimuth `45 * k`; octant `k` spans the azimuths between
/// side `k` and side `k + 1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OctagonSide(u8);

impl OctagonSide {
    /// Number of sides.
    pub const COUNT: u8 = 8;

    /// Creates a side from any integer, wrapping modulo 8.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn wrapping(index: i64) -> Self {
        Self(index.rem_euclid(Self::COUNT as i64) as u8)
    }

    /// Side index in `0..8`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Next side clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        Self((self.0 + 1) % Self::COUNT)
    }

    /// Next side counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        Self((self.0 + Self::COUNT - 1) % Self::COUNT)
    }

    /// The direction this side faces.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self.0 {
            0 => Direction::North,
            1 => Direction::NorthEast,
            2 => Direction::East,
            3 => Direction::SouthEast,
            4 => Direction::South,
            5 => Direction::SouthWest,
            6 => Direction::West,
            _ => Direction::NorthWest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_codes_round_trip_through_sides() {
        for &direction in Direction::all() {
            assert_eq!(direction.side().direction(), direction);
            assert_eq!(Direction::from_code(direction.code()), Ok(direction));
        }
    }

    #[test]
    fn rejects_out_of_range_direction_code() {
        assert_eq!(
            Direction::from_code(9),
            Err(InvalidDirectionError { code: 9 })
        );
        assert!(Direction::from_code(0).is_err());
    }

    #[test]
    fn side_octagon_order_matches_model_codes() {
        let codes: Vec<u8> = (0..8)
            .map(|i| OctagonSide::wrapping(i).direction().code())
            .collect();
        assert_eq!(codes, vec![1, 5, 2, 6, 3, 7, 4, 8]);
    }

    #[test]
    fn sides_wrap_both_ways() {
        assert_eq!(OctagonSide::wrapping(-1).index(), 7);
        assert_eq!(OctagonSide::wrapping(9).index(), 1);
        assert_eq!(OctagonSide::wrapping(7).clockwise().index(), 0);
        assert_eq!(OctagonSide::wrapping(0).counter_clockwise().index(), 7);
    }

    #[test]
    fn opposite_directions_cancel_offsets() {
        for &direction in Direction::all() {
            let (dx, dy) = direction.unit_offset();
            let (ox, oy) = direction.opposite().unit_offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn parses_direction_names() {
        assert_eq!("NORTH_EAST".parse::<Direction>(), Ok(Direction::NorthEast));
        assert_eq!(Direction::SouthWest.to_string(), "SOUTH_WEST");
    }
}
