//! Square type and coordinate helpers.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::error::SquareError;

/// Map a file letter (`a`-`h`) to its index, `None` outside the board.
#[inline]
pub(crate) fn file_from_char(file: char) -> Option<u8> {
    match file {
        'a'..='h' => Some(file as u8 - b'a'),
        _ => None,
    }
}

/// Map a rank digit (`1`-`8`) to its index, `None` outside the board.
#[inline]
pub(crate) fn rank_from_char(rank: char) -> Option<u8> {
    match rank {
        '1'..='8' => Some(rank as u8 - b'1'),
        _ => None,
    }
}

#[inline]
pub(crate) const fn file_to_char(file: u8) -> char {
    (b'a' + file) as char
}

#[inline]
pub(crate) const fn rank_to_char(rank: u8) -> char {
    (b'1' + rank) as char
}

/// A square on the board as `(file, rank)`, both in `0..8`.
///
/// File 0 is the `a` file, rank 0 is White's back rank. This matches the
/// `(x, y)` grid the game layer draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Create a new square with bounds checking
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square { rank, file })
        } else {
            None
        }
    }

    /// Build a square from coordinates the caller already knows are in range.
    ///
    /// Out-of-range input is masked into the board rather than rejected.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(file: u8, rank: u8) -> Self {
        Square {
            rank: rank & 7,
            file: file & 7,
        }
    }

    /// Get the file (0-7, where 0 = file a)
    #[inline]
    #[must_use]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Get the rank (0-7, where 0 = rank 1)
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// `(x, y)` pair in the game's grid convention
    #[inline]
    #[must_use]
    pub const fn coords(self) -> (u8, u8) {
        (self.file, self.rank)
    }

    /// Iterate all 64 squares, a1 first, rank by rank
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { rank, file }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", file_to_char(self.file), rank_to_char(self.rank))
    }
}

impl TryFrom<(i32, i32)> for Square {
    type Error = SquareError;

    fn try_from((file, rank): (i32, i32)) -> Result<Self, Self::Error> {
        if !(0..8).contains(&file) {
            return Err(SquareError::FileOutOfBounds { file });
        }
        if !(0..8).contains(&rank) {
            return Err(SquareError::RankOutOfBounds { rank });
        }
        Ok(Square::new_unchecked(file as u8, rank as u8))
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SquareError::InvalidNotation {
            notation: s.to_string(),
        };

        let mut chars = s.chars();
        let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let file = file_from_char(f).ok_or_else(invalid)?;
        let rank = rank_from_char(r).ok_or_else(invalid)?;
        Ok(Square::new_unchecked(file, rank))
    }
}
