//! Piece, color and colored-piece types.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::error::PieceParseError;

/// Chess piece kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// All piece kinds in index order
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Parse a piece from a position-string letter (either case)
    #[must_use]
    pub fn from_char(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }

    /// Convert piece to lowercase character
    #[inline]
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Convert piece to character with case based on color (uppercase for White)
    #[inline]
    #[must_use]
    pub fn to_fen_char(self, color: Color) -> char {
        let c = self.to_char();
        if color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    /// Lowercase name as used in piece display names (`"rook"`)
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Piece::Pawn => "pawn",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
            Piece::King => "king",
        }
    }

    /// True for the kinds a pawn may promote to
    #[inline]
    #[must_use]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            Piece::Queen | Piece::Rook | Piece::Bishop | Piece::Knight
        )
    }
}

/// Promotion piece choices in order of typical preference (queen first)
pub const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Chess colors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Both colors, White first
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Returns the opposite color
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Back rank for this color (0 for White, 7 for Black)
    #[inline]
    #[must_use]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Active-color field letter
    #[inline]
    #[must_use]
    pub const fn to_fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A piece kind together with its owner.
///
/// Decided once when a piece is created; nothing downstream re-derives it
/// from text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PieceRef {
    pub piece: Piece,
    pub color: Color,
}

impl PieceRef {
    #[inline]
    #[must_use]
    pub const fn new(piece: Piece, color: Color) -> Self {
        PieceRef { piece, color }
    }

    #[inline]
    #[must_use]
    pub const fn white(piece: Piece) -> Self {
        PieceRef::new(piece, Color::White)
    }

    #[inline]
    #[must_use]
    pub const fn black(piece: Piece) -> Self {
        PieceRef::new(piece, Color::Black)
    }

    /// Position-string letter, uppercase for White
    #[inline]
    #[must_use]
    pub fn to_fen_char(self) -> char {
        self.piece.to_fen_char(self.color)
    }

    /// Inverse of [`PieceRef::to_fen_char`]
    #[must_use]
    pub fn from_fen_char(c: char) -> Option<Self> {
        let piece = Piece::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(PieceRef { piece, color })
    }
}

impl fmt::Display for PieceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.color.name(), self.piece.name())
    }
}

/// Parses display names such as `"white_rook"` or `"Black_Knight"`.
impl FromStr for PieceRef {
    type Err = PieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (color, piece) = lower
            .split_once('_')
            .ok_or_else(|| PieceParseError::MissingSeparator {
                name: s.to_string(),
            })?;

        let color = match color {
            "white" => Color::White,
            "black" => Color::Black,
            other => {
                return Err(PieceParseError::UnknownColor {
                    found: other.to_string(),
                })
            }
        };

        let piece = Piece::ALL
            .into_iter()
            .find(|p| p.name() == piece)
            .ok_or_else(|| PieceParseError::UnknownPiece {
                found: piece.to_string(),
            })?;

        Ok(PieceRef { piece, color })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_chars() {
        assert_eq!(PieceRef::white(Piece::Knight).to_fen_char(), 'N');
        assert_eq!(PieceRef::black(Piece::Pawn).to_fen_char(), 'p');
        assert_eq!(
            PieceRef::from_fen_char('Q'),
            Some(PieceRef::white(Piece::Queen))
        );
        assert_eq!(PieceRef::from_fen_char('x'), None);
    }

    #[test]
    fn test_parse_display_name() {
        let rook: PieceRef = "white_rook".parse().unwrap();
        assert_eq!(rook, PieceRef::white(Piece::Rook));

        let king: PieceRef = "Black_King".parse().unwrap();
        assert_eq!(king, PieceRef::black(Piece::King));

        assert_eq!(rook.to_string(), "white_rook");
    }

    #[test]
    fn test_parse_display_name_errors() {
        assert!(matches!(
            "whiterook".parse::<PieceRef>(),
            Err(PieceParseError::MissingSeparator { .. })
        ));
        assert!(matches!(
            "green_rook".parse::<PieceRef>(),
            Err(PieceParseError::UnknownColor { .. })
        ));
        assert!(matches!(
            "white_dragon".parse::<PieceRef>(),
            Err(PieceParseError::UnknownPiece { .. })
        ));
    }

    #[test]
    fn test_promotion_targets() {
        for piece in PROMOTION_PIECES {
            assert!(piece.is_promotion_target());
        }
        assert!(!Piece::King.is_promotion_target());
        assert!(!Piece::Pawn.is_promotion_target());
    }
}
