//! Engine move text: `<file><rank><file><rank>[promotion]`.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::MoveParseError;
use super::types::{file_from_char, rank_from_char};
use super::{Piece, Square};

/// A decoded move: origin, destination and optional promotion kind.
///
/// `promotion` is `None` for the four-character form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl UciMove {
    #[must_use]
    pub const fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        UciMove {
            from,
            to,
            promotion,
        }
    }
}

/// Decode move text into board coordinates.
///
/// Accepts exactly 4 or 5 characters. The first four must be file/rank pairs
/// in `a`-`h` / `1`-`8`; the optional fifth is a promotion letter
/// (`q`, `r`, `b`, `n`, either case).
///
/// # Example
/// ```
/// use chess_bridge::board::{try_decode_move, Piece};
///
/// let mv = try_decode_move("e7e8q").unwrap();
/// assert_eq!(mv.from.coords(), (4, 6));
/// assert_eq!(mv.to.coords(), (4, 7));
/// assert_eq!(mv.promotion, Some(Piece::Queen));
/// ```
pub fn try_decode_move(text: &str) -> Result<UciMove, MoveParseError> {
    if text.is_empty() {
        return Err(MoveParseError::Empty);
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 4 || chars.len() > 5 {
        return Err(MoveParseError::InvalidLength { len: chars.len() });
    }

    let square = |f: char, r: char| -> Result<Square, MoveParseError> {
        match (file_from_char(f), rank_from_char(r)) {
            (Some(file), Some(rank)) => Ok(Square::new_unchecked(file, rank)),
            _ => Err(MoveParseError::InvalidSquare {
                notation: text.to_string(),
            }),
        }
    };

    let from = square(chars[0], chars[1])?;
    let to = square(chars[2], chars[3])?;

    let promotion = match chars.get(4) {
        None => None,
        Some(&c) => {
            let piece = Piece::from_char(c)
                .filter(|p| p.is_promotion_target())
                .ok_or(MoveParseError::InvalidPromotion { char: c })?;
            Some(piece)
        }
    };

    Ok(UciMove {
        from,
        to,
        promotion,
    })
}

/// Encode coordinates as move text; the inverse of [`try_decode_move`].
///
/// Always four characters, plus the lowercase promotion letter when present.
#[must_use]
pub fn encode_move(from: Square, to: Square, promotion: Option<Piece>) -> String {
    UciMove::new(from, to, promotion).to_string()
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        try_decode_move(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_promotion() {
        let mv = try_decode_move("e7e8q").unwrap();
        assert_eq!(mv.from.coords(), (4, 6));
        assert_eq!(mv.to.coords(), (4, 7));
        assert_eq!(mv.promotion, Some(Piece::Queen));
    }

    #[test]
    fn test_decode_plain_move() {
        let mv = try_decode_move("a1h8").unwrap();
        assert_eq!(mv.from.coords(), (0, 0));
        assert_eq!(mv.to.coords(), (7, 7));
        assert_eq!(mv.promotion, None);
    }

    #[test]
    fn test_decode_uppercase_promotion() {
        let mv = try_decode_move("b2b1N").unwrap();
        assert_eq!(mv.promotion, Some(Piece::Knight));
        assert_eq!(mv.to_string(), "b2b1n");
    }

    #[test]
    fn test_decode_rejects_empty_and_short() {
        assert_eq!(try_decode_move(""), Err(MoveParseError::Empty));
        assert_eq!(
            try_decode_move("e2e"),
            Err(MoveParseError::InvalidLength { len: 3 })
        );
        assert_eq!(
            try_decode_move("e2e4qq"),
            Err(MoveParseError::InvalidLength { len: 6 })
        );
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        for text in ["i2e4", "e0e4", "e2e9", "e2z4", "E2E4", "(none)"] {
            assert!(try_decode_move(text).is_err(), "{text} should not decode");
        }
        assert!(matches!(
            try_decode_move("e9e4"),
            Err(MoveParseError::InvalidSquare { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_promotion() {
        assert_eq!(
            try_decode_move("e7e8k"),
            Err(MoveParseError::InvalidPromotion { char: 'k' })
        );
        assert_eq!(
            try_decode_move("e7e8p"),
            Err(MoveParseError::InvalidPromotion { char: 'p' })
        );
    }

    #[test]
    fn test_encode_move() {
        let from = Square::new(4, 1).unwrap();
        let to = Square::new(4, 3).unwrap();
        assert_eq!(encode_move(from, to, None), "e2e4");
        assert_eq!(encode_move(to, from, Some(Piece::Rook)), "e4e2r");
    }
}
