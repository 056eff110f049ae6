//! Position codec: the game state a position string carries beyond piece
//! placement, and the `Encode` operation that joins the six fields.
//!
//! The codec tracks castling rights, the en passant target and the two move
//! counters across calls. The board itself is never retained; each `encode`
//! borrows a snapshot for the duration of the call.
//!
//! # Example
//! ```
//! use chess_bridge::board::{BoardSnapshot, CastlingRights, Color, PositionCodec};
//!
//! let codec = PositionCodec::new(CastlingRights::all());
//! let fen = codec.encode(&BoardSnapshot::standard(), Color::White);
//! assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
//! ```

use super::fen::encode_placement;
use super::{BoardSnapshot, CastlingRights, Color, Piece, PieceRef, Square};

/// Castling, en passant and clock state for one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionCodec {
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for PositionCodec {
    /// Starts with no castling rights: deployed setups rarely have kings and
    /// rooks on their home squares, and engines reject rights that don't match.
    fn default() -> Self {
        Self::new(CastlingRights::none())
    }
}

impl PositionCodec {
    /// Fresh game state with the given starting castling policy
    #[must_use]
    pub fn new(castling: CastlingRights) -> Self {
        PositionCodec {
            castling,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Fresh game state for the standard array (all four rights)
    #[must_use]
    pub fn standard() -> Self {
        Self::new(CastlingRights::all())
    }

    /// Restore state decoded from a position string.
    #[must_use]
    pub(crate) fn from_parts(
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        PositionCodec {
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number: fullmove_number.max(1),
        }
    }

    #[inline]
    #[must_use]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Produce the six-field position string for `board` with `side_to_move`
    /// to play.
    #[must_use]
    pub fn encode(&self, board: &BoardSnapshot, side_to_move: Color) -> String {
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            encode_placement(board),
            side_to_move.to_fen_char(),
            self.castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number.max(1)
        )
    }

    /// Drop the castling rights a king or rook move forfeits.
    ///
    /// A king loses both rights of its color. A rook loses the single right
    /// of the corner it leaves (file 0 or 7 on its own back rank). Rights are
    /// never granted here.
    pub fn update_castling_rights(&mut self, piece: PieceRef, from: Square) {
        match piece.piece {
            Piece::King => self.castling.remove_color(piece.color),
            Piece::Rook if from.rank() == piece.color.back_rank() => match from.file() {
                0 => self.castling.remove(piece.color, false),
                7 => self.castling.remove(piece.color, true),
                _ => {}
            },
            _ => {}
        }
    }

    /// Record the en passant target after a pawn move on `file` from
    /// `from_rank` to `to_rank`. A two-rank jump sets the square it passed
    /// over; anything else clears the target.
    pub fn set_en_passant(&mut self, from_rank: u8, to_rank: u8, file: u8) {
        self.en_passant = if from_rank.abs_diff(to_rank) == 2 {
            Square::new(file, from_rank.min(to_rank) + 1)
        } else {
            None
        };
    }

    /// The target is only good for one reply; call after every other move.
    pub fn clear_en_passant(&mut self) {
        self.en_passant = None;
    }

    /// Advance the move counters after a completed move.
    ///
    /// The halfmove clock resets on a pawn move or capture and counts up
    /// otherwise. The fullmove number advances after the second player
    /// (Black) has moved.
    pub fn increment_counters(&mut self, is_pawn_move_or_capture: bool, is_second_players_move: bool) {
        if is_pawn_move_or_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if is_second_players_move {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
    }

    /// Apply all per-move bookkeeping for `piece` moving `from` -> `to`:
    /// castling ratchet, en passant set or clear, and the counters.
    pub fn record_move(&mut self, piece: PieceRef, from: Square, to: Square, captured: bool) {
        self.update_castling_rights(piece, from);

        let is_pawn = piece.piece == Piece::Pawn;
        if is_pawn {
            self.set_en_passant(from.rank(), to.rank(), from.file());
        } else {
            self.clear_en_passant();
        }

        self.increment_counters(is_pawn || captured, piece.color == Color::Black);
    }
}
