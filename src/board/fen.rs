use std::str::FromStr;

use super::error::FenError;
use super::{BoardSnapshot, CastlingRights, Color, PieceRef, PositionCodec, Square};

/// Piece-placement field: rank 8 first, files a to h, empty runs as digits,
/// ranks joined by `/`.
#[must_use]
pub fn encode_placement(board: &BoardSnapshot) -> String {
    let mut rows: Vec<String> = Vec::with_capacity(8);
    for rank in (0..8).rev() {
        let mut row = String::new();
        let mut empty = 0;
        for file in 0..8 {
            let sq = Square::new_unchecked(file, rank);
            if let Some(piece) = board.get(sq) {
                if empty > 0 {
                    row.push_str(&empty.to_string());
                    empty = 0;
                }
                row.push(piece.to_fen_char());
            } else {
                empty += 1;
            }
        }
        if empty > 0 {
            row.push_str(&empty.to_string());
        }
        rows.push(row);
    }
    rows.join("/")
}

/// Parse a piece-placement field back into a snapshot.
pub fn decode_placement(placement: &str) -> Result<BoardSnapshot, FenError> {
    let mut board = BoardSnapshot::empty();
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidRank { rank: ranks.len() });
    }

    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8;
        let mut file: usize = 0;
        for c in rank_str.chars() {
            if let Some(run) = c.to_digit(10) {
                if run == 0 {
                    return Err(FenError::InvalidPiece { char: c });
                }
                file += run as usize;
            } else {
                let piece = PieceRef::from_fen_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                board.set(Square::new_unchecked(file as u8, rank), Some(piece));
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::TooManyFiles {
                rank: rank_idx,
                files: file,
            });
        }
    }

    Ok(board)
}

/// Everything a position string describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPosition {
    pub board: BoardSnapshot,
    pub side_to_move: Color,
    pub codec: PositionCodec,
}

/// Parse a full position string (the inverse of [`PositionCodec::encode`]).
///
/// The halfmove and fullmove fields are optional and default to `0` and `1`.
pub fn decode_position(fen: &str) -> Result<DecodedPosition, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::TooFewParts { found: parts.len() });
    }

    let board = decode_placement(parts[0])?;

    let side_to_move = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => {
            return Err(FenError::InvalidSideToMove {
                found: other.to_string(),
            })
        }
    };

    let mut castling = CastlingRights::none();
    for c in parts[2].chars() {
        match c {
            'K' => castling.set(Color::White, true),
            'Q' => castling.set(Color::White, false),
            'k' => castling.set(Color::Black, true),
            'q' => castling.set(Color::Black, false),
            '-' => {}
            _ => return Err(FenError::InvalidCastling { char: c }),
        }
    }

    let en_passant = if parts[3] == "-" {
        None
    } else {
        Some(
            Square::from_str(parts[3]).map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?,
        )
    };

    let counter = |idx: usize, default: u32| -> Result<u32, FenError> {
        parts.get(idx).map_or(Ok(default), |s| {
            s.parse().map_err(|_| FenError::InvalidCounter {
                found: (*s).to_string(),
            })
        })
    };
    let halfmove_clock = counter(4, 0)?;
    let fullmove_number = counter(5, 1)?;

    Ok(DecodedPosition {
        board,
        side_to_move,
        codec: PositionCodec::from_parts(castling, en_passant, halfmove_clock, fullmove_number),
    })
}

impl FromStr for DecodedPosition {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_position(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_fen_round_trip() {
        let decoded = decode_position(START).unwrap();
        assert_eq!(decoded.board, BoardSnapshot::standard());
        assert_eq!(decoded.side_to_move, Color::White);
        assert_eq!(
            decoded.codec.encode(&decoded.board, decoded.side_to_move),
            START
        );
    }

    #[test]
    fn test_fen_black_to_move() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let decoded = decode_position(fen).unwrap();
        assert_eq!(decoded.side_to_move, Color::Black);
        assert_eq!(decoded.codec.en_passant().map(|s| s.to_string()), Some("e3".into()));
    }

    #[test]
    fn test_fen_counters_optional() {
        let decoded = decode_position("8/8/8/8/8/8/8/K1k5 w - -").unwrap();
        assert_eq!(decoded.codec.halfmove_clock(), 0);
        assert_eq!(decoded.codec.fullmove_number(), 1);

        let decoded = decode_position("8/8/8/8/8/8/8/K1k5 w - - 42 17").unwrap();
        assert_eq!(decoded.codec.halfmove_clock(), 42);
        assert_eq!(decoded.codec.fullmove_number(), 17);
    }

    #[test]
    fn test_multiple_kings_decode() {
        let decoded = decode_position("k6k/8/8/8/8/8/8/KK6 b - - 0 1").unwrap();
        assert_eq!(decoded.board.kings(Color::White).len(), 2);
        assert_eq!(decoded.board.kings(Color::Black).len(), 2);
    }

    #[test]
    fn test_fen_error_too_few_parts() {
        let result = decode_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w");
        assert!(matches!(result, Err(FenError::TooFewParts { .. })));
    }

    #[test]
    fn test_fen_error_invalid_piece() {
        let result = decode_position("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(matches!(result, Err(FenError::InvalidPiece { char: 'x' })));
    }

    #[test]
    fn test_fen_error_rank_count() {
        let result = decode_position("8/8/8/8/8/8/8 w - - 0 1");
        assert!(matches!(result, Err(FenError::InvalidRank { rank: 7 })));
    }

    #[test]
    fn test_fen_error_file_count() {
        assert!(matches!(
            decode_placement("9/8/8/8/8/8/8/8"),
            Err(FenError::TooManyFiles { .. })
        ));
        assert!(matches!(
            decode_placement("7/8/8/8/8/8/8/8"),
            Err(FenError::TooManyFiles { rank: 0, files: 7 })
        ));
        assert!(matches!(
            decode_placement("ppppppppp/8/8/8/8/8/8/8"),
            Err(FenError::TooManyFiles { rank: 0, files: 9 })
        ));
    }

    #[test]
    fn test_fen_error_invalid_side_to_move() {
        let result = decode_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1");
        assert!(matches!(result, Err(FenError::InvalidSideToMove { .. })));
    }

    #[test]
    fn test_fen_error_invalid_castling() {
        let result = decode_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XQkq - 0 1");
        assert!(matches!(result, Err(FenError::InvalidCastling { char: 'X' })));
    }

    #[test]
    fn test_fen_error_invalid_en_passant() {
        let result = decode_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1");
        assert!(matches!(result, Err(FenError::InvalidEnPassant { .. })));
    }

    #[test]
    fn test_fen_error_invalid_counter() {
        let result = decode_position("8/8/8/8/8/8/8/8 w - - -3 1");
        assert!(matches!(result, Err(FenError::InvalidCounter { .. })));
    }

    #[test]
    fn test_placement_letters() {
        let board = BoardSnapshot::from_pieces([
            ("a8".parse().unwrap(), PieceRef::black(Piece::Rook)),
            ("h1".parse().unwrap(), PieceRef::white(Piece::Knight)),
        ]);
        assert_eq!(encode_placement(&board), "r7/8/8/8/8/8/8/7N");
    }

    #[test]
    fn test_from_str_trait() {
        let decoded: DecodedPosition = START.parse().unwrap();
        assert_eq!(decoded.board.piece_count(), 32);
    }
}
