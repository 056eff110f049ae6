//! Position codec: board snapshots to position strings, and move text to
//! board coordinates.
//!
//! Nothing in here knows chess legality. It only translates between the
//! game's grid and the text an engine reads and writes.
//!
//! # Example
//! ```
//! use chess_bridge::board::{try_decode_move, BoardSnapshot, Color, PositionCodec};
//!
//! let mut board = BoardSnapshot::standard();
//! let codec = PositionCodec::standard();
//! let position = codec.encode(&board, Color::White);
//!
//! // ... the engine answers "e2e4"
//! let mv = try_decode_move("e2e4").unwrap();
//! board.apply_move(&mv);
//! # assert!(position.starts_with("rnbqkbnr/"));
//! ```

mod codec;
mod error;
mod fen;
mod moves;
mod snapshot;
mod types;

#[cfg(test)]
mod tests;

pub use codec::PositionCodec;
pub use error::{FenError, MoveParseError, PieceParseError, SquareError};
pub use fen::{decode_placement, decode_position, encode_placement, DecodedPosition};
pub use moves::{encode_move, try_decode_move, UciMove};
pub use snapshot::BoardSnapshot;
pub use types::{CastlingRights, Color, Piece, PieceRef, Square, PROMOTION_PIECES};
