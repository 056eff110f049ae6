//! Core board value types.
//!
//! - `Piece`, `Color` and `PieceRef` - piece kinds, owners, and the pair
//! - `Square` - `(file, rank)` board coordinate
//! - `CastlingRights` - castling state

mod castling;
mod piece;
mod square;

pub use castling::CastlingRights;
pub use piece::{Color, Piece, PieceRef, PROMOTION_PIECES};
pub use square::Square;

pub(crate) use square::{file_from_char, rank_from_char};
