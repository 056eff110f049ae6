//! Bridge between a board game and an external UCI chess engine.
//!
//! [`board`] turns the game's grid into position strings and engine move
//! text back into coordinates. [`engine`] runs the engine process and
//! answers best-move requests asynchronously. [`uci`] holds the wire text.

pub mod board;
pub mod engine;
pub mod sync;
pub mod uci;

pub use board::{BoardSnapshot, Color, Piece, PieceRef, PositionCodec, Square, UciMove};
pub use engine::{EngineClient, EngineConfig, EngineError, EngineResult, EngineState};
