//! Universal Chess Interface (UCI) wire text, client side.
//!
//! Formats the commands written to an engine and classifies the lines it
//! writes back. No I/O happens here; see [`crate::engine`] for the process
//! plumbing.

pub mod command;
pub mod options;
pub mod response;

pub use command::EngineCommand;
pub use options::format_setoption;
pub use response::{EngineLine, Score};

/// Move token an engine reports when the side to move has no legal move
pub const NO_MOVE: &str = "(none)";
