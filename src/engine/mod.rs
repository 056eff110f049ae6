//! Client side of the engine bridge.
//!
//! [`EngineClient`] launches an external UCI engine, handshakes, and turns
//! "best move for this position" requests into asynchronous results. The
//! process plumbing sits behind [`Launcher`], so the client can be driven
//! by an in-memory engine as easily as by a real executable.

mod client;
mod config;
mod error;
mod reader;
mod result;
mod state;
pub mod transport;
mod verify;

pub use client::EngineClient;
pub use config::{
    EngineConfig, DEFAULT_HANDSHAKE_TIMEOUT_MS, DEFAULT_SAFETY_MARGIN_MS,
    DEFAULT_SEARCH_BUDGET_MS, DEFAULT_SHUTDOWN_GRACE_MS, DEFAULT_SKILL_LEVEL,
};
pub use error::EngineError;
pub use reader::ReaderEvent;
pub use result::{EngineResult, SearchFailure, SearchHandle};
pub use state::EngineState;
pub use transport::{EngineIo, EngineProcess, Launcher, ProcessLauncher};
pub use verify::Verdict;
