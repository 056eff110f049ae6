//! Engine client errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

use super::EngineState;

/// Error type for engine process and protocol failures
#[derive(Debug)]
pub enum EngineError {
    /// No engine executable at any configured location
    ExecutableNotFound { tried: Vec<PathBuf> },
    /// The process could not be started
    Spawn(io::Error),
    /// Reading from or writing to the engine's pipes failed
    Io(io::Error),
    /// The engine did not send `expected` within the handshake timeout
    HandshakeTimeout { expected: &'static str },
    /// The engine's output ended (process exited or pipe broke)
    StreamClosed,
    /// A request arrived while the client was not `Ready`
    NotReady(EngineState),
    /// A request arrived while another search was still in flight
    Busy,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ExecutableNotFound { tried } => {
                write!(f, "Engine executable not found (tried ")?;
                for (i, path) in tried.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                write!(f, ")")
            }
            EngineError::Spawn(e) => write!(f, "Failed to start engine: {e}"),
            EngineError::Io(e) => write!(f, "Engine pipe error: {e}"),
            EngineError::HandshakeTimeout { expected } => {
                write!(f, "Engine did not answer '{expected}' in time")
            }
            EngineError::StreamClosed => write!(f, "Engine output closed"),
            EngineError::NotReady(state) => {
                write!(f, "Engine is not ready (state: {state})")
            }
            EngineError::Busy => write!(f, "Engine is already searching"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Spawn(e) | EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}
