use std::fmt;

/// Lifecycle of one engine process, as seen by the client.
///
/// ```text
/// Uninitialized -> Launching -> Handshaking -> Ready <-> Searching
///                                   |            |          |
///                                   +------------+----------+--> Faulted
/// ```
///
/// `Faulted` is terminal for the process it describes; a new
/// [`initialize`](super::EngineClient::initialize) starts over with a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Uninitialized,
    Launching,
    Handshaking,
    Ready,
    Searching,
    Faulted,
}

impl EngineState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Launching => "launching",
            EngineState::Handshaking => "handshaking",
            EngineState::Ready => "ready",
            EngineState::Searching => "searching",
            EngineState::Faulted => "faulted",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
