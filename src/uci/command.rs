use std::fmt;

/// Commands the client writes to the engine's standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    IsReady,
    UciNewGame,
    SetOption { name: String, value: Option<String> },
    /// `position fen <position string>`
    Position(String),
    /// `go movetime <ms>`
    GoMoveTime(u64),
    Stop,
    Quit,
}

impl EngineCommand {
    #[must_use]
    pub fn set_option(name: impl Into<String>, value: impl ToString) -> Self {
        EngineCommand::SetOption {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// The reply line that acknowledges this command, for the two
    /// commands that have one.
    #[must_use]
    pub fn expected_reply(&self) -> Option<&'static str> {
        match self {
            EngineCommand::Uci => Some("uciok"),
            EngineCommand::IsReady => Some("readyok"),
            _ => None,
        }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => f.write_str("uci"),
            EngineCommand::IsReady => f.write_str("isready"),
            EngineCommand::UciNewGame => f.write_str("ucinewgame"),
            EngineCommand::SetOption { name, value } => {
                write!(f, "{}", super::options::format_setoption(name, value.as_deref()))
            }
            EngineCommand::Position(fen) => write!(f, "position fen {fen}"),
            EngineCommand::GoMoveTime(ms) => write!(f, "go movetime {ms}"),
            EngineCommand::Stop => f.write_str("stop"),
            EngineCommand::Quit => f.write_str("quit"),
        }
    }
}
