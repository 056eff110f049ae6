use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::{try_decode_move, UciMove};
use crate::sync::Completion;
use crate::uci::{Score, NO_MOVE};

/// Why a search produced no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchFailure {
    /// No `bestmove` arrived within budget plus safety margin
    TimedOut,
    /// The engine's output ended mid-search
    EngineExited,
    /// Writing the request to the engine failed
    WriteFailed,
    /// The engine did not confirm `readyok` before the search could start
    ResyncFailed,
    /// The client was shut down while the search was in flight
    Cancelled,
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchFailure::TimedOut => "timed out",
            SearchFailure::EngineExited => "engine exited",
            SearchFailure::WriteFailed => "write failed",
            SearchFailure::ResyncFailed => "resync failed",
            SearchFailure::Cancelled => "cancelled",
        })
    }
}

/// Outcome of one best-move request.
///
/// `mate_distance` and `centipawns` are never both set; they come from the
/// last score the engine reported before `bestmove`. A `best_move` equal to
/// [`NO_MOVE`] means the side to move has no legal move.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineResult {
    pub success: bool,
    pub best_move: Option<String>,
    pub ponder: Option<String>,
    pub mate_distance: Option<i32>,
    pub centipawns: Option<i32>,
    pub failure: Option<SearchFailure>,
}

impl EngineResult {
    #[must_use]
    pub fn found(best_move: String, ponder: Option<String>, score: Option<Score>) -> Self {
        let (mate_distance, centipawns) = match score {
            Some(Score::Mate(n)) => (Some(n), None),
            Some(Score::Centipawns(cp)) => (None, Some(cp)),
            None => (None, None),
        };
        EngineResult {
            success: true,
            best_move: Some(best_move),
            ponder,
            mate_distance,
            centipawns,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(reason: SearchFailure) -> Self {
        EngineResult {
            failure: Some(reason),
            ..Self::default()
        }
    }

    /// The engine answered that the side to move has no move
    #[must_use]
    pub fn is_no_move(&self) -> bool {
        self.success && self.best_move.as_deref() == Some(NO_MOVE)
    }

    /// The engine reports a forced mate for the side to move
    #[must_use]
    pub fn claims_mate(&self) -> bool {
        matches!(self.mate_distance, Some(n) if n > 0)
    }

    /// The best move decoded into squares, when there is a well-formed one
    #[must_use]
    pub fn uci_move(&self) -> Option<UciMove> {
        if !self.success || self.is_no_move() {
            return None;
        }
        self.best_move.as_deref().and_then(|m| try_decode_move(m).ok())
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.mate_distance
            .map(Score::Mate)
            .or(self.centipawns.map(Score::Centipawns))
    }
}

/// Caller-side view of an in-flight request.
///
/// The continuation passed to the request is the primary signal; the handle
/// lets callers that prefer polling or blocking see the same result.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    slot: Completion<EngineResult>,
}

impl SearchHandle {
    pub(crate) fn new(slot: Completion<EngineResult>) -> Self {
        SearchHandle { slot }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.slot.is_complete()
    }

    /// The result, without blocking
    #[must_use]
    pub fn try_result(&self) -> Option<&EngineResult> {
        self.slot.get()
    }

    pub fn wait(&self) -> &EngineResult {
        self.slot.wait()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<&EngineResult> {
        self.slot.wait_timeout(timeout)
    }
}
