//! Second opinion on "the side to move is stuck".
//!
//! A game that sees a mate claim, or finds no legal move of its own, can ask
//! the engine again before ending the game. This is a heuristic; the engine
//! does not know the game's own rules.

use super::{EngineClient, EngineError, EngineResult, SearchHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The engine found no move
    Stuck,
    /// The engine found this move
    HasMove(String),
    /// The engine gave no usable answer
    Unknown,
}

impl Verdict {
    #[must_use]
    pub fn from_result(result: &EngineResult) -> Verdict {
        if !result.success {
            return Verdict::Unknown;
        }
        match result.best_move.as_deref() {
            _ if result.is_no_move() => Verdict::Stuck,
            Some(mv) if !mv.is_empty() => Verdict::HasMove(mv.to_string()),
            _ => Verdict::Unknown,
        }
    }
}

impl EngineClient {
    /// Ask the engine whether the side to move in `position` has any move.
    ///
    /// Same contract as [`request_best_move`](Self::request_best_move);
    /// `on_verdict` runs exactly once unless this returns `Err`.
    pub fn verify_stuck<F>(
        &mut self,
        position: &str,
        budget_ms: u64,
        on_verdict: F,
    ) -> Result<SearchHandle, EngineError>
    where
        F: FnOnce(Verdict) + Send + 'static,
    {
        self.request_best_move(position, budget_ms, move |result| {
            let verdict = Verdict::from_result(&result);
            log::debug!("stuck check for {:?}: {verdict:?}", result.best_move);
            on_verdict(verdict);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SearchFailure;
    use crate::uci::{Score, NO_MOVE};

    #[test]
    fn test_verdicts() {
        let none = EngineResult::found(NO_MOVE.into(), None, Some(Score::Mate(0)));
        assert_eq!(Verdict::from_result(&none), Verdict::Stuck);

        let mv = EngineResult::found("g1f3".into(), None, None);
        assert_eq!(Verdict::from_result(&mv), Verdict::HasMove("g1f3".into()));

        let failed = EngineResult::failed(SearchFailure::TimedOut);
        assert_eq!(Verdict::from_result(&failed), Verdict::Unknown);
    }
}
