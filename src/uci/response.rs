//! Parsing of the lines an engine writes to standard output.
//!
//! Parsing is best effort: anything that does not match a known shape comes
//! back as [`EngineLine::Other`] and is never an error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::NO_MOVE;

/// Evaluation carried by an `info ... score ...` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Score {
    /// `score cp <n>`: centipawns from the side to move's point of view
    Centipawns(i32),
    /// `score mate <n>`: mate in `n` moves; negative when being mated
    Mate(i32),
}

/// One classified line of engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLine {
    UciOk,
    ReadyOk,
    IdName(String),
    IdAuthor(String),
    /// An `info` line; `score` is set when it carried a parsable score
    Info { depth: Option<u32>, score: Option<Score> },
    /// The terminal line of a search. `best` may be [`NO_MOVE`].
    BestMove { best: String, ponder: Option<String> },
    Other(String),
}

impl EngineLine {
    /// Classify a raw output line
    #[must_use]
    pub fn parse(line: &str) -> EngineLine {
        let trimmed = line.trim();
        let mut tokens = trimmed.split_whitespace();

        match tokens.next() {
            Some("uciok") => EngineLine::UciOk,
            Some("readyok") => EngineLine::ReadyOk,
            Some("id") => match tokens.next() {
                Some("name") => EngineLine::IdName(rest_after(trimmed, 2)),
                Some("author") => EngineLine::IdAuthor(rest_after(trimmed, 2)),
                _ => EngineLine::Other(trimmed.to_string()),
            },
            Some("info") => {
                let tokens: Vec<&str> = tokens.collect();
                EngineLine::Info {
                    depth: value_after(&tokens, "depth"),
                    score: parse_score(&tokens),
                }
            }
            Some("bestmove") => match tokens.next() {
                Some(best) => {
                    let ponder = match (tokens.next(), tokens.next()) {
                        (Some("ponder"), Some(mv)) => Some(mv.to_string()),
                        _ => None,
                    };
                    EngineLine::BestMove {
                        best: best.to_string(),
                        ponder,
                    }
                }
                None => EngineLine::Other(trimmed.to_string()),
            },
            _ => EngineLine::Other(trimmed.to_string()),
        }
    }

    /// True for a terminal line reporting that the side to move has no move
    #[must_use]
    pub fn is_no_move(&self) -> bool {
        matches!(self, EngineLine::BestMove { best, .. } if best == NO_MOVE)
    }
}

/// Text following the first `skip` tokens, with inner spacing kept
fn rest_after(line: &str, skip: usize) -> String {
    let mut rest = line;
    for _ in 0..skip {
        rest = rest.trim_start();
        rest = rest.find(char::is_whitespace).map_or("", |i| &rest[i..]);
    }
    rest.trim().to_string()
}

fn value_after<T: std::str::FromStr>(tokens: &[&str], key: &str) -> Option<T> {
    let idx = tokens.iter().position(|t| *t == key)?;
    tokens.get(idx + 1)?.parse().ok()
}

/// `score cp <n>` or `score mate <n>`; anything else yields `None`
fn parse_score(tokens: &[&str]) -> Option<Score> {
    let idx = tokens.iter().position(|t| *t == "score")?;
    let value: i32 = tokens.get(idx + 2)?.parse().ok()?;
    match *tokens.get(idx + 1)? {
        "cp" => Some(Score::Centipawns(value)),
        "mate" => Some(Score::Mate(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_lines() {
        assert_eq!(EngineLine::parse("uciok"), EngineLine::UciOk);
        assert_eq!(EngineLine::parse("readyok\r\n"), EngineLine::ReadyOk);
        assert_eq!(
            EngineLine::parse("id name Fairy-Stockfish 14 LB"),
            EngineLine::IdName("Fairy-Stockfish 14 LB".to_string())
        );
        assert_eq!(
            EngineLine::parse("id author the Stockfish developers"),
            EngineLine::IdAuthor("the Stockfish developers".to_string())
        );
    }

    #[test]
    fn test_info_centipawns() {
        let line = "info depth 12 seldepth 18 multipv 1 score cp -34 nodes 20541 nps 1026000 pv e7e5";
        assert_eq!(
            EngineLine::parse(line),
            EngineLine::Info {
                depth: Some(12),
                score: Some(Score::Centipawns(-34)),
            }
        );
    }

    #[test]
    fn test_info_mate() {
        let line = "info depth 5 score mate -2 pv h7h8";
        assert_eq!(
            EngineLine::parse(line),
            EngineLine::Info {
                depth: Some(5),
                score: Some(Score::Mate(-2)),
            }
        );
    }

    #[test]
    fn test_info_without_score() {
        assert_eq!(
            EngineLine::parse("info string NNUE evaluation enabled"),
            EngineLine::Info {
                depth: None,
                score: None
            }
        );
    }

    #[test]
    fn test_malformed_score_is_ignored() {
        for line in [
            "info depth 3 score cp",
            "info depth 3 score cp abc",
            "info depth 3 score wdl 10 20",
        ] {
            assert!(
                matches!(EngineLine::parse(line), EngineLine::Info { score: None, .. }),
                "{line}"
            );
        }
    }

    #[test]
    fn test_bestmove() {
        assert_eq!(
            EngineLine::parse("bestmove e2e4 ponder e7e5"),
            EngineLine::BestMove {
                best: "e2e4".to_string(),
                ponder: Some("e7e5".to_string()),
            }
        );
        assert_eq!(
            EngineLine::parse("bestmove e7e8q"),
            EngineLine::BestMove {
                best: "e7e8q".to_string(),
                ponder: None,
            }
        );
    }

    #[test]
    fn test_bestmove_none_sentinel() {
        let line = EngineLine::parse("bestmove (none)");
        assert!(line.is_no_move());
        assert!(!EngineLine::parse("bestmove a2a3").is_no_move());
    }

    #[test]
    fn test_bare_bestmove_is_other() {
        assert_eq!(
            EngineLine::parse("bestmove"),
            EngineLine::Other("bestmove".to_string())
        );
    }

    #[test]
    fn test_unknown_line() {
        assert_eq!(
            EngineLine::parse("Stockfish 16 by the Stockfish developers"),
            EngineLine::Other("Stockfish 16 by the Stockfish developers".to_string())
        );
    }
}
