//! Engine client configuration.
//!
//! One explicit value built by the composition root and handed to
//! [`EngineClient::new`](super::EngineClient::new). Nothing here is global.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::uci::options::{MAX_SKILL_LEVEL, MIN_SKILL_LEVEL};
use crate::uci::EngineCommand;

pub const DEFAULT_SKILL_LEVEL: u8 = 5;
pub const DEFAULT_SEARCH_BUDGET_MS: u64 = 1000;
/// Added to every search budget before a request is declared timed out
pub const DEFAULT_SAFETY_MARGIN_MS: u64 = 5000;
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Engine executable; a bare file name is also looked up on `PATH`
    pub executable: PathBuf,
    /// Further locations tried, in order, when `executable` does not exist
    pub fallback_paths: Vec<PathBuf>,
    /// `Skill Level` sent during the handshake, clamped to 0-20
    pub skill_level: u8,
    /// `UCI_Variant`, for engines that play non-standard rule sets
    pub variant: Option<String>,
    /// `VariantPath`, a variant definition file for the engine to load
    pub variant_path: Option<PathBuf>,
    /// Any other `setoption` pairs, sent after the ones above
    pub extra_options: Vec<(String, String)>,
    /// Search budget used by [`request_default`](super::EngineClient::request_default)
    pub search_budget_ms: u64,
    pub safety_margin_ms: u64,
    /// Bound on each handshake wait (`uciok`, `readyok`)
    pub handshake_timeout_ms: u64,
    /// How long `quit` is given before the process is killed
    pub shutdown_grace_ms: u64,
    /// Pipe the engine's standard error and forward it to the log
    pub capture_stderr: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            executable: PathBuf::from("stockfish"),
            fallback_paths: Vec::new(),
            skill_level: DEFAULT_SKILL_LEVEL,
            variant: None,
            variant_path: None,
            extra_options: Vec::new(),
            search_budget_ms: DEFAULT_SEARCH_BUDGET_MS,
            safety_margin_ms: DEFAULT_SAFETY_MARGIN_MS,
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            capture_stderr: false,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        EngineConfig {
            executable: executable.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fallback_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn with_skill_level(mut self, level: u8) -> Self {
        self.skill_level = level.clamp(MIN_SKILL_LEVEL, MAX_SKILL_LEVEL);
        self
    }

    /// Select a rule set, optionally loading its definition from a file
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>, path: Option<PathBuf>) -> Self {
        self.variant = Some(variant.into());
        self.variant_path = path;
        self
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_options.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_search_budget(mut self, budget: Duration) -> Self {
        self.search_budget_ms = duration_ms(budget).max(1);
        self
    }

    #[must_use]
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin_ms = duration_ms(margin);
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout_ms = duration_ms(timeout);
        self
    }

    #[must_use]
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace_ms = duration_ms(grace);
        self
    }

    #[must_use]
    pub fn with_stderr_capture(mut self, capture: bool) -> Self {
        self.capture_stderr = capture;
        self
    }

    #[must_use]
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Time a request with `budget_ms` may take before it resolves as failed
    #[must_use]
    pub fn request_timeout(&self, budget_ms: u64) -> Duration {
        Duration::from_millis(budget_ms.saturating_add(self.safety_margin_ms))
    }

    /// `setoption` commands sent between `uciok` and `isready`, in order:
    /// skill level, variant definition file, variant, then extra options.
    #[must_use]
    pub fn option_commands(&self) -> Vec<EngineCommand> {
        let mut commands = vec![EngineCommand::set_option(
            crate::uci::options::SKILL_LEVEL,
            self.skill_level.clamp(MIN_SKILL_LEVEL, MAX_SKILL_LEVEL),
        )];
        if let Some(path) = &self.variant_path {
            commands.push(EngineCommand::set_option(
                crate::uci::options::VARIANT_PATH,
                path.display(),
            ));
        }
        if let Some(variant) = &self.variant {
            commands.push(EngineCommand::set_option(
                crate::uci::options::UCI_VARIANT,
                variant,
            ));
        }
        for (name, value) in &self.extra_options {
            commands.push(EngineCommand::set_option(name.clone(), value));
        }
        commands
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
