//! The seam between the client and the operating system.
//!
//! [`Launcher`] produces the three pipes and a process handle; the client
//! never touches `std::process` directly. [`ProcessLauncher`] is the real
//! implementation, tests supply scripted ones.

use std::env;
use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use log::{debug, info};

use super::{EngineConfig, EngineError};

/// Handle on a running engine process.
pub trait EngineProcess: Send {
    /// Non-blocking check for process exit
    fn has_exited(&mut self) -> io::Result<bool>;

    /// Terminate the process immediately
    fn kill(&mut self) -> io::Result<()>;
}

/// Pipes and process handle for one launched engine.
pub struct EngineIo {
    pub stdin: Box<dyn Write + Send>,
    pub stdout: Box<dyn Read + Send>,
    pub stderr: Option<Box<dyn Read + Send>>,
    pub process: Box<dyn EngineProcess>,
}

/// Starts engine processes.
pub trait Launcher: Send + Sync {
    fn launch(&self, config: &EngineConfig) -> Result<EngineIo, EngineError>;
}

impl EngineProcess for Child {
    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(self.try_wait()?.is_some())
    }

    fn kill(&mut self) -> io::Result<()> {
        Child::kill(self)?;
        // Reap so the process does not linger as a zombie
        self.wait().map(|_| ())
    }
}

/// Launches the configured executable as a child process with piped
/// standard streams and no console window.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, config: &EngineConfig) -> Result<EngineIo, EngineError> {
        let exe = resolve_executable(config)?;

        let mut command = Command::new(&exe);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if config.capture_stderr {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        hide_console_window(&mut command);

        let mut child = command.spawn().map_err(EngineError::Spawn)?;
        info!("launched engine {} (pid {})", exe.display(), child.id());

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = EngineProcess::kill(&mut child);
            return Err(EngineError::Spawn(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "engine pipes were not created",
            )));
        };
        let stderr = child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>);

        Ok(EngineIo {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr,
            process: Box::new(child),
        })
    }
}

#[cfg(windows)]
fn hide_console_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_command: &mut Command) {}

/// Find the engine executable.
///
/// Tries the configured path, then each fallback path, then looks the
/// configured name up on `PATH` when it is a bare file name.
pub fn resolve_executable(config: &EngineConfig) -> Result<PathBuf, EngineError> {
    let mut tried = Vec::with_capacity(1 + config.fallback_paths.len());

    for candidate in std::iter::once(&config.executable).chain(&config.fallback_paths) {
        if candidate.is_file() {
            debug!("found engine at {}", candidate.display());
            return Ok(candidate.clone());
        }
        tried.push(candidate.clone());
    }

    if is_bare_name(&config.executable) {
        if let Some(found) = search_path(config.executable.as_os_str()) {
            debug!("found engine on PATH at {}", found.display());
            return Ok(found);
        }
    }

    Err(EngineError::ExecutableNotFound { tried })
}

fn is_bare_name(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

fn search_path(name: &OsStr) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) && candidate.extension().is_none() {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_lists_all_candidates() {
        let config = EngineConfig::new("/nonexistent/engine")
            .with_fallback_path("/also/missing/engine");
        match resolve_executable(&config) {
            Err(EngineError::ExecutableNotFound { tried }) => {
                assert_eq!(
                    tried,
                    vec![
                        PathBuf::from("/nonexistent/engine"),
                        PathBuf::from("/also/missing/engine")
                    ]
                );
            }
            other => panic!("expected ExecutableNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_path_used() {
        let exe = env::current_exe().unwrap();
        let config = EngineConfig::new("/nonexistent/engine").with_fallback_path(&exe);
        assert_eq!(resolve_executable(&config).unwrap(), exe);
    }

    #[test]
    fn test_bare_name_detection() {
        assert!(is_bare_name(Path::new("stockfish")));
        assert!(!is_bare_name(Path::new("bin/stockfish")));
        assert!(!is_bare_name(Path::new("/usr/bin/stockfish")));
    }

    #[test]
    fn test_launch_missing_executable_spawns_nothing() {
        let config = EngineConfig::new("/nonexistent/engine");
        assert!(matches!(
            ProcessLauncher.launch(&config),
            Err(EngineError::ExecutableNotFound { .. })
        ));
    }
}
