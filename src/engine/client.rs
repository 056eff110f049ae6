//! The engine client: one engine process driven over its standard streams.
//!
//! Commands are written from the caller's thread; a reader thread owns
//! stdout and turns it into [`ReaderEvent`]s; each search runs on its own
//! worker thread, which consumes those events until `bestmove` or its
//! deadline and then invokes the caller's continuation exactly once.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use parking_lot::Mutex;

use super::reader::{spawn_line_reader, spawn_stderr_forwarder, ReaderEvent};
use super::result::{EngineResult, SearchFailure, SearchHandle};
use super::transport::{EngineIo, EngineProcess, Launcher, ProcessLauncher};
use super::{EngineConfig, EngineError, EngineState};
use crate::sync::{Completion, StopFlag};
use crate::uci::{EngineCommand, EngineLine};

/// Longest a search worker blocks before re-checking cancellation
const POLL_SLICE: Duration = Duration::from_millis(50);
const EXIT_POLL: Duration = Duration::from_millis(10);
const READER_JOIN_WAIT: Duration = Duration::from_millis(200);

struct CommandWriter {
    inner: Box<dyn Write + Send>,
}

impl CommandWriter {
    fn send(&mut self, command: &EngineCommand) -> io::Result<()> {
        debug!(">> {command}");
        writeln!(self.inner, "{command}")?;
        self.inner.flush()
    }
}

/// Client state visible to search workers.
///
/// `generation` changes whenever a process is started or torn down, so a
/// worker that outlives its process cannot overwrite the new state.
#[derive(Debug)]
struct Shared {
    state: EngineState,
    generation: u64,
}

/// Everything tied to one running process.
struct Session {
    writer: Arc<Mutex<CommandWriter>>,
    events: Arc<Mutex<Receiver<ReaderEvent>>>,
    process: Box<dyn EngineProcess>,
    reader: Option<JoinHandle<()>>,
    cancel: StopFlag,
    bestmove_owed: Arc<AtomicBool>,
}

impl Session {
    fn send(&self, command: &EngineCommand) -> io::Result<()> {
        self.writer.lock().send(command)
    }

    fn close(self, grace: Duration) {
        let Session {
            writer,
            events,
            mut process,
            reader,
            cancel,
            ..
        } = self;

        cancel.stop();
        if let Err(e) = writer.lock().send(&EngineCommand::Quit) {
            debug!("quit not delivered: {e}");
        }

        let deadline = Instant::now() + grace;
        loop {
            match process.has_exited() {
                Ok(true) => {
                    debug!("engine process exited");
                    break;
                }
                Ok(false) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
                Ok(false) => {
                    warn!("engine ignored quit for {grace:?}, killing it");
                    if let Err(e) = process.kill() {
                        warn!("failed to kill engine: {e}");
                    }
                    break;
                }
                Err(e) => {
                    warn!("could not query engine process: {e}");
                    let _ = process.kill();
                    break;
                }
            }
        }

        // Closes stdin unless a worker still holds a clone
        drop(writer);
        drop(events);

        if let Some(reader) = reader {
            let waited = Instant::now();
            while !reader.is_finished() && waited.elapsed() < READER_JOIN_WAIT {
                thread::sleep(EXIT_POLL);
            }
            if reader.is_finished() {
                let _ = reader.join();
            } else {
                debug!("engine stdout reader still blocked, detaching it");
            }
        }
    }
}

/// Write `command` and, if it has an acknowledgement, wait for it.
///
/// Lines seen before the acknowledgement go to `observe`.
fn send_and_await(
    writer: &Mutex<CommandWriter>,
    events: &Receiver<ReaderEvent>,
    command: &EngineCommand,
    timeout: Duration,
    mut observe: impl FnMut(EngineLine),
) -> Result<(), EngineError> {
    writer.lock().send(command)?;
    let Some(expected) = command.expected_reply() else {
        return Ok(());
    };

    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(ReaderEvent::Line(line)) => {
                let parsed = EngineLine::parse(&line);
                if acknowledges(&parsed, expected) {
                    return Ok(());
                }
                observe(parsed);
            }
            Ok(ReaderEvent::Closed) | Err(RecvTimeoutError::Disconnected) => {
                return Err(EngineError::StreamClosed)
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(EngineError::HandshakeTimeout { expected })
            }
        }
    }
}

fn acknowledges(line: &EngineLine, expected: &str) -> bool {
    matches!(
        (line, expected),
        (EngineLine::UciOk, "uciok") | (EngineLine::ReadyOk, "readyok")
    )
}

/// Send `isready` and consume output until `readyok` has arrived and, when
/// `bestmove_owed` is set, the `bestmove` of the abandoned search too.
///
/// Engines answer `isready` at once even mid-search, so `readyok` alone says
/// nothing about where the stopped search's `bestmove` falls.
fn resynchronize(
    writer: &Mutex<CommandWriter>,
    events: &Receiver<ReaderEvent>,
    bestmove_owed: bool,
    timeout: Duration,
) -> Result<(), EngineError> {
    writer.lock().send(&EngineCommand::IsReady)?;

    let deadline = Instant::now() + timeout;
    let mut ready = false;
    let mut owed = bestmove_owed;
    while !ready || owed {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(ReaderEvent::Line(line)) => match EngineLine::parse(&line) {
                EngineLine::ReadyOk => ready = true,
                EngineLine::BestMove { best, .. } if owed => {
                    debug!("discarding bestmove {best} of abandoned search");
                    owed = false;
                }
                other => debug!("discarding stale engine output: {other:?}"),
            },
            Ok(ReaderEvent::Closed) | Err(RecvTimeoutError::Disconnected) => {
                return Err(EngineError::StreamClosed)
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(EngineError::HandshakeTimeout {
                    expected: if ready { "bestmove" } else { "readyok" },
                })
            }
        }
    }
    Ok(())
}

/// One best-move request, run on its own thread.
struct SearchJob {
    position: String,
    budget_ms: u64,
    deadline: Instant,
    resync_timeout: Duration,
    resync_first: bool,
    writer: Arc<Mutex<CommandWriter>>,
    events: Arc<Mutex<Receiver<ReaderEvent>>>,
    cancel: StopFlag,
    bestmove_owed: Arc<AtomicBool>,
}

impl SearchJob {
    /// Returns the result and the state the client should move to.
    fn run(self) -> (EngineResult, EngineState) {
        let events = self.events.lock();

        if self.resync_first {
            if let Err(failed) = self.resync(&events) {
                return failed;
            }
        }

        let sent = self
            .send(&EngineCommand::Position(self.position.clone()))
            .and_then(|()| self.send(&EngineCommand::GoMoveTime(self.budget_ms)));
        if let Err(e) = sent {
            error!("failed to send search request: {e}");
            return (
                EngineResult::failed(SearchFailure::WriteFailed),
                EngineState::Faulted,
            );
        }

        let mut score = None;
        let mut depth = None;
        loop {
            if self.cancel.is_stopped() {
                return (
                    EngineResult::failed(SearchFailure::Cancelled),
                    EngineState::Ready,
                );
            }
            let now = Instant::now();
            if now >= self.deadline {
                warn!(
                    "no bestmove within {}ms plus margin, stopping search",
                    self.budget_ms
                );
                if let Err(e) = self.send(&EngineCommand::Stop) {
                    warn!("failed to send stop: {e}");
                }
                self.bestmove_owed.store(true, Ordering::Release);
                return (
                    EngineResult::failed(SearchFailure::TimedOut),
                    EngineState::Ready,
                );
            }

            match events.recv_timeout((self.deadline - now).min(POLL_SLICE)) {
                Ok(ReaderEvent::Line(line)) => match EngineLine::parse(&line) {
                    EngineLine::Info {
                        depth: reached,
                        score: latest,
                    } => {
                        depth = reached.or(depth);
                        score = latest.or(score);
                    }
                    EngineLine::BestMove { best, ponder } => {
                        debug!("bestmove {best} at depth {depth:?} (score {score:?})");
                        return (
                            EngineResult::found(best, ponder, score),
                            EngineState::Ready,
                        );
                    }
                    _ => {}
                },
                Ok(ReaderEvent::Closed) | Err(RecvTimeoutError::Disconnected) => {
                    error!("engine output closed during search");
                    return (
                        EngineResult::failed(SearchFailure::EngineExited),
                        EngineState::Faulted,
                    );
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    /// Drain the answer to an abandoned search before starting a new one.
    fn resync(
        &self,
        events: &Receiver<ReaderEvent>,
    ) -> Result<(), (EngineResult, EngineState)> {
        debug!("resynchronizing with engine after a timed out search");
        let timeout = self
            .resync_timeout
            .min(self.deadline.saturating_duration_since(Instant::now()));
        match resynchronize(&self.writer, events, true, timeout) {
            Ok(()) => {
                self.bestmove_owed.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                error!("engine did not resynchronize: {e}");
                let reason = match e {
                    EngineError::StreamClosed => SearchFailure::EngineExited,
                    EngineError::Io(_) => SearchFailure::WriteFailed,
                    _ => SearchFailure::ResyncFailed,
                };
                Err((EngineResult::failed(reason), EngineState::Faulted))
            }
        }
    }

    fn send(&self, command: &EngineCommand) -> io::Result<()> {
        self.writer.lock().send(command)
    }
}

/// Client for one external UCI engine process.
///
/// Owns the process for its whole life: [`initialize`](Self::initialize)
/// launches and handshakes, [`request_best_move`](Self::request_best_move)
/// runs searches one at a time, and [`shutdown`](Self::shutdown) (also run
/// on drop) tears everything down.
pub struct EngineClient {
    config: EngineConfig,
    launcher: Box<dyn Launcher>,
    shared: Arc<Mutex<Shared>>,
    session: Option<Session>,
    engine_name: Option<String>,
    engine_author: Option<String>,
}

impl EngineClient {
    /// Client that launches `config.executable` as a child process
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_launcher(config, ProcessLauncher)
    }

    #[must_use]
    pub fn with_launcher(config: EngineConfig, launcher: impl Launcher + 'static) -> Self {
        EngineClient {
            config,
            launcher: Box::new(launcher),
            shared: Arc::new(Mutex::new(Shared {
                state: EngineState::Uninitialized,
                generation: 0,
            })),
            session: None,
            engine_name: None,
            engine_author: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.lock().state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name from the engine's `id name` line
    #[must_use]
    pub fn engine_name(&self) -> Option<&str> {
        self.engine_name.as_deref()
    }

    #[must_use]
    pub fn engine_author(&self) -> Option<&str> {
        self.engine_author.as_deref()
    }

    fn set_state(&self, state: EngineState) {
        self.shared.lock().state = state;
    }

    /// Move to `state` and invalidate every worker of the previous process
    fn start_generation(&self, state: EngineState) {
        let mut shared = self.shared.lock();
        shared.generation = shared.generation.wrapping_add(1);
        shared.state = state;
    }

    /// Launch the engine and complete the handshake.
    ///
    /// Any process already running is shut down first. On failure the
    /// process (if one started) is killed and the client is `Faulted`.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.session.is_some() {
            self.shutdown();
        }
        self.engine_name = None;
        self.engine_author = None;
        self.start_generation(EngineState::Launching);
        info!("starting engine {}", self.config.executable.display());

        match self.launch_and_handshake() {
            Ok(()) => {
                self.set_state(EngineState::Ready);
                info!(
                    "engine ready: {}",
                    self.engine_name.as_deref().unwrap_or("unnamed engine")
                );
                Ok(())
            }
            Err(e) => {
                error!("engine initialization failed: {e}");
                if let Some(session) = self.session.take() {
                    session.close(Duration::ZERO);
                }
                self.set_state(EngineState::Faulted);
                Err(e)
            }
        }
    }

    fn launch_and_handshake(&mut self) -> Result<(), EngineError> {
        let EngineIo {
            stdin,
            stdout,
            stderr,
            mut process,
        } = self.launcher.launch(&self.config)?;

        let (tx, rx) = mpsc::channel();
        let reader = match spawn_line_reader(stdout, tx) {
            Ok(handle) => handle,
            Err(e) => {
                let _ = process.kill();
                return Err(EngineError::Spawn(e));
            }
        };
        if let Some(stderr) = stderr {
            if let Err(e) = spawn_stderr_forwarder(stderr) {
                warn!("engine stderr will not be logged: {e}");
            }
        }

        self.session = Some(Session {
            writer: Arc::new(Mutex::new(CommandWriter { inner: stdin })),
            events: Arc::new(Mutex::new(rx)),
            process,
            reader: Some(reader),
            cancel: StopFlag::new(),
            bestmove_owed: Arc::new(AtomicBool::new(false)),
        });
        self.set_state(EngineState::Handshaking);
        self.handshake()
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        let timeout = self.config.handshake_timeout();
        let session = self
            .session
            .as_ref()
            .ok_or(EngineError::NotReady(EngineState::Uninitialized))?;

        let mut name = None;
        let mut author = None;
        {
            let events = session.events.lock();
            send_and_await(
                &session.writer,
                &events,
                &EngineCommand::Uci,
                timeout,
                |line| match line {
                    EngineLine::IdName(n) => name = Some(n),
                    EngineLine::IdAuthor(a) => author = Some(a),
                    _ => {}
                },
            )?;
            for command in self.config.option_commands() {
                session.send(&command)?;
            }
            send_and_await(
                &session.writer,
                &events,
                &EngineCommand::IsReady,
                timeout,
                |_| {},
            )?;
        }

        self.engine_name = name;
        self.engine_author = author;
        Ok(())
    }

    /// Ask the engine for its best move in `position` within `budget_ms`.
    ///
    /// Returns at once. `on_complete` runs exactly once on a worker thread
    /// with the result, after the client is back to `Ready` (or `Faulted`).
    /// On `Err` nothing was sent and `on_complete` is never called.
    pub fn request_best_move<F>(
        &mut self,
        position: &str,
        budget_ms: u64,
        on_complete: F,
    ) -> Result<SearchHandle, EngineError>
    where
        F: FnOnce(EngineResult) + Send + 'static,
    {
        let mut shared = self.shared.lock();
        match shared.state {
            EngineState::Ready => {}
            EngineState::Searching => return Err(EngineError::Busy),
            other => return Err(EngineError::NotReady(other)),
        }
        let Some(session) = self.session.as_mut() else {
            return Err(EngineError::NotReady(shared.state));
        };
        if matches!(session.process.has_exited(), Ok(true)) {
            error!("engine process exited while idle");
            shared.state = EngineState::Faulted;
            return Err(EngineError::NotReady(EngineState::Faulted));
        }
        shared.state = EngineState::Searching;
        let generation = shared.generation;
        drop(shared);

        let job = SearchJob {
            position: position.to_string(),
            budget_ms,
            deadline: Instant::now() + self.config.request_timeout(budget_ms),
            resync_timeout: self.config.handshake_timeout(),
            resync_first: session.bestmove_owed.load(Ordering::Acquire),
            writer: Arc::clone(&session.writer),
            events: Arc::clone(&session.events),
            cancel: session.cancel.clone(),
            bestmove_owed: Arc::clone(&session.bestmove_owed),
        };
        debug!("requesting best move within {budget_ms}ms for {position}");

        let slot = Completion::new();
        let handle = SearchHandle::new(slot.clone());
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("engine-search".into())
            .spawn(move || {
                let (result, next) = job.run();
                {
                    let mut shared = shared.lock();
                    if shared.generation == generation && shared.state == EngineState::Searching {
                        shared.state = next;
                    }
                }
                slot.complete(result.clone());
                on_complete(result);
            });

        match spawned {
            Ok(_) => Ok(handle),
            Err(e) => {
                self.set_state(EngineState::Ready);
                Err(EngineError::Io(e))
            }
        }
    }

    /// [`request_best_move`](Self::request_best_move) with the configured
    /// search budget
    pub fn request_default<F>(
        &mut self,
        position: &str,
        on_complete: F,
    ) -> Result<SearchHandle, EngineError>
    where
        F: FnOnce(EngineResult) + Send + 'static,
    {
        let budget = self.config.search_budget_ms;
        self.request_best_move(position, budget, on_complete)
    }

    /// Tell the engine a new game starts and wait until it has caught up.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        let state = self.state();
        if state != EngineState::Ready {
            return Err(if state == EngineState::Searching {
                EngineError::Busy
            } else {
                EngineError::NotReady(state)
            });
        }
        let session = self
            .session
            .as_ref()
            .ok_or(EngineError::NotReady(state))?;

        let outcome = session
            .send(&EngineCommand::UciNewGame)
            .map_err(EngineError::from)
            .and_then(|()| {
                let events = session.events.lock();
                resynchronize(
                    &session.writer,
                    &events,
                    session.bestmove_owed.load(Ordering::Acquire),
                    self.config.handshake_timeout(),
                )
            });

        match outcome {
            Ok(()) => {
                session.bestmove_owed.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                error!("engine failed to start a new game: {e}");
                self.set_state(EngineState::Faulted);
                Err(e)
            }
        }
    }

    /// Shut down and start a fresh process with the same configuration.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        info!("restarting engine");
        self.shutdown();
        self.initialize()
    }

    /// Ask the engine to quit, kill it if it does not, and release the
    /// pipes. Any in-flight search resolves as failed. Safe to call any
    /// number of times.
    pub fn shutdown(&mut self) {
        self.start_generation(EngineState::Uninitialized);
        if let Some(session) = self.session.take() {
            info!("shutting down engine");
            session.close(self.config.shutdown_grace());
        }
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("executable", &self.config.executable)
            .field("state", &self.state())
            .field("engine_name", &self.engine_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoLauncher;

    impl Launcher for NoLauncher {
        fn launch(&self, config: &EngineConfig) -> Result<EngineIo, EngineError> {
            Err(EngineError::ExecutableNotFound {
                tried: vec![config.executable.clone()],
            })
        }
    }

    #[test]
    fn test_request_before_initialize() {
        let mut client = EngineClient::with_launcher(EngineConfig::default(), NoLauncher);
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let err = client
            .request_best_move("8/8/8/8/8/8/8/8 w - - 0 1", 100, move |_| {
                flag.store(true, Ordering::SeqCst)
            })
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotReady(EngineState::Uninitialized)
        ));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_failed_launch_faults() {
        let mut client = EngineClient::with_launcher(EngineConfig::default(), NoLauncher);
        assert!(matches!(
            client.initialize(),
            Err(EngineError::ExecutableNotFound { .. })
        ));
        assert_eq!(client.state(), EngineState::Faulted);
        assert!(matches!(
            client.request_default("8/8/8/8/8/8/8/8 w - - 0 1", |_| {}),
            Err(EngineError::NotReady(EngineState::Faulted))
        ));
    }

    #[test]
    fn test_shutdown_without_process() {
        let mut client = EngineClient::with_launcher(EngineConfig::default(), NoLauncher);
        client.shutdown();
        client.shutdown();
        assert_eq!(client.state(), EngineState::Uninitialized);
    }

    fn sink_writer() -> Mutex<CommandWriter> {
        Mutex::new(CommandWriter {
            inner: Box::new(io::sink()),
        })
    }

    #[test]
    fn test_resync_waits_for_bestmove_after_readyok() {
        let (tx, rx) = mpsc::channel();
        for line in ["readyok", "info depth 9 score cp 3", "bestmove a2a3", "bestmove e2e4"] {
            tx.send(ReaderEvent::Line(line.into())).unwrap();
        }
        resynchronize(&sink_writer(), &rx, true, Duration::from_millis(100)).unwrap();
        assert_eq!(rx.try_recv(), Ok(ReaderEvent::Line("bestmove e2e4".into())));
    }

    #[test]
    fn test_resync_without_owed_bestmove_stops_at_readyok() {
        let (tx, rx) = mpsc::channel();
        tx.send(ReaderEvent::Line("readyok".into())).unwrap();
        tx.send(ReaderEvent::Line("bestmove e2e4".into())).unwrap();
        resynchronize(&sink_writer(), &rx, false, Duration::from_millis(100)).unwrap();
        assert_eq!(rx.try_recv(), Ok(ReaderEvent::Line("bestmove e2e4".into())));
    }

    #[test]
    fn test_resync_times_out_without_bestmove() {
        let (tx, rx) = mpsc::channel();
        tx.send(ReaderEvent::Line("readyok".into())).unwrap();
        assert!(matches!(
            resynchronize(&sink_writer(), &rx, true, Duration::from_millis(50)),
            Err(EngineError::HandshakeTimeout {
                expected: "bestmove"
            })
        ));
        drop(tx);
    }

    #[test]
    fn test_acknowledgement_matching() {
        assert!(acknowledges(&EngineLine::UciOk, "uciok"));
        assert!(acknowledges(&EngineLine::ReadyOk, "readyok"));
        assert!(!acknowledges(&EngineLine::ReadyOk, "uciok"));
        assert!(!acknowledges(&EngineLine::Other("uciok?".into()), "uciok"));
    }
}
