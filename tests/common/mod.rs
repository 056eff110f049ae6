//! In-memory UCI engine for driving `EngineClient` without a subprocess.

#![allow(dead_code)]

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use chess_bridge::engine::{EngineConfig, EngineError, EngineIo, EngineProcess, Launcher};

pub struct PipeWriter(Sender<Vec<u8>>);

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct PipeReader {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.buf.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel();
    (
        PipeWriter(tx),
        PipeReader {
            rx,
            buf: Vec::new(),
            pos: 0,
        },
    )
}

/// What the fake engine does in answer to one command
pub enum Reply {
    Line(String),
    Pause(Duration),
    Exit,
}

pub fn line(text: &str) -> Reply {
    Reply::Line(text.to_string())
}

/// Answers a well-behaved engine gives outside of searching
pub fn standard(command: &str) -> Vec<Reply> {
    match command {
        "uci" => vec![line("id name Fake"), line("id author Tests"), line("uciok")],
        "isready" => vec![line("readyok")],
        "quit" => vec![Reply::Exit],
        _ => vec![],
    }
}

type Script = dyn Fn(&str) -> Vec<Reply> + Send + Sync;

struct FakeProcess {
    exited: Arc<AtomicBool>,
    killed: Arc<AtomicBool>,
    kills: Arc<AtomicUsize>,
}

impl EngineProcess for FakeProcess {
    fn has_exited(&mut self) -> io::Result<bool> {
        Ok(self.exited.load(Ordering::SeqCst) || self.killed.load(Ordering::SeqCst))
    }

    fn kill(&mut self) -> io::Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeEngine {
    script: Arc<Script>,
    pub received: Arc<Mutex<Vec<String>>>,
    pub launches: Arc<AtomicUsize>,
    pub kills: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn new(script: impl Fn(&str) -> Vec<Reply> + Send + Sync + 'static) -> Self {
        FakeEngine {
            script: Arc::new(script),
            received: Arc::new(Mutex::new(Vec::new())),
            launches: Arc::new(AtomicUsize::new(0)),
            kills: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine that answers every search with `bestmove`, preceded by `info`
    pub fn answering(info: &'static [&'static str], best: &'static str) -> Self {
        FakeEngine::new(move |command| {
            if command.starts_with("go") {
                let mut replies: Vec<Reply> = info.iter().map(|l| line(l)).collect();
                replies.push(line(best));
                replies
            } else {
                standard(command)
            }
        })
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    pub fn saw(&self, command: &str) -> bool {
        self.received.lock().iter().any(|c| c == command)
    }
}

impl Launcher for FakeEngine {
    fn launch(&self, _config: &EngineConfig) -> Result<EngineIo, EngineError> {
        self.launches.fetch_add(1, Ordering::SeqCst);

        let (stdin_tx, stdin_rx) = pipe();
        let (mut stdout_tx, stdout_rx) = pipe();
        let exited = Arc::new(AtomicBool::new(false));
        let killed = Arc::new(AtomicBool::new(false));

        let script = Arc::clone(&self.script);
        let received = Arc::clone(&self.received);
        let thread_exited = Arc::clone(&exited);
        let thread_killed = Arc::clone(&killed);
        thread::spawn(move || {
            'commands: for command in BufReader::new(stdin_rx).lines() {
                let Ok(command) = command else { break };
                if thread_killed.load(Ordering::SeqCst) {
                    break;
                }
                received.lock().push(command.clone());
                for reply in script(&command) {
                    match reply {
                        Reply::Line(text) => {
                            if writeln!(stdout_tx, "{text}").is_err() {
                                break 'commands;
                            }
                        }
                        Reply::Pause(d) => thread::sleep(d),
                        Reply::Exit => break 'commands,
                    }
                }
            }
            thread_exited.store(true, Ordering::SeqCst);
        });

        Ok(EngineIo {
            stdin: Box::new(stdin_tx),
            stdout: Box::new(stdout_rx),
            stderr: None,
            process: Box::new(FakeProcess {
                exited,
                killed,
                kills: Arc::clone(&self.kills),
            }),
        })
    }
}

/// Short timeouts so failure paths resolve quickly
pub fn test_config() -> EngineConfig {
    EngineConfig::new("fake-engine")
        .with_handshake_timeout(Duration::from_millis(500))
        .with_safety_margin(Duration::from_millis(300))
        .with_shutdown_grace(Duration::from_millis(200))
}
