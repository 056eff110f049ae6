//! Background threads that drain the engine's output pipes.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

/// What the stdout reader hands to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// One line of output, without its terminator
    Line(String),
    /// End of stream or read error; nothing follows
    Closed,
}

/// Spawn the thread that turns stdout into [`ReaderEvent`]s.
///
/// The thread exits after sending `Closed`, or as soon as the receiving
/// side is dropped.
pub fn spawn_line_reader(
    stdout: Box<dyn Read + Send>,
    events: Sender<ReaderEvent>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("engine-stdout".into())
        .spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut buf = String::new();
            loop {
                buf.clear();
                match reader.read_line(&mut buf) {
                    Ok(0) => {
                        debug!("engine stdout reached end of stream");
                        break;
                    }
                    Ok(_) => {
                        let line = buf.trim_end_matches(['\r', '\n']);
                        debug!("<< {line}");
                        if events.send(ReaderEvent::Line(line.to_string())).is_err() {
                            return;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        warn!("engine stdout read failed: {e}");
                        break;
                    }
                }
            }
            let _ = events.send(ReaderEvent::Closed);
        })
}

/// Spawn the thread that forwards stderr to the log.
pub fn spawn_stderr_forwarder(stderr: Box<dyn Read + Send>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("engine-stderr".into())
        .spawn(move || {
            for line in BufReader::new(stderr).lines() {
                match line {
                    Ok(line) => debug!("engine stderr: {line}"),
                    Err(_) => break,
                }
            }
        })
}
