//! Subprocess execution under a deadline
//!
//! External tools can hang (a wedged device, an engine stuck on a huge
//! trace). [`run_with_deadline`] never waits past its timeout: the child is
//! killed and reaped, and the caller gets [`ProcessError::TimedOut`].

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of a finished process
#[derive(Debug)]
pub struct ProcessOutput {
    /// Exit status
    pub status: ExitStatus,
    /// Everything written to stdout
    pub stdout: Vec<u8>,
    /// Everything written to stderr
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// Stderr as lossy UTF-8, trimmed
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Why a process could not produce output
#[derive(Debug)]
pub enum ProcessError {
    /// The program could not be started
    Spawn(std::io::Error),
    /// The deadline passed; the child was killed
    TimedOut,
    /// Waiting on or talking to the child failed
    Io(std::io::Error),
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::Spawn(e) => write!(f, "failed to start: {}", e),
            ProcessError::TimedOut => f.write_str("timed out"),
            ProcessError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

/// Run `cmd` to completion, feeding `stdin`, killing it after `timeout`
///
/// Stdout and stderr are drained on helper threads so a chatty child cannot
/// block on a full pipe.
pub fn run_with_deadline(
    cmd: &mut Command,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(ProcessError::Spawn)?;

    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => Some(thread::spawn(move || {
            // the child may exit without reading all of it
            let _ = pipe.write_all(&input);
        })),
        _ => None,
    };
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::TimedOut);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::Io(e));
            }
        }
    };

    if let Some(w) = writer {
        let _ = w.join();
    }
    let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
    let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
    })
}
