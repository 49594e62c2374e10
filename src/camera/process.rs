//! Spawning, monitoring, and terminating the rpicam tool processes.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::types::CameraError;

/// How long a tool gets to exit after SIGINT before it is killed.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Stderr lines kept per process. rpicam-hello prints one line per frame.
pub const STDERR_TAIL_LINES: usize = 50;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn spawn_error(program: &str, e: std::io::Error) -> CameraError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CameraError::ToolNotFound(program.to_string())
    } else {
        CameraError::SpawnFailed {
            tool: program.to_string(),
            source: e,
        }
    }
}

/// A long-running camera tool (the preview stream).
pub struct ToolProcess {
    program: String,
    child: Child,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    stderr_thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ToolProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolProcess")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

impl ToolProcess {
    /// Spawn `program` with `args`. Stderr is forwarded to the log and the
    /// last [`STDERR_TAIL_LINES`] lines are kept.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, CameraError> {
        log::debug!("spawning {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let tag = program.to_string();
        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        let tail = Arc::clone(&stderr_tail);
        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    log::debug!("[{}] {}", tag, line);
                    if let Ok(mut tail) = tail.lock() {
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                }
            })
        });

        Ok(ToolProcess {
            program: program.to_string(),
            child,
            stderr_tail,
            stderr_thread,
        })
    }

    /// Give the process `grace` to fail on startup.
    ///
    /// A tool that exits within the grace period (camera busy, unsupported
    /// mode) becomes [`CameraError::ToolFailed`] carrying its stderr tail.
    pub fn check_startup(&mut self, grace: Duration) -> Result<(), CameraError> {
        let start = Instant::now();
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Err(CameraError::ToolFailed {
                    tool: self.program.clone(),
                    exit_code: status.code(),
                    stderr: self.stderr_tail().join("\n"),
                });
            }
            if start.elapsed() >= grace {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Check if the process is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Wait for the process to complete and return the exit status.
    pub fn wait(&mut self) -> Result<ExitStatus, CameraError> {
        Ok(self.child.wait()?)
    }

    /// Request a graceful shutdown.
    ///
    /// Sends SIGINT and waits; the process is killed if it is still alive
    /// after [`SHUTDOWN_TIMEOUT`].
    pub fn shutdown(&mut self) -> Result<ExitStatus, CameraError> {
        if let Ok(Some(status)) = self.child.try_wait() {
            return Ok(status);
        }

        #[cfg(unix)]
        {
            // SAFETY: the pid belongs to a child we still own and have not reaped.
            unsafe {
                libc::kill(self.child.id() as libc::pid_t, libc::SIGINT);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = self.child.kill();
        }

        let start = Instant::now();
        loop {
            match self.child.try_wait()? {
                Some(status) => return Ok(status),
                None if start.elapsed() > SHUTDOWN_TIMEOUT => {
                    log::warn!("{} ignored SIGINT, killing it", self.program);
                    let _ = self.child.kill();
                    return Ok(self.child.wait()?);
                }
                None => thread::sleep(Duration::from_millis(50)),
            }
        }
    }

    /// The last stderr lines, oldest first. Complete once the process has exited.
    pub fn stderr_tail(&mut self) -> Vec<String> {
        if !self.is_running() {
            if let Some(handle) = self.stderr_thread.take() {
                let _ = handle.join();
            }
        }
        self.stderr_tail
            .lock()
            .map(|tail| tail.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Drop for ToolProcess {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.shutdown();
        }
    }
}

/// Run a one-shot tool to completion and return its stdout.
///
/// A non-zero exit becomes [`CameraError::ToolFailed`] carrying stderr.
pub fn run_tool(program: &str, args: &[String]) -> Result<String, CameraError> {
    log::debug!("running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(program, e))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        log::debug!("[{}] {}", program, line);
    }

    if !output.status.success() {
        return Err(CameraError::ToolFailed {
            tool: program.to_string(),
            exit_code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
