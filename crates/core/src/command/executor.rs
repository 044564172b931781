//! Running tool commands
//!
//! [`CommandExecutor`] is the seam between the runner and the outside world.
//! [`ProcessExecutor`] spawns real processes; tests hand the runner a closure
//! instead.

use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::ToolCommand;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to wait for the pipes to close after killing a timed-out child.
/// Grandchildren that inherited the pipes can keep them open indefinitely.
const KILL_GRACE: Duration = Duration::from_millis(250);

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal or never ran
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Exit code 0 with the given stdout
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::new(exit_code, "", stderr)
    }

    /// Output standing in for a command that could not be run to completion.
    ///
    /// Whatever a timed-out command printed is kept, with the error appended
    /// to stderr.
    pub fn from_error(error: &Error) -> Self {
        let (stdout, stderr) = match error {
            Error::Timeout { stdout, stderr, .. } => (stdout.clone(), stderr.trim_end()),
            _ => (String::new(), ""),
        };
        let stderr = if stderr.is_empty() {
            error.to_string()
        } else {
            format!("{stderr}\n{error}")
        };

        Self {
            exit_code: None,
            stdout,
            stderr,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr
    pub fn combined(&self) -> String {
        match (self.stdout.trim_end().is_empty(), self.stderr.trim_end().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.trim_end().to_string(),
            (true, _) => self.stderr.trim_end().to_string(),
        }
    }

    fn from_parts(status: ExitStatus, stdout: String, stderr: String) -> Self {
        Self {
            exit_code: status.code(),
            stdout,
            stderr,
        }
    }
}

/// Capability to run a [`ToolCommand`] to completion
pub trait CommandExecutor: Send + Sync {
    /// Run the command and capture its output.
    ///
    /// A non-zero exit is a normal `Ok` result; `Err` means the command could
    /// not be run or did not finish.
    fn execute(&self, command: &ToolCommand) -> Result<CommandOutput>;
}

impl<F> CommandExecutor for F
where
    F: Fn(&ToolCommand) -> Result<CommandOutput> + Send + Sync,
{
    fn execute(&self, command: &ToolCommand) -> Result<CommandOutput> {
        self(command)
    }
}

/// Executor that spawns the tool as a child process
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, command: &ToolCommand) -> Result<CommandOutput> {
        let shell_cmd = command.to_shell_command();
        debug!("Spawning: {} in {:?}", shell_cmd, command.working_dir());

        let mut child = command
            .to_process()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::SpawnError {
                program: command.program.clone(),
                source,
            })?;

        // Drain both pipes on their own threads so a chatty child never
        // blocks on a full pipe while we wait on it.
        let stdout = Captured::spawn(child.stdout.take());
        let stderr = Captured::spawn(child.stderr.take());

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        warn!("Killing `{}` after {:?}", shell_cmd, timeout);
                        child.kill().ok();
                        child.wait().ok();
                        return Err(Error::Timeout {
                            command: shell_cmd,
                            timeout,
                            stdout: stdout.snapshot(KILL_GRACE),
                            stderr: stderr.snapshot(KILL_GRACE),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stdout = stdout.finish();
        let stderr = stderr.finish();
        debug!("`{}` exited with {:?}", shell_cmd, status.code());

        Ok(CommandOutput::from_parts(status, stdout, stderr))
    }
}

/// Bytes read so far from one of the child's pipes
struct Captured {
    buf: Arc<Mutex<Vec<u8>>>,
    reader: thread::JoinHandle<()>,
}

impl Captured {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: Read + Send + 'static,
    {
        let buf: Arc<Mutex<Vec<u8>>> = Arc::default();
        let sink = Arc::clone(&buf);
        let reader = thread::spawn(move || {
            let Some(mut pipe) = pipe else {
                return;
            };
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });

        Self { buf, reader }
    }

    /// Everything the child wrote, once the pipe has closed
    fn finish(self) -> String {
        let Self { buf, reader } = self;
        reader.join().ok();
        let buf = buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// What has arrived so far, waiting at most `grace` for the pipe to close
    fn snapshot(self, grace: Duration) -> String {
        let deadline = Instant::now() + grace;
        while !self.reader.is_finished() && Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
        }
        self.text()
    }

    fn text(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
