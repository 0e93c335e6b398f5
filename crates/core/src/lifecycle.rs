//! Process lifecycle management.
//!
//! The manager runs resolved command strings through the shell in one of two
//! modes. Synchronous execution spawns, waits and returns the captured
//! output in one call. Background execution tracks the spawned process under
//! its logical command ID so it can be observed and killed individually
//! while other commands run concurrently.
//!
//! Per command ID the state machine is
//! `Idle -> Spawning -> Running -> {Completed | Killed | Failed}`, where
//! `Idle` is the absence of an entry in the running set. The running set is
//! the only shared mutable state here; every insert and remove goes through
//! its mutex.

use std::collections::{HashMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, oneshot};

use crate::config::DEFAULT_SHELL;
use crate::error::{Error, Result};

/// Read size for a single output chunk.
const OUTPUT_CHUNK_SIZE: usize = 8192;

/// Capacity of the lifecycle event channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// How long a process gets to exit after SIGTERM before it is force-killed.
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Caps on the per-process accumulated output buffer. Oldest chunks are
/// evicted first; the live event stream is unaffected.
const MAX_BUFFERED_OUTPUT_BYTES: usize = 2 * 1024 * 1024;
const MAX_BUFFERED_OUTPUT_CHUNKS: usize = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl Display for OutputStream {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStream::Stdout => formatter.write_str("stdout"),
            OutputStream::Stderr => formatter.write_str("stderr"),
        }
    }
}

/// Lifecycle notification for a tracked background process.
///
/// Chunks of one stream arrive in the order the process emitted them; no
/// ordering holds between the two streams of one process or across IDs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Output {
        command_id: String,
        stream: OutputStream,
        chunk: String,
    },
    /// Terminal event. Emitted exactly once per tracked process, whether it
    /// exited on its own (`killed == false`) or was killed.
    Finished {
        command_id: String,
        exit_code: Option<i32>,
        killed: bool,
    },
}

/// Result of a synchronous execution. A non-zero exit code is a
/// command-level outcome, not a manager error.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Default)]
struct OutputBuffer {
    chunks: VecDeque<String>,
    total_bytes: usize,
}

impl OutputBuffer {
    fn push(&mut self, chunk: String) {
        self.total_bytes = self.total_bytes.saturating_add(chunk.len());
        self.chunks.push_back(chunk);

        while self.chunks.len() > MAX_BUFFERED_OUTPUT_CHUNKS
            || self.total_bytes > MAX_BUFFERED_OUTPUT_BYTES
        {
            match self.chunks.pop_front() {
                Some(removed) => {
                    self.total_bytes = self.total_bytes.saturating_sub(removed.len());
                }
                None => break,
            }
        }
    }

    fn joined(&self) -> String {
        self.chunks.iter().map(String::as_str).collect()
    }
}

struct RunningProcess {
    pid: Option<u32>,
    started_at: DateTime<Utc>,
    output: Arc<Mutex<OutputBuffer>>,
    /// Taken by the first `kill` request; the supervisor task holds the
    /// receiving end.
    kill_tx: Option<oneshot::Sender<()>>,
}

/// Spawns, tracks and terminates OS processes for logical command IDs.
///
/// Cloning is cheap; clones share the running set and the event channel.
/// All operations that spawn tasks must be called within a Tokio runtime.
#[derive(Clone)]
pub struct ProcessLifecycleManager {
    running: Arc<Mutex<HashMap<String, RunningProcess>>>,
    events: broadcast::Sender<ProcessEvent>,
}

impl ProcessLifecycleManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            running: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Subscribes to lifecycle events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessEvent> {
        self.events.subscribe()
    }

    /// Runs a resolved command to completion and captures its output.
    ///
    /// The process never enters the running set: a synchronous execution
    /// cannot be targeted for mid-flight cancellation. No timeout is
    /// enforced here; callers impose their own if they need one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the OS refuses to create the process.
    pub async fn execute_sync(
        &self,
        resolved_command: &str,
        working_directory: Option<&str>,
    ) -> Result<SyncOutcome> {
        debug!("Executing synchronously: {resolved_command}");

        let output = shell_command(resolved_command, working_directory)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(Error::Spawn)?;

        Ok(SyncOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Spawns a resolved command as a tracked background process.
    ///
    /// Returns as soon as the spawn is confirmed; output is streamed through
    /// the event channel as it arrives and a single
    /// [`ProcessEvent::Finished`] follows when the process leaves the
    /// running set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if the ID is already tracked and
    /// [`Error::Spawn`] if the OS refuses to create the process.
    pub fn execute_background(
        &self,
        command_id: &str,
        resolved_command: &str,
        working_directory: Option<&str>,
    ) -> Result<()> {
        // The spawn happens under the running-set lock so a racing call for
        // the same ID cannot slip between the check and the insert.
        let mut running = self.running.lock().expect("running set lock poisoned");

        if running.contains_key(command_id) {
            return Err(Error::AlreadyRunning(command_id.to_string()));
        }

        let mut child = shell_command(resolved_command, working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::Spawn)?;

        debug!(
            "Spawned background process for `{command_id}` (pid {:?})",
            child.id()
        );

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let output = Arc::new(Mutex::new(OutputBuffer::default()));
        let (kill_tx, kill_rx) = oneshot::channel();

        running.insert(
            command_id.to_string(),
            RunningProcess {
                pid: child.id(),
                started_at: Utc::now(),
                output: Arc::clone(&output),
                kill_tx: Some(kill_tx),
            },
        );
        drop(running);

        if let Some(stdout) = stdout {
            tokio::spawn(stream_output(
                command_id.to_string(),
                OutputStream::Stdout,
                stdout,
                Arc::clone(&output),
                self.events.clone(),
            ));
        }

        if let Some(stderr) = stderr {
            tokio::spawn(stream_output(
                command_id.to_string(),
                OutputStream::Stderr,
                stderr,
                Arc::clone(&output),
                self.events.clone(),
            ));
        }

        tokio::spawn(supervise(
            command_id.to_string(),
            child,
            kill_rx,
            Arc::clone(&self.running),
            self.events.clone(),
        ));

        Ok(())
    }

    /// Requests termination of a tracked background process.
    ///
    /// Termination is graceful first (SIGTERM), forced after a grace period.
    /// If the process exits naturally in the same instant, the supervisor
    /// still emits exactly one terminal event and removes the entry exactly
    /// once. Killing one ID never affects others.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the ID is not tracked.
    pub fn kill(&self, command_id: &str) -> Result<()> {
        let mut running = self.running.lock().expect("running set lock poisoned");

        let process = running
            .get_mut(command_id)
            .ok_or_else(|| Error::NotFound(command_id.to_string()))?;

        if let Some(kill_tx) = process.kill_tx.take() {
            debug!("Requesting kill of `{command_id}` (pid {:?})", process.pid);
            // The send only fails if the supervisor already observed the
            // natural exit; that branch emits the terminal event instead.
            let _ = kill_tx.send(());
        }

        Ok(())
    }

    /// Whether a background process is currently tracked for this ID.
    pub fn is_running(&self, command_id: &str) -> bool {
        self.running
            .lock()
            .expect("running set lock poisoned")
            .contains_key(command_id)
    }

    /// IDs of all tracked background processes, with their start times.
    pub fn running_ids(&self) -> Vec<(String, DateTime<Utc>)> {
        self.running
            .lock()
            .expect("running set lock poisoned")
            .iter()
            .map(|(command_id, process)| (command_id.clone(), process.started_at))
            .collect()
    }

    /// Accumulated (capped) output of a tracked process, or None if the ID
    /// is not tracked.
    pub fn output_snapshot(&self, command_id: &str) -> Option<String> {
        let running = self.running.lock().expect("running set lock poisoned");
        let process = running.get(command_id)?;
        let output = process.output.lock().expect("output buffer lock poisoned");
        Some(output.joined())
    }
}

impl Default for ProcessLifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

fn shell_command(resolved_command: &str, working_directory: Option<&str>) -> Command {
    let mut command = Command::new(DEFAULT_SHELL);
    command.arg("-c").arg(resolved_command);

    if let Some(working_directory) = working_directory {
        command.current_dir(working_directory);
    }

    command
}

/// Streams one pipe of a background process, chunk by chunk, until EOF.
/// Chunks go to the shared buffer and out on the event channel in read
/// order, so per-stream FIFO delivery holds.
async fn stream_output<R: AsyncRead + Unpin>(
    command_id: String,
    stream: OutputStream,
    mut reader: R,
    buffer: Arc<Mutex<OutputBuffer>>,
    events: broadcast::Sender<ProcessEvent>,
) {
    let mut bytes = [0u8; OUTPUT_CHUNK_SIZE];

    loop {
        match reader.read(&mut bytes).await {
            Ok(0) => break,
            Ok(read) => {
                let chunk = String::from_utf8_lossy(&bytes[..read]).into_owned();

                {
                    let mut buffer = buffer.lock().expect("output buffer lock poisoned");
                    buffer.push(chunk.clone());
                }

                let _ = events.send(ProcessEvent::Output {
                    command_id: command_id.clone(),
                    stream,
                    chunk,
                });
            }
            Err(error) => {
                warn!("Error reading {stream} of `{command_id}`: {error}");
                break;
            }
        }
    }
}

/// Owns the child until it leaves the running set. Whichever of natural
/// exit and kill request is observed first wins; the entry is removed and
/// the terminal event emitted exactly once either way.
async fn supervise(
    command_id: String,
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    running: Arc<Mutex<HashMap<String, RunningProcess>>>,
    events: broadcast::Sender<ProcessEvent>,
) {
    let killed;
    let exit_code;

    tokio::select! {
        status = child.wait() => {
            killed = false;
            exit_code = match status {
                Ok(status) => status.code(),
                Err(error) => {
                    warn!("Error waiting on `{command_id}`: {error}");
                    None
                }
            };
        }
        _ = kill_rx => {
            killed = true;
            exit_code = terminate(&command_id, &mut child).await;
        }
    }

    {
        let mut running = running.lock().expect("running set lock poisoned");
        running.remove(&command_id);
    }

    debug!("Process `{command_id}` finished (exit code {exit_code:?}, killed: {killed})");

    let _ = events.send(ProcessEvent::Finished {
        command_id,
        exit_code,
        killed,
    });
}

/// Graceful termination: SIGTERM, then a forced kill once the grace period
/// elapses. Returns the exit code when one is observable.
async fn terminate(command_id: &str, child: &mut Child) -> Option<i32> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Err(error) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!("SIGTERM to `{command_id}` (pid {pid}) failed: {error}");
        }

        match tokio::time::timeout(KILL_GRACE_PERIOD, child.wait()).await {
            Ok(Ok(status)) => return status.code(),
            Ok(Err(error)) => {
                warn!("Error waiting on `{command_id}` after SIGTERM: {error}");
                return None;
            }
            Err(_) => {
                debug!("`{command_id}` survived the grace period, forcing kill");
            }
        }
    }

    if let Err(error) = child.kill().await {
        warn!("Forced kill of `{command_id}` failed: {error}");
    }

    child.wait().await.ok().and_then(|status| status.code())
}
