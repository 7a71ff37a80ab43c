//! # Streaming Process Runner
//!
//! Launches one external tool at a time. Long-running tools are streamed line by line so
//! the operator sees progress as it happens; short ones are captured silently behind a
//! spinner. Either way the exit is classified the same way: a non-zero exit is an error
//! only when the tool explains it on stderr, and not even then when that explanation is
//! one of the benign "missing config" warnings these tools like to print. Nothing that
//! goes wrong in here is ever propagated as a panic or an `Err`.
//!
//! Every tool leads its own process group, so abandoning it also takes down whatever it
//! spawned (shell pipelines in particular).

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use jsearch_common::error::ToolError;
use jsearch_common::tools::Tool;
use jsearch_common::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::signal::StopSignal;
use crate::stage::StageId;

mod classify;

pub use classify::{DisplayPolicy, LineAction};

/// How long stderr may keep draining after the process itself has exited.
const STDERR_GRACE: Duration = Duration::from_secs(2);

/// Upper bound on a single tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Wait as long as the tool runs; used for long scans.
    Unbounded,
    Within(Duration),
}

impl From<Option<Duration>> for Deadline {
    fn from(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(after) => Deadline::Within(after),
            None => Deadline::Unbounded,
        }
    }
}

impl From<Duration> for Deadline {
    fn from(after: Duration) -> Self {
        Deadline::Within(after)
    }
}

/// A fully described tool invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: Tool,
    pub stage: StageId,
    pub description: String,
    program: PathBuf,
    args: Vec<OsString>,
    stdin: Option<PathBuf>,
    tee: Option<PathBuf>,
    deadline: Deadline,
}

impl Invocation {
    pub fn new(
        tool: Tool,
        stage: StageId,
        program: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tool,
            stage,
            description: description.into(),
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            tee: None,
            deadline: Deadline::Unbounded,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feeds the file at `path` to the tool's standard input.
    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    /// Copies every streamed stdout line into the file at `path`.
    pub fn tee_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.tee = Some(path.into());
        self
    }

    pub fn deadline(mut self, deadline: impl Into<Deadline>) -> Self {
        self.deadline = deadline.into();
        self
    }

    pub fn policy(&self) -> DisplayPolicy {
        DisplayPolicy::for_invocation(self.stage, self.tool)
    }

    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        if let Some(stdin) = &self.stdin {
            parts.push(format!("< {}", stdin.display()));
        }
        parts.join(" ")
    }

    fn command(&self) -> io::Result<Command> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        match &self.stdin {
            Some(path) => command.stdin(Stdio::from(std::fs::File::open(path)?)),
            None => command.stdin(Stdio::null()),
        };

        Ok(command)
    }
}

#[derive(Debug)]
pub enum RunStatus {
    Success,
    /// Non-zero exit that is not an error: either a benign warning or no stderr at all.
    /// The output is still usable.
    Warning(String),
    Failed(ToolError),
}

#[derive(Debug)]
pub struct RunOutcome {
    /// Captured stdout; always empty when the run failed.
    pub output: String,
    pub status: RunStatus,
}

impl RunOutcome {
    fn failed(error: ToolError) -> Self {
        Self {
            output: String::new(),
            status: RunStatus::Failed(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.status, RunStatus::Failed(ToolError::Unavailable { .. }))
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.status, RunStatus::Failed(ToolError::Interrupted { .. }))
    }
}

/// Runs tools one at a time, honouring the shared [`StopSignal`].
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    stop: StopSignal,
}

impl ProcessRunner {
    pub fn new(stop: StopSignal) -> Self {
        Self { stop }
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Runs the tool, handing each stdout line to `on_line` as soon as it is read.
    ///
    /// Whatever `on_line` returns is shown to the operator.
    pub async fn run_streaming<F>(&self, invocation: &Invocation, mut on_line: F) -> RunOutcome
    where
        F: FnMut(&str) -> LineAction + Send,
    {
        info!("Running: {}", invocation.description);
        debug!("$ {}", invocation.command_line());

        let outcome: RunOutcome = self.stream(invocation, &mut on_line).await;
        report(invocation, &outcome);
        outcome
    }

    /// Runs the tool silently and returns its stdout once it has exited.
    pub async fn run_capturing(&self, invocation: &Invocation) -> RunOutcome {
        info!("Running: {}", invocation.description);
        debug!("$ {}", invocation.command_line());

        let span = tracing::info_span!(
            "tool",
            indicatif.pb_show = true,
            running = %invocation.description
        );
        let outcome: RunOutcome = self.capture(invocation).instrument(span).await;
        report(invocation, &outcome);
        outcome
    }

    async fn stream<F>(&self, invocation: &Invocation, on_line: &mut F) -> RunOutcome
    where
        F: FnMut(&str) -> LineAction + Send,
    {
        let mut child: Child = match self.spawn(invocation) {
            Ok(child) => child,
            Err(outcome) => return outcome,
        };

        let mut stderr_task: JoinHandle<String> = collect_stderr(child.stderr.take());

        // Only once the tool is running, so a tool that never starts leaves no empty copy.
        let mut tee: Option<tokio::fs::File> = match &invocation.tee {
            Some(path) => match tokio::fs::File::create(path).await {
                Ok(file) => Some(file),
                Err(source) => {
                    abort(&mut child, &stderr_task).await;
                    return RunOutcome::failed(io_error(invocation, source));
                }
            },
            None => None,
        };
        let Some(stdout) = child.stdout.take() else {
            stderr_task.abort();
            let source = io::Error::other("stdout was not captured");
            return RunOutcome::failed(io_error(invocation, source));
        };

        let mut segments = BufReader::new(stdout).split(b'\n');
        let mut captured: String = String::new();
        let expiry = expire(invocation.deadline);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                segment = segments.next_segment() => match segment {
                    Ok(Some(bytes)) => {
                        let line: String = decode_line(&bytes);
                        on_line(&line).emit();
                        if let Some(file) = tee.as_mut() {
                            if let Err(source) = write_line(file, &line).await {
                                abort(&mut child, &stderr_task).await;
                                return RunOutcome::failed(io_error(invocation, source));
                            }
                        }
                        captured.push_str(&line);
                        captured.push('\n');
                    }
                    Ok(None) => break,
                    Err(source) => {
                        abort(&mut child, &stderr_task).await;
                        return RunOutcome::failed(io_error(invocation, source));
                    }
                },
                _ = &mut expiry => {
                    abort(&mut child, &stderr_task).await;
                    return RunOutcome::failed(timed_out(invocation));
                }
                _ = self.stop.triggered() => {
                    abort(&mut child, &stderr_task).await;
                    return RunOutcome::failed(interrupted(invocation));
                }
            }
        }

        if let Some(file) = tee.as_mut() {
            if let Err(source) = file.flush().await {
                abort(&mut child, &stderr_task).await;
                return RunOutcome::failed(io_error(invocation, source));
            }
        }

        let status: ExitStatus = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => status,
                Err(source) => {
                    stderr_task.abort();
                    return RunOutcome::failed(io_error(invocation, source));
                }
            },
            _ = &mut expiry => {
                abort(&mut child, &stderr_task).await;
                return RunOutcome::failed(timed_out(invocation));
            }
            _ = self.stop.triggered() => {
                abort(&mut child, &stderr_task).await;
                return RunOutcome::failed(interrupted(invocation));
            }
        };

        let stderr: String = match tokio::time::timeout(STDERR_GRACE, &mut stderr_task).await {
            Ok(Ok(stderr)) => stderr,
            _ => {
                stderr_task.abort();
                String::new()
            }
        };

        finish(invocation, status, &stderr, captured)
    }

    async fn capture(&self, invocation: &Invocation) -> RunOutcome {
        let child: Child = match self.spawn(invocation) {
            Ok(child) => child,
            Err(outcome) => return outcome,
        };

        let group: Option<u32> = child.id();

        // Losing the race drops `wait_with_output`, and with it the child, which kills it.
        // The rest of its process group has to be killed by hand.
        let result = tokio::select! {
            output = child.wait_with_output() => output,
            _ = expire(invocation.deadline) => {
                kill_group(group);
                return RunOutcome::failed(timed_out(invocation));
            }
            _ = self.stop.triggered() => {
                kill_group(group);
                return RunOutcome::failed(interrupted(invocation));
            }
        };

        match result {
            Ok(output) => {
                let stdout: String = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr: String = String::from_utf8_lossy(&output.stderr).into_owned();
                finish(invocation, output.status, &stderr, stdout)
            }
            Err(source) => RunOutcome::failed(io_error(invocation, source)),
        }
    }

    fn spawn(&self, invocation: &Invocation) -> Result<Child, RunOutcome> {
        if self.stop.is_triggered() {
            return Err(RunOutcome::failed(interrupted(invocation)));
        }

        let mut command: Command = invocation
            .command()
            .map_err(|source| RunOutcome::failed(io_error(invocation, source)))?;

        command.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                RunOutcome::failed(ToolError::Unavailable {
                    tool: invocation.tool.to_string(),
                })
            }
            _ => RunOutcome::failed(io_error(invocation, source)),
        })
    }
}

/// Checks whether `program` can be started at all by running it with `-h`.
///
/// Any exit code counts as present; a spawn failure or a hang past `timeout` does not.
pub async fn probe(program: &Path, timeout: Duration) -> bool {
    let spawned = Command::new(program)
        .arg("-h")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();

    let Ok(mut child) = spawned else {
        return false;
    };

    matches!(tokio::time::timeout(timeout, child.wait()).await, Ok(Ok(_)))
}

/// Stderr that only complains about a missing or unreadable config file.
pub fn is_benign_warning(stderr: &str) -> bool {
    let lowered: String = stderr.to_lowercase();
    lowered.contains("warning") && lowered.contains("config")
}

/// Decides what an exit means for the stage that ran the tool.
pub fn classify_exit(tool: Tool, success: bool, status: &str, stderr: &str) -> RunStatus {
    if success {
        return RunStatus::Success;
    }

    let stderr: &str = stderr.trim();
    if stderr.is_empty() {
        return RunStatus::Warning(format!("exited with {status} without an error message"));
    }
    if is_benign_warning(stderr) {
        return RunStatus::Warning(stderr.to_string());
    }

    RunStatus::Failed(ToolError::ExecutionFailed {
        tool: tool.to_string(),
        status: status.to_string(),
        stderr: stderr.to_string(),
    })
}

fn finish(invocation: &Invocation, status: ExitStatus, stderr: &str, output: String) -> RunOutcome {
    let described: String = match status.code() {
        Some(code) => format!("exit code {code}"),
        None => String::from("a signal"),
    };

    match classify_exit(invocation.tool, status.success(), &described, stderr) {
        RunStatus::Failed(error) => RunOutcome::failed(error),
        status => RunOutcome { output, status },
    }
}

fn report(invocation: &Invocation, outcome: &RunOutcome) {
    match &outcome.status {
        RunStatus::Success => debug!("{} finished", invocation.description),
        RunStatus::Warning(stderr) => {
            warn!("Warning from {}: {}", invocation.description, stderr)
        }
        RunStatus::Failed(err @ ToolError::Unavailable { .. }) => {
            warn!("Skipping {}: {}", invocation.description, err)
        }
        RunStatus::Failed(ToolError::Interrupted { .. }) => {
            warn!("{} was interrupted", invocation.description)
        }
        RunStatus::Failed(err) => error!("Error running {}: {}", invocation.description, err),
    }
}

fn collect_stderr(stderr: Option<ChildStderr>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

async fn abort(child: &mut Child, stderr_task: &JoinHandle<String>) {
    kill_group(child.id());
    let _ = child.kill().await;
    stderr_task.abort();
}

/// Kills every process in the group led by the tool with id `leader`.
#[cfg(unix)]
fn kill_group(leader: Option<u32>) {
    let Some(pid) = leader.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // ESRCH just means the whole group is already gone.
    unsafe {
        libc::killpg(pid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_leader: Option<u32>) {}

async fn expire(deadline: Deadline) {
    match deadline {
        Deadline::Within(after) => tokio::time::sleep(after).await,
        Deadline::Unbounded => std::future::pending::<()>().await,
    }
}

async fn write_line(file: &mut tokio::fs::File, line: &str) -> io::Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\r').to_string()
}

fn io_error(invocation: &Invocation, source: io::Error) -> ToolError {
    ToolError::Io {
        tool: invocation.tool.to_string(),
        source,
    }
}

fn timed_out(invocation: &Invocation) -> ToolError {
    let after: Duration = match invocation.deadline {
        Deadline::Within(after) => after,
        Deadline::Unbounded => Duration::ZERO,
    };
    ToolError::TimedOut {
        tool: invocation.tool.to_string(),
        after,
    }
}

fn interrupted(invocation: &Invocation) -> ToolError {
    ToolError::Interrupted {
        tool: invocation.tool.to_string(),
    }
}
