// src/exec/shell.rs

//! Shell-command runnable: one OS process per attempt.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};
use crate::exec::runnable::{RunFuture, Runnable};

/// How many trailing stderr lines are kept for the failure detail.
const STDERR_TAIL_LINES: usize = 20;

/// How long a failed command's stderr reader may keep draining after exit.
const STDERR_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Runs `cmd` through `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    cmd: String,
}

impl ShellCommand {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Runnable for ShellCommand {
    fn run(&self) -> RunFuture<'_> {
        Box::pin(run_shell(&self.cmd))
    }

    fn describe(&self) -> String {
        format!("sh: {}", self.cmd)
    }
}

/// Run a single command line to completion.
///
/// stdout is logged at debug; stderr is logged at debug and its tail is kept
/// so a non-zero exit can report what went wrong.
///
/// On unix the shell leads its own process group. Whatever it forked is
/// killed with it once the shell exits, or when this future is dropped (e.g.
/// on attempt timeout).
pub(crate) async fn run_shell(cmd_line: &str) -> Result<()> {
    info!(cmd = %cmd_line, "starting process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for `{cmd_line}`"))?;
    let mut group = ProcessGroup::of(&child);

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("stdout: {}", line);
            }
        });
    }

    let tail: Arc<Mutex<VecDeque<String>>> =
        Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
    let stderr_reader = child.stderr.take().map(|stderr| {
        let tail = Arc::clone(&tail);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("stderr: {}", line);
                if let Ok(mut tail) = tail.lock() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of `{cmd_line}`"))?;
    group.kill();

    let code = status.code().unwrap_or(-1);
    info!(exit_code = code, success = status.success(), "process exited");

    if status.success() {
        return Ok(());
    }

    // Something outside the group may still hold stderr open.
    if let Some(mut reader) = stderr_reader {
        if timeout(STDERR_DRAIN_GRACE, &mut reader).await.is_err() {
            reader.abort();
        }
    }
    let stderr = match tail.lock() {
        Ok(tail) if !tail.is_empty() => {
            format!(": {}", tail.iter().cloned().collect::<Vec<_>>().join("\n"))
        }
        _ => String::new(),
    };

    Err(PipelineError::CommandFailed {
        command: cmd_line.to_string(),
        code,
        stderr,
    })
}

/// The process group led by a spawned shell. Killed on drop.
#[derive(Debug)]
struct ProcessGroup(Option<i32>);

impl ProcessGroup {
    fn of(child: &Child) -> Self {
        if cfg!(unix) {
            Self(child.id().and_then(|pid| i32::try_from(pid).ok()))
        } else {
            Self(None)
        }
    }

    /// SIGKILL every process left in the group. Idempotent.
    fn kill(&mut self) {
        let Some(pgid) = self.0.take() else {
            return;
        };
        #[cfg(unix)]
        {
            // SAFETY: killpg only sends a signal. ESRCH means the group is
            // already empty.
            if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
                debug!(pgid, "killed leftover processes of the shell's group");
            }
        }
        #[cfg(not(unix))]
        let _ = pgid;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}
