//! Subprocess execution
//!
//! Runs external programs (pod preparation, tasks, after-task hooks) with
//! stdout and stderr captured into a single buffer in arrival order.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::warn;

/// A finished subprocess
#[derive(Debug)]
pub struct CapturedRun {
    pub status: ExitStatus,
    /// Combined stdout and stderr
    pub output: Vec<u8>,
    pub elapsed: Duration,
}

impl CapturedRun {
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Errors that prevent a subprocess from producing an exit status
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to collect output of {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
        output: Vec<u8>,
    },

    #[error("{program} timed out after {after:?}")]
    TimedOut {
        program: String,
        after: Duration,
        output: Vec<u8>,
    },
}

impl ProcessError {
    /// Output captured before the failure
    pub fn output(&self) -> &[u8] {
        match self {
            ProcessError::Launch { .. } => &[],
            ProcessError::Io { output, .. } => output,
            ProcessError::TimedOut { output, .. } => output,
        }
    }
}

/// Runs a command to completion, capturing combined output
///
/// With a `timeout`, an overrunning child is killed and reported as
/// [`ProcessError::TimedOut`].
pub async fn run_captured(
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<CapturedRun, ProcessError> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let started = Instant::now();
    let mut child = command.spawn().map_err(|source| ProcessError::Launch {
        program: program.clone(),
        source,
    })?;

    let sink = Mutex::new(Vec::new());
    let waited = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait_with_output(&mut child, &sink)).await,
        None => Ok(wait_with_output(&mut child, &sink).await),
    };
    let elapsed = started.elapsed();
    let output = sink.into_inner().unwrap_or_else(PoisonError::into_inner);

    match waited {
        Ok(Ok(status)) => Ok(CapturedRun {
            status,
            output,
            elapsed,
        }),
        Ok(Err(source)) => Err(ProcessError::Io {
            program,
            source,
            output,
        }),
        Err(_) => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill {} after timeout: {}", program, e);
            }
            Err(ProcessError::TimedOut {
                program,
                after: elapsed,
                output,
            })
        }
    }
}

async fn wait_with_output(child: &mut Child, sink: &Mutex<Vec<u8>>) -> io::Result<ExitStatus> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (out, err, status) = tokio::join!(pump(stdout, sink), pump(stderr, sink), child.wait());
    out?;
    err?;
    status
}

async fn pump<R: AsyncRead + Unpin>(reader: Option<R>, sink: &Mutex<Vec<u8>>) -> io::Result<()> {
    let Some(mut reader) = reader else {
        return Ok(());
    };

    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&buf[..n]);
    }
}
