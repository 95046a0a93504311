use std::{path::PathBuf, process::Stdio, time::Duration};

use relay_model::TaskPayload;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    process::Child,
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::{
    error::ExecError,
    util::{cmd_program, kill_graceful},
};

/// How to launch the worker.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Time between SIGTERM and SIGKILL on shutdown.
    pub shutdown_grace_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            shutdown_grace_ms: 5_000,
        }
    }
}

impl WorkerConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// A running worker child process.
///
/// The payload goes to stdin as one JSON line, written in the background; every
/// non-blank stdout line becomes a message on the channel. The channel closes when
/// stdout does.
pub struct WorkerProcess {
    child: Child,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    cancel: CancellationToken,
    grace: Duration,
}

impl WorkerProcess {
    pub async fn spawn(
        cfg: &WorkerConfig,
        payload: &TaskPayload,
        tx: mpsc::Sender<String>,
    ) -> Result<Self, ExecError> {
        if cfg.program.trim().is_empty() {
            return Err(ExecError::MissingProgram);
        }
        let line = payload.to_line()?;

        let mut cmd = cmd_program(&cfg.program, &cfg.args);
        if let Some(cwd) = &cfg.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &cfg.env {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        trace!(target: "relay.exec.proc", program = %cfg.program, args = ?cfg.args, "spawn");
        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", cfg.program)))?;

        let stdin = child.stdin.take().ok_or(ExecError::NotPiped("stdin"))?;
        let stdout = child.stdout.take().ok_or(ExecError::NotPiped("stdout"))?;

        let cancel = CancellationToken::new();
        let reader = tokio::spawn(forward_lines(stdout, tx, cancel.clone()));
        // The worker may never read stdin; the session loop must not wait on it.
        let writer = tokio::spawn(deliver_payload(stdin, line, cancel.clone()));
        debug!(target: "relay.exec.proc", pid = ?child.id(), "worker spawned");

        Ok(Self {
            child,
            reader,
            writer,
            cancel,
            grace: Duration::from_millis(cfg.shutdown_grace_ms),
        })
    }

    #[inline]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Stops the stdout reader and terminates the worker if it is still running.
    pub async fn shutdown(mut self) -> Result<(), ExecError> {
        self.cancel.cancel();
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!(target: "relay.exec.proc", %status, "worker already exited");
        } else {
            debug!(target: "relay.exec.proc", "terminating worker");
            kill_graceful(&mut self.child, self.grace).await?;
        }
        for (name, task) in [("stdout reader", self.reader), ("payload writer", self.writer)] {
            if let Err(e) = task.await {
                warn!(target: "relay.exec.proc", error = %e, "{name} did not finish cleanly");
            }
        }
        Ok(())
    }
}

async fn deliver_payload<W>(mut stdin: W, line: String, cancel: CancellationToken)
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.shutdown().await
    };
    tokio::select! {
        _ = cancel.cancelled() => {
            debug!(target: "relay.exec.proc", "payload write abandoned on shutdown");
        }
        res = write => match res {
            Ok(()) => debug!(target: "relay.exec.proc", bytes = line.len(), "payload delivered to worker"),
            // Worker closed stdin without reading it.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                warn!(target: "relay.exec.proc", "worker did not read its payload");
            }
            Err(e) => error!(target: "relay.exec.proc", error = %e, "failed to write payload to worker"),
        }
    }
    // stdin is dropped here, closing the pipe.
}

async fn forward_lines<R>(stdout: R, tx: mpsc::Sender<String>, cancel: CancellationToken)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    trace!(target: "relay.exec.proc.out", %line);
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!(target: "relay.exec.proc", "worker stdout closed");
                    break;
                }
                Err(e) => {
                    warn!(target: "relay.exec.proc", error = %e, "failed to read worker stdout");
                    break;
                }
            }
        }
    }
}
