// src/exec/runner.rs

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{anyhow, Context};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::errors::Result;

use super::{shell_command, BoxFuture, SIGNAL_EXIT_CODE};

/// How to run the compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInvocation {
    pub program: PathBuf,
    /// Separate argv entries, never joined with the program path.
    pub args: Vec<String>,
    /// Shell command whose stdout and stderr feed the program's stdin.
    pub pipe_command: Option<String>,
}

impl RunInvocation {
    pub fn from_config(cfg: &BuildConfig) -> Self {
        Self {
            program: cfg.output_path.clone(),
            args: cfg.program_argv(),
            pipe_command: cfg.pipe_command.clone(),
        }
    }
}

/// Exit codes observed for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code of the program; this is the pipeline's status.
    pub exit_code: i32,
    /// Exit code of the pipe command, when one ran.
    pub pipe_exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Capability to run the compiled program and wait for it.
pub trait ProcessRunner: Send + Sync {
    fn run<'a>(&'a self, invocation: &'a RunInvocation) -> BoxFuture<'a, Result<RunOutcome>>;
}

/// Runner that spawns real processes, inheriting the terminal's stdio.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run<'a>(&'a self, invocation: &'a RunInvocation) -> BoxFuture<'a, Result<RunOutcome>> {
        Box::pin(async move {
            match invocation.pipe_command.as_deref() {
                Some(pipe) => run_piped(invocation, pipe).await,
                None => run_direct(invocation).await,
            }
        })
    }
}

async fn run_direct(invocation: &RunInvocation) -> Result<RunOutcome> {
    debug!(program = %invocation.program.display(), args = ?invocation.args, "spawning program");

    let status = Command::new(&invocation.program)
        .args(&invocation.args)
        .kill_on_drop(true)
        .status()
        .await
        .with_context(|| format!("running {}", invocation.program.display()))?;

    let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
    info!(program = %invocation.program.display(), exit_code, "program exited");

    Ok(RunOutcome {
        exit_code,
        pipe_exit_code: None,
    })
}

/// `pipe 2>&1 | program args...`, with the pipe's stdout handed over as the
/// program's stdin.
async fn run_piped(invocation: &RunInvocation, pipe: &str) -> Result<RunOutcome> {
    debug!(
        pipe,
        program = %invocation.program.display(),
        args = ?invocation.args,
        "spawning piped program"
    );

    let mut producer = shell_command(&merge_stderr(pipe))
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning pipe command '{pipe}'"))?;

    let stdout = producer
        .stdout
        .take()
        .ok_or_else(|| anyhow!("pipe command stdout was not captured"))?;
    let stdin: Stdio = stdout
        .try_into()
        .context("handing pipe command output to the program")?;

    let mut consumer = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(stdin)
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("running {}", invocation.program.display()))?;

    let (pipe_status, status) = tokio::join!(producer.wait(), consumer.wait());
    let pipe_status = pipe_status.with_context(|| format!("waiting for pipe command '{pipe}'"))?;
    let status =
        status.with_context(|| format!("waiting for {}", invocation.program.display()))?;

    let pipe_exit_code = pipe_status.code().unwrap_or(SIGNAL_EXIT_CODE);
    if !pipe_status.success() {
        warn!(pipe, exit_code = pipe_exit_code, "pipe command exited non-zero");
    }

    let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
    info!(
        program = %invocation.program.display(),
        exit_code,
        pipe_exit_code,
        "piped program exited"
    );

    Ok(RunOutcome {
        exit_code,
        pipe_exit_code: Some(pipe_exit_code),
    })
}

fn merge_stderr(pipe: &str) -> String {
    if cfg!(windows) {
        format!("{pipe} 2>&1")
    } else {
        format!("exec 2>&1\n{pipe}")
    }
}
