// src/engine/cycle.rs

//! One compile-then-run cycle.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::BuildConfig;
use crate::exec::{CompileJob, Compiler, ProcessRunner, RunInvocation, SIGNAL_EXIT_CODE};
use crate::fs::FileSystem;
use crate::report::Reporter;
use crate::types::CycleResult;

/// How long to wait for the executable to show up after the compiler exits.
pub const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// Performs compile and run steps through injected capabilities.
pub struct CycleRunner<C: Compiler, R: ProcessRunner> {
    compiler: C,
    runner: R,
    fs: Arc<dyn FileSystem>,
    reporter: Reporter,
    output_grace: Duration,
}

impl<C: Compiler, R: ProcessRunner> fmt::Debug for CycleRunner<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleRunner")
            .field("fs", &self.fs)
            .field("reporter", &self.reporter)
            .field("output_grace", &self.output_grace)
            .finish_non_exhaustive()
    }
}

impl<C: Compiler, R: ProcessRunner> CycleRunner<C, R> {
    pub fn new(compiler: C, runner: R, fs: Arc<dyn FileSystem>, reporter: Reporter) -> Self {
        Self {
            compiler,
            runner,
            fs,
            reporter,
            output_grace: OUTPUT_GRACE,
        }
    }

    /// Override the wait for a late executable (tests use zero).
    pub fn with_output_grace(mut self, grace: Duration) -> Self {
        self.output_grace = grace;
        self
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Run the compiler for `job`; true when it reported success.
    ///
    /// A compiler that cannot be started counts as a failed compile.
    pub async fn compile(&self, job: &CompileJob) -> bool {
        self.reporter.info(format!(
            "compiling {} -> {}",
            job.source.display(),
            job.output.display()
        ));

        match self.compiler.compile(job).await {
            Ok(success) => success,
            Err(err) => {
                error!(compiler = %job.compiler, error = %err, "compiler could not be started");
                self.reporter
                    .error(format!("could not run compiler '{}': {err}", job.compiler));
                false
            }
        }
    }

    /// Compile the tracked source, then run the produced executable.
    pub async fn run_cycle(&self, cfg: &BuildConfig) -> CycleResult {
        let result = self.run_cycle_inner(cfg).await;
        info!(source = %cfg.source_file().display(), %result, "cycle finished");
        result
    }

    async fn run_cycle_inner(&self, cfg: &BuildConfig) -> CycleResult {
        let job = CompileJob::primary(cfg);
        if !self.compile(&job).await {
            self.reporter
                .error(format!("compile error in {}", job.source.display()));
            return CycleResult::CompileFailed;
        }

        if !self.output_ready(&cfg.output_path).await {
            self.reporter.error(format!(
                "runtime error: {} was not produced by the compiler",
                cfg.output_path.display()
            ));
            return CycleResult::OutputMissing;
        }

        let invocation = RunInvocation::from_config(cfg);
        self.reporter.info(match &invocation.pipe_command {
            Some(pipe) => format!("running {} | {}", pipe, describe(&invocation)),
            None => format!("running {}", describe(&invocation)),
        });

        match self.runner.run(&invocation).await {
            Ok(outcome) => {
                if let Some(code) = outcome.pipe_exit_code.filter(|c| *c != 0) {
                    self.reporter
                        .warn(format!("pipe command exited with code {code}"));
                }
                if outcome.success() {
                    self.reporter.success(format!(
                        "{} finished successfully",
                        invocation.program.display()
                    ));
                    CycleResult::CompiledAndRan
                } else {
                    self.reporter.error(format!(
                        "runtime error: {} exited with code {}",
                        invocation.program.display(),
                        outcome.exit_code
                    ));
                    CycleResult::RunFailed(outcome.exit_code)
                }
            }
            Err(err) => {
                error!(program = %invocation.program.display(), error = %err, "program could not be started");
                self.reporter.error(format!(
                    "runtime error: could not run {}: {err}",
                    invocation.program.display()
                ));
                CycleResult::RunFailed(SIGNAL_EXIT_CODE)
            }
        }
    }

    /// The executable exists, possibly after one grace delay.
    async fn output_ready(&self, output: &Path) -> bool {
        if self.fs.is_file(output) {
            return true;
        }
        if self.output_grace.is_zero() {
            return false;
        }

        debug!(output = %output.display(), grace = ?self.output_grace, "output not visible yet; waiting");
        tokio::time::sleep(self.output_grace).await;
        self.fs.is_file(output)
    }
}

fn describe(invocation: &RunInvocation) -> String {
    let mut s = invocation.program.display().to_string();
    for arg in &invocation.args {
        s.push(' ');
        s.push_str(arg);
    }
    s
}
