use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use compwatch::errors::{CompwatchError, Result};
use compwatch::exec::{BoxFuture, CompileJob, Compiler, ProcessRunner, RunInvocation, RunOutcome};
use compwatch::fs::mock::MockFileSystem;

/// What the fake compiler does for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileBehaviour {
    /// Report success and create the output file.
    Succeed,
    /// Report failure.
    Fail,
    /// Report success without producing anything.
    SucceedWithoutOutput,
    /// Fail to start, like a compiler that is not installed.
    Unavailable,
}

/// A fake compiler that:
/// - records every job it was given
/// - "produces" outputs by adding them to a shared `MockFileSystem`.
///
/// Clones share state, so tests keep one clone for assertions.
#[derive(Debug, Clone)]
pub struct FakeCompiler {
    fs: MockFileSystem,
    behaviour: Arc<Mutex<CompileBehaviour>>,
    failing_sources: Arc<Mutex<HashSet<PathBuf>>>,
    jobs: Arc<Mutex<Vec<CompileJob>>>,
}

impl FakeCompiler {
    pub fn new(fs: MockFileSystem) -> Self {
        Self {
            fs,
            behaviour: Arc::new(Mutex::new(CompileBehaviour::Succeed)),
            failing_sources: Arc::new(Mutex::new(HashSet::new())),
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behaviour(&self, behaviour: CompileBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    /// Make compiles of this one source fail regardless of the behaviour.
    pub fn fail_for(&self, source: impl AsRef<Path>) {
        self.failing_sources
            .lock()
            .unwrap()
            .insert(source.as_ref().to_path_buf());
    }

    pub fn jobs(&self) -> Vec<CompileJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn compiled_sources(&self) -> Vec<PathBuf> {
        self.jobs().into_iter().map(|j| j.source).collect()
    }
}

impl Compiler for FakeCompiler {
    fn compile<'a>(&'a self, job: &'a CompileJob) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            self.jobs.lock().unwrap().push(job.clone());

            if self.failing_sources.lock().unwrap().contains(&job.source) {
                return Ok(false);
            }

            let behaviour = *self.behaviour.lock().unwrap();
            match behaviour {
                CompileBehaviour::Succeed => {
                    self.fs.add_file(&job.output);
                    Ok(true)
                }
                CompileBehaviour::Fail => Ok(false),
                CompileBehaviour::SucceedWithoutOutput => Ok(true),
                CompileBehaviour::Unavailable => Err(CompwatchError::Other(anyhow::anyhow!(
                    "No such file or directory: {}",
                    job.compiler
                ))),
            }
        })
    }
}

/// A fake process runner that records invocations and returns a fixed
/// outcome.
#[derive(Debug, Clone)]
pub struct FakeRunner {
    outcome: Arc<Mutex<RunOutcome>>,
    invocations: Arc<Mutex<Vec<RunInvocation>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            outcome: Arc::new(Mutex::new(RunOutcome {
                exit_code: 0,
                pipe_exit_code: None,
            })),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_exit_code(&self, code: i32) {
        self.outcome.lock().unwrap().exit_code = code;
    }

    pub fn set_pipe_exit_code(&self, code: i32) {
        self.outcome.lock().unwrap().pipe_exit_code = Some(code);
    }

    pub fn invocations(&self) -> Vec<RunInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn run_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for FakeRunner {
    fn run<'a>(&'a self, invocation: &'a RunInvocation) -> BoxFuture<'a, Result<RunOutcome>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(invocation.clone());
            Ok(*self.outcome.lock().unwrap())
        })
    }
}
