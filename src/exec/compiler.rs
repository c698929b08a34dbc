// src/exec/compiler.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::errors::Result;

use super::BoxFuture;

/// One compiler invocation: `<compiler> <flags...> <source> -o <output>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub compiler: String,
    pub flags: Vec<String>,
    pub source: PathBuf,
    pub output: PathBuf,
}

impl CompileJob {
    /// The tracked source file of `cfg`, producing `cfg.output_path`.
    pub fn primary(cfg: &BuildConfig) -> Self {
        Self {
            compiler: cfg.compiler.clone(),
            flags: cfg.compiler_args(),
            source: cfg.source_file(),
            output: cfg.output_path.clone(),
        }
    }

    /// A sibling source picked up by the watch pattern; its executable sits
    /// next to it with the extension removed.
    pub fn sibling(cfg: &BuildConfig, source: &Path) -> Self {
        Self {
            compiler: cfg.compiler.clone(),
            flags: cfg.compiler_args(),
            source: source.to_path_buf(),
            output: source.with_extension(""),
        }
    }

    /// Arguments passed to the compiler program.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        args.push(self.source.clone().into_os_string());
        args.push(OsString::from("-o"));
        args.push(self.output.clone().into_os_string());
        args
    }
}

/// Capability to compile one source file.
pub trait Compiler: Send + Sync {
    /// Run the compiler and report whether it exited successfully.
    ///
    /// `Err` means the compiler could not be run at all.
    fn compile<'a>(&'a self, job: &'a CompileJob) -> BoxFuture<'a, Result<bool>>;
}

/// Compiler backed by an external program, with inherited stdio so its
/// diagnostics reach the terminal unchanged.
#[derive(Debug, Clone, Default)]
pub struct ExternalCompiler;

impl Compiler for ExternalCompiler {
    fn compile<'a>(&'a self, job: &'a CompileJob) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let args = job.args();
            debug!(compiler = %job.compiler, ?args, "spawning compiler");

            let status = Command::new(&job.compiler)
                .args(&args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .status()
                .await
                .with_context(|| format!("running compiler '{}'", job.compiler))?;

            info!(
                source = %job.source.display(),
                output = %job.output.display(),
                exit_code = status.code().unwrap_or(super::SIGNAL_EXIT_CODE),
                success = status.success(),
                "compiler exited"
            );

            Ok(status.success())
        })
    }
}
