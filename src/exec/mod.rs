// src/exec/mod.rs

//! Process execution layer.
//!
//! The engine never spawns processes itself. It talks to two capabilities:
//!
//! - [`Compiler`] turns one source file into one executable.
//! - [`ProcessRunner`] runs the produced executable, optionally with a pipe
//!   command feeding its stdin.
//!
//! [`ExternalCompiler`] and [`SystemProcessRunner`] are the production
//! implementations on top of `tokio::process::Command`; tests substitute
//! fakes that record what they were asked to do.

use std::future::Future;
use std::pin::Pin;

use tokio::process::Command;

pub mod compiler;
pub mod runner;

pub use compiler::{CompileJob, Compiler, ExternalCompiler};
pub use runner::{ProcessRunner, RunInvocation, RunOutcome, SystemProcessRunner};

/// Boxed future returned by the capability traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exit code reported when a process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(script: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(script);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    }
}
