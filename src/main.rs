// src/main.rs

use std::process::ExitCode;

use compwatch::cli::{self, Invocation};
use compwatch::errors::CompwatchError;
use compwatch::types::ExitStatus;
use compwatch::{logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse() {
        Invocation::Run(args) => args,
        Invocation::Usage(text) => {
            println!("{}", text.trim_end());
            return ExitStatus::Success.into();
        }
    };

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("compwatch: {err:?}");
    }

    match run(args).await {
        Ok(()) => ExitStatus::Success.into(),
        Err(err) => {
            report_error(&err);
            err.exit_status().into()
        }
    }
}

fn report_error(err: &CompwatchError) {
    match err {
        // Already reported as status lines by the cycle.
        CompwatchError::Compile(_)
        | CompwatchError::OutputMissing(_)
        | CompwatchError::Runtime { .. } => {}
        CompwatchError::MissingSource => {}
        other => eprintln!("compwatch error: {other}"),
    }

    if err.shows_usage() {
        println!("{}", cli::usage().trim_end());
    }
}
