// tests/process_runner.rs
//
// Real processes through `sh`; unix only.
#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use compwatch::exec::{
    CompileJob, Compiler, ExternalCompiler, ProcessRunner, RunInvocation, SystemProcessRunner,
};
use compwatch_test_utils::init_tracing;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

/// Compiler stub run as `sh <stub> <source> -o <output>`: copies the source
/// script to the output and marks it executable.
const COMPILER_STUB: &str = r#"
src=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    *) src="$1"; shift ;;
  esac
done
cp "$src" "$out" && chmod +x "$out"
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Produce an executable the way the real tool does: through the stub
/// compiler in a child process.
async fn build(dir: &TempDir, name: &str, script: &str) -> PathBuf {
    let stub = write(dir.path(), "cc.sh", COMPILER_STUB);
    let source = write(dir.path(), &format!("{name}.sh"), script);
    let output = dir.path().join(name);

    let job = CompileJob {
        compiler: "sh".into(),
        flags: vec![stub.to_string_lossy().into_owned()],
        source,
        output: output.clone(),
    };
    assert!(ExternalCompiler.compile(&job).await.unwrap());
    output
}

#[tokio::test]
async fn stub_compiler_produces_an_executable() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let output = build(&dir, "hello", "#!/bin/sh\necho hello\n").await;

    let mode = fs::metadata(&output)?.permissions().mode();
    assert!(mode & 0o111 != 0);
    Ok(())
}

#[tokio::test]
async fn exit_code_of_program_is_reported() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = build(&dir, "exit3", "#!/bin/sh\nexit 3\n").await;

    let outcome = SystemProcessRunner
        .run(&RunInvocation {
            program,
            args: vec![],
            pipe_command: None,
        })
        .await?;

    assert_eq!(outcome.exit_code, 3);
    assert_eq!(outcome.pipe_exit_code, None);
    assert!(!outcome.success());
    Ok(())
}

#[tokio::test]
async fn arguments_arrive_as_separate_entries() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = build(&dir, "argc", "#!/bin/sh\n[ \"$#\" -eq 2 ] && [ \"$2\" = \"2\" ]\n").await;

    let outcome = SystemProcessRunner
        .run(&RunInvocation {
            program,
            args: vec!["1".into(), "2".into()],
            pipe_command: None,
        })
        .await?;

    assert!(outcome.success());
    Ok(())
}

#[tokio::test]
async fn pipe_output_feeds_program_stdin() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("seen.txt");
    let script = format!("#!/bin/sh\ncat > '{}'\n", marker.display());
    let program = build(&dir, "sink", &script).await;

    let outcome = SystemProcessRunner
        .run(&RunInvocation {
            program,
            args: vec![],
            pipe_command: Some("echo out; echo err 1>&2".into()),
        })
        .await?;

    assert!(outcome.success());
    assert_eq!(outcome.pipe_exit_code, Some(0));
    let seen = fs::read_to_string(&marker)?;
    assert!(seen.contains("out"));
    assert!(seen.contains("err"));
    Ok(())
}

#[tokio::test]
async fn failing_pipe_command_leaves_program_status_in_charge() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let program = build(&dir, "drain", "#!/bin/sh\ncat > /dev/null\n").await;

    let outcome = SystemProcessRunner
        .run(&RunInvocation {
            program,
            args: vec![],
            pipe_command: Some("echo partial; exit 4".into()),
        })
        .await?;

    assert!(outcome.success());
    assert_eq!(outcome.pipe_exit_code, Some(4));
    Ok(())
}

#[tokio::test]
async fn missing_program_is_an_error() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let result = SystemProcessRunner
        .run(&RunInvocation {
            program: dir.path().join("nope"),
            args: vec![],
            pipe_command: None,
        })
        .await;

    assert!(result.is_err());
    Ok(())
}
