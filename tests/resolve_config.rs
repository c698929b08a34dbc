// tests/resolve_config.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use compwatch::cli::{self, CliArgs, Invocation};
use compwatch::config::{load_from_path, resolve_config, ToolchainDefaults};
use compwatch::errors::CompwatchError;
use compwatch::fs::mock::MockFileSystem;
use compwatch::fs::RealFileSystem;
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

fn parsed(args: &[&str]) -> CliArgs {
    match cli::parse_from(std::iter::once("compwatch").chain(args.iter().copied())) {
        Invocation::Run(a) => a,
        Invocation::Usage(text) => panic!("unexpected usage:\n{text}"),
    }
}

proptest! {
    #[test]
    fn output_defaults_to_the_stripped_source_name(
        dir in proptest::option::of("[a-z]{1,6}"),
        stem in "[a-z][a-z0-9_]{0,10}",
        with_ext in any::<bool>(),
    ) {
        let fs = MockFileSystem::new();
        let base = match &dir {
            Some(d) => format!("{d}/{stem}"),
            None => stem.clone(),
        };
        fs.add_file(format!("{base}.cpp"));

        let arg = if with_ext { format!("{base}.cpp") } else { base.clone() };
        let args = CliArgs { file: Some(arg), ..CliArgs::default() };
        let cfg = resolve_config(&args, &ToolchainDefaults::default(), &fs).unwrap();

        let expected = match &dir {
            Some(_) => PathBuf::from(&base),
            None => PathBuf::from(format!("./{stem}")),
        };
        prop_assert_eq!(&cfg.source_path, &expected);
        prop_assert_eq!(&cfg.output_path, &expected);
        prop_assert_eq!(cfg.source_file(), PathBuf::from(format!("{}.cpp", expected.display())));
        prop_assert!(!cfg.is_watch_mode());
    }
}

#[test]
fn parsed_command_line_resolves_end_to_end() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./demo.cpp");

    let args = parsed(&[
        "-f", "demo", "-o", "demo_out", "-a", "1 2", "-c", "cat in.txt", "-s", "-O2", "-w", "2",
        "-wp", "src",
    ]);
    let cfg = resolve_config(&args, &ToolchainDefaults::default(), &fs)?;

    assert_eq!(cfg.source_file(), PathBuf::from("./demo.cpp"));
    assert_eq!(cfg.output_path, PathBuf::from("./demo_out"));
    assert_eq!(cfg.program_argv(), vec!["1", "2"]);
    assert_eq!(cfg.pipe_command.as_deref(), Some("cat in.txt"));
    assert_eq!(cfg.compiler_args(), vec!["-O2"]);
    assert_eq!(cfg.watch_interval_seconds, 2);
    assert_eq!(cfg.watch_pattern.as_deref(), Some("src"));
    Ok(())
}

#[test]
fn defaults_file_supplies_toolchain() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("compwatch.toml");
    fs::write(
        &config,
        "[compiler]\nprogram = \"cc\"\nextension = \"c\"\n\n[watch]\npattern = \"lib\"\n",
    )?;
    let source = dir.path().join("tool.c");
    fs::write(&source, "int main(void) { return 0; }\n")?;

    let defaults = load_from_path(&config)?;
    let args = CliArgs {
        file: Some(dir.path().join("tool").to_string_lossy().into_owned()),
        ..CliArgs::default()
    };
    let cfg = resolve_config(&args, &defaults, &RealFileSystem)?;

    assert_eq!(cfg.compiler, "cc");
    assert_eq!(cfg.source_file(), source);
    assert_eq!(cfg.output_path, dir.path().join("tool"));
    assert_eq!(cfg.watch_pattern.as_deref(), Some("lib"));
    assert_eq!(cfg.watch_interval_seconds, 0);
    Ok(())
}

#[test]
fn nonexistent_source_on_disk_is_an_invalid_source() -> TestResult {
    let dir = tempfile::tempdir()?;
    let args = CliArgs {
        file: Some(dir.path().join("ghost").to_string_lossy().into_owned()),
        ..CliArgs::default()
    };

    let err = resolve_config(&args, &ToolchainDefaults::default(), &RealFileSystem).unwrap_err();

    assert!(matches!(err, CompwatchError::SourceNotFound(_)));
    assert_eq!(err.exit_status().code(), 2);
    assert!(err.shows_usage());
    Ok(())
}
