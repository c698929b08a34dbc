// src/config/resolve.rs

//! Turning parsed arguments into a [`BuildConfig`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::model::{
    with_appended_extension, BuildConfig, ToolchainDefaults, DEFAULT_COMPILER, DEFAULT_EXTENSION,
};
use crate::errors::{CompwatchError, Result};
use crate::fs::{same_path, FileSystem};

/// Resolve command-line arguments (plus optional file defaults) into a
/// normalized build configuration.
///
/// - The source extension is stripped when present: either the configured
///   extension, or any extension when the named file exists as given.
/// - The output defaults to the stripped source name.
/// - Bare names get a `./` prefix so they are executed as paths.
///
/// Fails with `MissingSource` when no file was given and `SourceNotFound`
/// when `<source>.<ext>` does not exist.
pub fn resolve_config(
    args: &CliArgs,
    defaults: &ToolchainDefaults,
    fs: &dyn FileSystem,
) -> Result<BuildConfig> {
    let file = args
        .file
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CompwatchError::MissingSource)?;

    let configured_ext = normalize_extension(
        args.extension
            .as_deref()
            .or(defaults.compiler.extension.as_deref())
            .unwrap_or(DEFAULT_EXTENSION),
    );
    if configured_ext.is_empty() {
        return Err(CompwatchError::InvalidSource(
            "source extension must not be empty".to_string(),
        ));
    }

    let raw = PathBuf::from(file);
    if raw.file_name().is_none() {
        return Err(CompwatchError::InvalidSource(format!(
            "'{file}' does not name a file"
        )));
    }

    let (stem, extension) = split_source(&raw, &configured_ext, fs);
    let source_path = with_dir_component(stem.clone());
    let source_file = with_appended_extension(&source_path, &extension);
    if !fs.is_file(&source_file) {
        return Err(CompwatchError::SourceNotFound(source_file));
    }

    let output_path = with_dir_component(
        args.output
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(stem),
    );
    if same_path(fs, &output_path, &source_file) {
        return Err(CompwatchError::InvalidSource(format!(
            "output {} would overwrite the source file",
            output_path.display()
        )));
    }

    let watch_interval_seconds = match args.watch.as_deref() {
        Some(raw) => parse_interval(raw),
        None => defaults.watch.interval.unwrap_or(0),
    };

    let cfg = BuildConfig {
        source_path,
        extension,
        output_path,
        compiler: args
            .compiler
            .clone()
            .or_else(|| defaults.compiler.program.clone())
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
        compiler_flags: args
            .set
            .clone()
            .or_else(|| defaults.compiler.flags.clone())
            .unwrap_or_default(),
        pipe_command: args.command.clone().filter(|c| !c.trim().is_empty()),
        program_args: args.argvs.clone(),
        watch_interval_seconds,
        watch_pattern: args
            .wpattern
            .clone()
            .or_else(|| defaults.watch.pattern.clone()),
        verbose: args.verbose,
    };

    if cfg.watch_pattern.is_some() && !cfg.is_watch_mode() {
        debug!("watch pattern given without a watch interval; it will be ignored");
    }
    debug!(?cfg, "resolved build config");

    Ok(cfg)
}

/// Split `raw` into (stem, extension).
fn split_source(raw: &Path, configured_ext: &str, fs: &dyn FileSystem) -> (PathBuf, String) {
    if let Some(ext) = raw.extension().and_then(|e| e.to_str()) {
        if ext == configured_ext || fs.is_file(raw) {
            return (raw.with_extension(""), ext.to_string());
        }
    }
    (raw.to_path_buf(), configured_ext.to_string())
}

/// Prefix bare names with `./`.
fn with_dir_component(path: PathBuf) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => path,
        _ => Path::new(".").join(path),
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Only positive whole numbers enable watch mode.
fn parse_interval(raw: &str) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(secs) => secs,
        Err(_) => {
            warn!(value = raw, "watch interval is not a positive integer; running once");
            0
        }
    }
}
