// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Compiler used when neither the command line nor a defaults file names one.
pub const DEFAULT_COMPILER: &str = "g++";

/// Source extension used when the source is given without one.
pub const DEFAULT_EXTENSION: &str = "cpp";

/// Fully resolved settings for one `compwatch` invocation.
///
/// Built once by [`resolve_config`](crate::config::resolve_config) and only
/// ever handed out by reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Source path without its extension, always with a directory component.
    pub source_path: PathBuf,
    /// Source extension, without the leading dot.
    pub extension: String,
    /// Executable produced by the compiler, always with a directory component.
    pub output_path: PathBuf,
    /// External compiler program.
    pub compiler: String,
    /// Raw extra compiler flags.
    pub compiler_flags: String,
    /// Shell command whose output feeds the executable's stdin.
    pub pipe_command: Option<String>,
    /// Raw arguments forwarded to the executable.
    pub program_args: Option<String>,
    /// Polling interval; 0 runs a single cycle.
    pub watch_interval_seconds: u64,
    /// Directory or glob scanned for sibling sources in watch mode.
    pub watch_pattern: Option<String>,
    pub verbose: bool,
}

impl BuildConfig {
    /// The file actually handed to the compiler: `<source_path>.<extension>`.
    pub fn source_file(&self) -> PathBuf {
        with_appended_extension(&self.source_path, &self.extension)
    }

    pub fn is_watch_mode(&self) -> bool {
        self.watch_interval_seconds > 0
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_seconds)
    }

    /// Compiler flags split into separate arguments.
    pub fn compiler_args(&self) -> Vec<String> {
        split_args(&self.compiler_flags)
    }

    /// Program arguments split into separate argv entries.
    pub fn program_argv(&self) -> Vec<String> {
        self.program_args.as_deref().map(split_args).unwrap_or_default()
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// `foo/bar` + `cpp` -> `foo/bar.cpp`, keeping any dots already in the name.
pub(crate) fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(extension);
    PathBuf::from(s)
}

/// Optional toolchain defaults read from a TOML file.
///
/// ```toml
/// [compiler]
/// program = "clang++"
/// extension = "cpp"
/// flags = "-std=c++20 -O2"
///
/// [watch]
/// interval = 2
/// pattern = "src/**/*.cpp"
/// ```
///
/// All sections are optional; command-line values always take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolchainDefaults {
    #[serde(default)]
    pub compiler: CompilerSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[compiler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerSection {
    #[serde(default)]
    pub program: Option<String>,

    /// Source extension, with or without a leading dot.
    #[serde(default)]
    pub extension: Option<String>,

    #[serde(default)]
    pub flags: Option<String>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    /// Polling interval in seconds.
    #[serde(default)]
    pub interval: Option<u64>,

    #[serde(default)]
    pub pattern: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BuildConfig {
        BuildConfig {
            source_path: PathBuf::from("./demo"),
            extension: "cpp".into(),
            output_path: PathBuf::from("./demo"),
            compiler: DEFAULT_COMPILER.into(),
            compiler_flags: "  -O2   -Wall ".into(),
            pipe_command: None,
            program_args: Some("1 2".into()),
            watch_interval_seconds: 0,
            watch_pattern: None,
            verbose: false,
        }
    }

    #[test]
    fn source_file_appends_extension() {
        let mut cfg = sample();
        assert_eq!(cfg.source_file(), PathBuf::from("./demo.cpp"));

        cfg.source_path = PathBuf::from("./v1.2/demo.test");
        assert_eq!(cfg.source_file(), PathBuf::from("./v1.2/demo.test.cpp"));
    }

    #[test]
    fn args_are_split_on_whitespace() {
        let cfg = sample();
        assert_eq!(cfg.compiler_args(), vec!["-O2", "-Wall"]);
        assert_eq!(cfg.program_argv(), vec!["1", "2"]);
    }

    #[test]
    fn zero_interval_is_single_run() {
        let mut cfg = sample();
        assert!(!cfg.is_watch_mode());
        cfg.watch_interval_seconds = 3;
        assert!(cfg.is_watch_mode());
        assert_eq!(cfg.watch_interval(), Duration::from_secs(3));
    }
}
