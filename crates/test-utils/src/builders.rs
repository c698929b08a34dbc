#![allow(dead_code)]

use std::path::PathBuf;

use compwatch::config::BuildConfig;

/// Builder for `BuildConfig` to simplify test setup.
///
/// Defaults describe `./main.cpp` compiled by `g++` into `./main`, run once.
pub struct BuildConfigBuilder {
    config: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn new(source_path: &str) -> Self {
        Self {
            config: BuildConfig {
                source_path: PathBuf::from(source_path),
                extension: "cpp".to_string(),
                output_path: PathBuf::from(source_path),
                compiler: "g++".to_string(),
                compiler_flags: String::new(),
                pipe_command: None,
                program_args: None,
                watch_interval_seconds: 0,
                watch_pattern: None,
                verbose: true,
            },
        }
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.config.extension = ext.to_string();
        self
    }

    pub fn output(mut self, path: &str) -> Self {
        self.config.output_path = PathBuf::from(path);
        self
    }

    pub fn compiler(mut self, program: &str) -> Self {
        self.config.compiler = program.to_string();
        self
    }

    pub fn flags(mut self, flags: &str) -> Self {
        self.config.compiler_flags = flags.to_string();
        self
    }

    pub fn pipe(mut self, command: &str) -> Self {
        self.config.pipe_command = Some(command.to_string());
        self
    }

    pub fn args(mut self, args: &str) -> Self {
        self.config.program_args = Some(args.to_string());
        self
    }

    pub fn watch(mut self, seconds: u64) -> Self {
        self.config.watch_interval_seconds = seconds;
        self
    }

    pub fn watch_pattern(mut self, pattern: &str) -> Self {
        self.config.watch_pattern = Some(pattern.to_string());
        self
    }

    pub fn build(self) -> BuildConfig {
        self.config
    }
}
