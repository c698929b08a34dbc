// src/report.rs

//! Human-readable status lines on stdout.
//!
//! These are the lines a developer watches while editing: what is being
//! compiled, whether it worked, and how the program exited. They are
//! separate from the `tracing` diagnostics on stderr.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use crossterm::style::{Color, Stylize};
use is_terminal::IsTerminal;

const INFO: Color = Color::Cyan;
const SUCCESS: Color = Color::Green;
const WARNING: Color = Color::Yellow;
const ERROR: Color = Color::Red;

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only shown with `--verbose`.
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone)]
enum Sink {
    Stdout,
    Buffer(Arc<Mutex<Vec<(Severity, String)>>>),
}

/// Writes colored status lines.
#[derive(Clone)]
pub struct Reporter {
    verbose: bool,
    color: bool,
    sink: Sink,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("verbose", &self.verbose)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Reporter for stdout; color is used when stdout is a terminal and
    /// `NO_COLOR` is unset.
    pub fn stdout(verbose: bool) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            verbose,
            color,
            sink: Sink::Stdout,
        }
    }

    /// Reporter that records lines in memory instead of printing them.
    pub fn capturing(verbose: bool) -> (Self, CapturedLines) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let reporter = Self {
            verbose,
            color: false,
            sink: Sink::Buffer(Arc::clone(&lines)),
        };
        (reporter, CapturedLines(lines))
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.emit(Severity::Info, msg.to_string());
    }

    pub fn success(&self, msg: impl fmt::Display) {
        self.emit(Severity::Success, msg.to_string());
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.emit(Severity::Warning, msg.to_string());
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.emit(Severity::Error, msg.to_string());
    }

    fn emit(&self, severity: Severity, line: String) {
        if severity == Severity::Info && !self.verbose {
            return;
        }

        match &self.sink {
            Sink::Buffer(lines) => {
                if let Ok(mut guard) = lines.lock() {
                    guard.push((severity, line));
                }
            }
            Sink::Stdout => {
                let rendered = self.render(severity, &line);
                let mut out = std::io::stdout().lock();
                // A closed stdout must not take the watch loop down with it.
                let _ = writeln!(out, "{rendered}");
                let _ = out.flush();
            }
        }
    }

    fn render(&self, severity: Severity, line: &str) -> String {
        let prefixed = format!("[compwatch] {line}");
        if !self.color {
            return prefixed;
        }
        match severity {
            Severity::Info => format!("{}", prefixed.with(INFO)),
            Severity::Success => format!("{}", prefixed.with(SUCCESS).bold()),
            Severity::Warning => format!("{}", prefixed.with(WARNING)),
            Severity::Error => format!("{}", prefixed.with(ERROR)),
        }
    }
}

/// Lines recorded by a capturing [`Reporter`].
#[derive(Debug, Clone)]
pub struct CapturedLines(Arc<Mutex<Vec<(Severity, String)>>>);

impl CapturedLines {
    pub fn all(&self) -> Vec<(Severity, String)> {
        self.0.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, line)| line)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.all().iter().any(|(_, line)| line.contains(needle))
    }
}
