//! Coloured terminal output for user-facing progress.
//!
//! Diagnostics go through `log`; this is what the operator reads.

use std::io::{IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes progress, warnings and summaries to the terminal
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    stdout_color: ColorChoice,
    stderr_color: ColorChoice,
}

impl OutputManager {
    /// Creates an output manager.
    ///
    /// `verbose` enables [`OutputManager::verbose`] lines; `quiet` suppresses
    /// everything except warnings and errors.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            stdout_color: color_choice(std::io::stdout().is_terminal()),
            stderr_color: color_choice(std::io::stderr().is_terminal()),
        }
    }

    /// Plain informational line
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.stdout(None, false, message);
        }
    }

    /// Detail line shown only in verbose mode
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.stdout(Some(Color::Cyan), false, message);
        }
    }

    pub fn progress(&self, message: &str) {
        if !self.quiet {
            self.stdout(Some(Color::Blue), false, &format!("→ {}", message));
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.stdout(Some(Color::Green), false, &format!("✓ {}", message));
        }
    }

    pub fn warn(&self, message: &str) {
        self.stderr(Some(Color::Yellow), false, &format!("⚠ {}", message));
    }

    /// Bold section header
    pub fn section(&self, title: &str) {
        if !self.quiet {
            self.stdout(None, true, &format!("\n{}", title));
        }
    }

    /// Indented detail line
    pub fn indent(&self, message: &str) {
        if !self.quiet {
            self.stdout(None, false, &format!("   {}", message));
        }
    }

    fn stdout(&self, color: Option<Color>, bold: bool, message: &str) {
        let mut stream = StandardStream::stdout(self.stdout_color);
        // Terminal write failures are ignored.
        let _ = write_line(&mut stream, color, bold, message);
    }

    fn stderr(&self, color: Option<Color>, bold: bool, message: &str) {
        let mut stream = StandardStream::stderr(self.stderr_color);
        // Ignored, as for stdout.
        let _ = write_line(&mut stream, color, bold, message);
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn write_line(
    stream: &mut StandardStream,
    color: Option<Color>,
    bold: bool,
    message: &str,
) -> std::io::Result<()> {
    stream.set_color(ColorSpec::new().set_fg(color).set_bold(bold))?;
    writeln!(stream, "{}", message)?;
    stream.reset()
}
