//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for pretty-printing and colorizing output.
//! By centralizing output logic here, we ensure a consistent user experience
//! across all commands.

use std::io::{IsTerminal, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::syntax::{grammar::PRODUCTIONS, ParseTables, Token};

/// Colors only when the stream is a terminal, so piped output stays plain.
fn stdout() -> StandardStream {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn stderr() -> StandardStream {
    let choice = if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stderr(choice)
}

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints one token per line as `line:col kind "text"`.
pub fn print_tokens(tokens: &[Token]) {
    let mut stdout = stdout();
    for token in tokens {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
        let _ = write!(stdout, "{:>4}:{:<3}", token.span.position.line, token.span.position.column);
        let _ = stdout.reset();
        let _ = writeln!(stdout, " {:<12} {:?}", token.kind.name(), token.text);
    }
}

/// Reports a file that parsed cleanly.
pub fn print_ok(path: &Path) {
    let mut stdout = stdout();
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stdout, "ok");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", path.display());
}

/// Header printed above a plain-text diagnostic.
pub fn print_failure_header(path: &Path) {
    let mut stderr = stderr();
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {}", path.display());
}

/// Final tally of a `check` run.
pub fn print_summary(passed: usize, failed: usize) {
    let mut stdout = stdout();
    let color = if failed == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{} passed, {} failed", passed, failed);
    let _ = stdout.reset();
}

/// Lists the productions followed by table statistics.
pub fn print_grammar(tables: &ParseTables) {
    let mut stdout = stdout();
    for production in PRODUCTIONS {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = write!(stdout, "{:<30}", format!("{:?}", production.rule));
        let _ = stdout.reset();
        let _ = writeln!(stdout, " {}", production);
    }
    let _ = writeln!(stdout);
    let _ = writeln!(stdout, "productions: {}", PRODUCTIONS.len());
    let _ = writeln!(stdout, "states: {}", tables.state_count());
    let _ = writeln!(
        stdout,
        "shift/reduce resolved as shift: {}",
        tables.resolved_conflicts().len()
    );
    for conflict in tables.resolved_conflicts() {
        let _ = writeln!(
            stdout,
            "  state {} on {}: shift to {} over {:?}",
            conflict.state, conflict.terminal, conflict.shift_to, conflict.discarded
        );
    }
}
