//! Diagnostic rendering for scanner and parser failures.
//!
//! Errors themselves implement [`miette::Diagnostic`]; this module pairs them
//! with their source text. Two renderings are offered:
//!
//! - [`report`] builds a [`miette::Report`] for the graphical handler;
//! - [`format_plain`] renders a compact caret diagram that needs no terminal
//!   support:
//!
//! ```text
//! Error at line 2, column 10:
//! unexpected 'END'; expected one of ';', '+', '-', ...
//!
//!   x := 1 END
//!          ^^^
//! ```

use miette::{NamedSource, Report};
use unicode_width::UnicodeWidthStr;

use crate::syntax::ParseError;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Source text plus the name it should be reported under.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.clone())
    }
}

/// Attaches the source to `error` so miette can draw the snippet.
pub fn report(error: ParseError, source: &SourceContext) -> Report {
    Report::new(error).with_source_code(source.to_named_source())
}

// ============================================================================
// PLAIN RENDERING
// ============================================================================

/// One-line summary of what went wrong, without location.
pub fn message(error: &ParseError) -> String {
    match error {
        ParseError::Lexical(e) => format!("unexpected character {:?}", e.character),
        ParseError::Syntax(e) => format!("unexpected {}; {}", e.found, e.expected_message()),
    }
}

/// Renders `error` against `source` as a caret diagram.
pub fn format_plain(error: &ParseError, source: &str) -> String {
    let span = error.span();
    let position = span.position;
    let line = source.lines().nth(position.line - 1).unwrap_or("");

    let line_start = line_offset(source, position.line);
    let prefix_end = span.start.saturating_sub(line_start).min(line.len());
    let prefix = line.get(..prefix_end).unwrap_or("");
    let marked = source
        .get(span.start..span.end)
        .map(|text| text.lines().next().unwrap_or(""))
        .unwrap_or("");

    let pad = " ".repeat(prefix.width());
    let carets = "^".repeat(marked.width().max(1));

    format!(
        "Error at line {}, column {}:\n{}\n\n{}\n{}{}\n",
        position.line,
        position.column,
        message(error),
        line,
        pad,
        carets
    )
}

/// Byte offset where 1-based `line` starts.
fn line_offset(source: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth(line - 2)
        .map_or(source.len(), |(i, _)| i + 1)
}
