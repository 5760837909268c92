//! Syntax module for the JFTT language
//!
//! This module hosts the whole front end: the scanner automaton, the grammar,
//! the LALR(1) tables built from it, the shift-reduce driver and the concrete
//! syntax tree it produces. Everything here is purely syntactic.

use serde::Serialize;

pub mod error;
pub mod grammar;
pub mod parser;
pub mod scanner;
pub mod table;
pub mod token;
pub mod tree;

pub use error::{LexicalError, ParseError, SyntaxError};
pub use grammar::{Nonterminal, Production, Rule, Symbol};
pub use parser::{parse, Parser};
pub use scanner::{tokenize, Scanner};
pub use table::{tables, Action, GrammarConflict, ParseTables, StateId};
pub use token::{Token, TokenKind};
pub use tree::{Branch, Node, NodeKind, ParseTree};

// ============================================================================
// SOURCE LOCATIONS
// ============================================================================

/// A 1-based line/column pair. Columns count characters, not bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    /// Returns the position reached after reading `text` from `self`.
    pub fn advance(self, text: &str) -> Position {
        let mut pos = self;
        for ch in text.chars() {
            if ch == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        pos
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in the source code.
///
/// `start..end` is a byte range into the source; `position` is where `start`
/// sits in line/column terms.
///
/// # Examples
///
/// ```rust
/// use jftt::syntax::{Position, Span};
/// let span = Span::new(0, 5, Position::START);
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub position: Position,
}

impl Span {
    pub fn new(start: usize, end: usize, position: Position) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        Self {
            start,
            end,
            position,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (first, last) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: first.start,
            end: first.end.max(last.end),
            position: first.position,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.start.into(), span.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let pos = Position::START.advance("ab\ncd");
        assert_eq!(pos, Position { line: 2, column: 3 });
    }

    #[test]
    fn merge_covers_both_spans() {
        let a = Span::new(4, 6, Position { line: 1, column: 5 });
        let b = Span::new(0, 2, Position::START);
        let merged = a.merge(b);
        assert_eq!((merged.start, merged.end), (0, 6));
        assert_eq!(merged.position, Position::START);
    }
}
