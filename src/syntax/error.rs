//! Error types produced by the scanner and the parser.
//!
//! Both errors are fatal to the parse that raised them and carry enough
//! information to render a diagnostic without re-running anything.

use miette::{Diagnostic, LabeledSpan};
use serde::Serialize;
use thiserror::Error;

use super::{Position, Span, Token, TokenKind};

// ============================================================================
// LEXICAL ERRORS
// ============================================================================

/// No scanner transition exists for `character` at `span`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unexpected character {character:?} at {}", .span.position)]
pub struct LexicalError {
    pub character: char,
    pub span: Span,
}

impl LexicalError {
    pub fn position(&self) -> Position {
        self.span.position
    }
}

impl Diagnostic for LexicalError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("jftt::lexical"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let hint = if self.character.is_ascii_uppercase() {
            "uppercase letters only appear in keywords; identifiers are lowercase"
        } else if self.character == '!' {
            "'!' is only valid as part of '!='"
        } else {
            "only ASCII letters, digits and the language's punctuation are allowed outside comments"
        };
        Some(Box::new(hint))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new(
            Some("not a valid token".to_string()),
            self.span.start,
            self.span.len().max(1),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// SYNTAX ERRORS
// ============================================================================

/// The automaton has no action for `found` in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unexpected {found} at {}", .found.span.position)]
pub struct SyntaxError {
    /// Terminals that had a table entry in the failing state, sorted.
    pub expected: Vec<TokenKind>,
    pub found: Token,
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        self.found.span
    }

    pub fn position(&self) -> Position {
        self.found.span.position
    }

    /// `expected one of 'A', 'B' or 'C'` style rendering of the expected set.
    pub fn expected_message(&self) -> String {
        let names: Vec<String> = self.expected.iter().map(|k| k.to_string()).collect();
        match names.as_slice() {
            [] => "no token is valid here".to_string(),
            [only] => format!("expected {}", only),
            [init @ .., last] => format!("expected one of {} or {}", init.join(", "), last),
        }
    }
}

impl Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("jftt::syntax"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.expected_message()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.found.span;
        let label = LabeledSpan::new(
            Some(format!("unexpected {}", self.found)),
            span.start,
            span.len().max(1),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// COMBINED ERROR
// ============================================================================

/// Anything that stops a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lexical(e) => e.span,
            ParseError::Syntax(e) => e.span(),
        }
    }

    pub fn position(&self) -> Position {
        self.span().position
    }

    fn inner(&self) -> &dyn Diagnostic {
        match self {
            ParseError::Lexical(e) => e,
            ParseError::Syntax(e) => e,
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.inner().code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.inner().help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.inner().labels()
    }
}
