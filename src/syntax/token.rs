//! Terminal symbols of the JFTT grammar and the tokens that carry them.

use serde::Serialize;

use super::Span;

/// Every terminal the scanner can produce.
///
/// The discriminants are dense (`0..TokenKind::COUNT`) so the parse tables
/// can index rows by `kind as usize`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TokenKind {
    Eof,
    Comment,

    // Keywords
    Procedure,
    Is,
    Begin,
    End,
    Program,
    If,
    Then,
    Else,
    Endif,
    While,
    Do,
    Endwhile,
    Repeat,
    Until,
    For,
    From,
    To,
    Endfor,
    Downto,
    Read,
    Write,

    /// The bare `T` marker for by-reference array parameters.
    ArrayMarker,

    // Punctuation
    Assign,    // :=
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    LBracket,  // [
    Colon,     // :
    RBracket,  // ]
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Percent,   // %
    Eq,        // =
    NotEq,     // !=
    Gt,        // >
    Lt,        // <
    GtEq,      // >=
    LtEq,      // <=

    // Named terminals
    Pidentifier,
    Num,
}

impl TokenKind {
    pub const COUNT: usize = TokenKind::Num as usize + 1;

    pub const ALL: [TokenKind; TokenKind::COUNT] = [
        TokenKind::Eof,
        TokenKind::Comment,
        TokenKind::Procedure,
        TokenKind::Is,
        TokenKind::Begin,
        TokenKind::End,
        TokenKind::Program,
        TokenKind::If,
        TokenKind::Then,
        TokenKind::Else,
        TokenKind::Endif,
        TokenKind::While,
        TokenKind::Do,
        TokenKind::Endwhile,
        TokenKind::Repeat,
        TokenKind::Until,
        TokenKind::For,
        TokenKind::From,
        TokenKind::To,
        TokenKind::Endfor,
        TokenKind::Downto,
        TokenKind::Read,
        TokenKind::Write,
        TokenKind::ArrayMarker,
        TokenKind::Assign,
        TokenKind::Semicolon,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::Comma,
        TokenKind::LBracket,
        TokenKind::Colon,
        TokenKind::RBracket,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Percent,
        TokenKind::Eq,
        TokenKind::NotEq,
        TokenKind::Gt,
        TokenKind::Lt,
        TokenKind::GtEq,
        TokenKind::LtEq,
        TokenKind::Pidentifier,
        TokenKind::Num,
    ];

    /// Keywords in the order the scanner's keyword automaton is built from.
    pub const KEYWORDS: [TokenKind; 22] = [
        TokenKind::Procedure,
        TokenKind::Is,
        TokenKind::Begin,
        TokenKind::End,
        TokenKind::Program,
        TokenKind::If,
        TokenKind::Then,
        TokenKind::Else,
        TokenKind::Endif,
        TokenKind::While,
        TokenKind::Do,
        TokenKind::Endwhile,
        TokenKind::Repeat,
        TokenKind::Until,
        TokenKind::For,
        TokenKind::From,
        TokenKind::To,
        TokenKind::Endfor,
        TokenKind::Downto,
        TokenKind::Read,
        TokenKind::Write,
        TokenKind::ArrayMarker,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Source text for fixed-spelling terminals; `None` for named ones.
    pub fn literal(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Procedure => "PROCEDURE",
            Is => "IS",
            Begin => "BEGIN",
            End => "END",
            Program => "PROGRAM",
            If => "IF",
            Then => "THEN",
            Else => "ELSE",
            Endif => "ENDIF",
            While => "WHILE",
            Do => "DO",
            Endwhile => "ENDWHILE",
            Repeat => "REPEAT",
            Until => "UNTIL",
            For => "FOR",
            From => "FROM",
            To => "TO",
            Endfor => "ENDFOR",
            Downto => "DOWNTO",
            Read => "READ",
            Write => "WRITE",
            ArrayMarker => "T",
            Assign => ":=",
            Semicolon => ";",
            LParen => "(",
            RParen => ")",
            Comma => ",",
            LBracket => "[",
            Colon => ":",
            RBracket => "]",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Eq => "=",
            NotEq => "!=",
            Gt => ">",
            Lt => "<",
            GtEq => ">=",
            LtEq => "<=",
            Eof | Comment | Pidentifier | Num => return None,
        };
        Some(text)
    }

    /// Stable, human-facing name used in diagnostics and tree dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Comment => "comment",
            TokenKind::Pidentifier => "pidentifier",
            TokenKind::Num => "num",
            other => other.literal().unwrap_or("?"),
        }
    }

    /// Named terminals show up in S-expressions; keywords and punctuation do not.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            TokenKind::Pidentifier | TokenKind::Num | TokenKind::Comment
        )
    }

    pub fn is_keyword(self) -> bool {
        Self::KEYWORDS.contains(&self)
    }

    pub fn is_trivia(self) -> bool {
        self == TokenKind::Comment
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.literal() {
            Some(text) => write!(f, "'{}'", text),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// A classified slice of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Pidentifier | TokenKind::Num | TokenKind::Comment => {
                write!(f, "{} '{}'", self.kind.name(), self.text)
            }
            kind => write!(f, "{}", kind),
        }
    }
}
