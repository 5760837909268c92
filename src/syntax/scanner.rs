//! Lexical automaton for JFTT source text.
//!
//! The scanner is a DFA run in maximal-munch mode: from the start state it
//! follows transitions for as long as they exist, remembers the last
//! accepting state it passed through, and emits that token. Keywords are
//! recognized by a trie-shaped sub-automaton whose states encode how much of
//! which keyword has been matched, so `TO` never splits into `T` `O` and
//! `T` followed by anything else falls back to the bare marker.
//!
//! Tokens are pulled one at a time; nothing is materialized ahead of the
//! consumer.

use once_cell::sync::Lazy;

use super::{LexicalError, Position, Span, Token, TokenKind};

// ============================================================================
// KEYWORD AUTOMATON
// ============================================================================

type TrieId = u16;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    next: [Option<TrieId>; 26],
    accept: Option<TokenKind>,
}

/// Prefix automaton over the uppercase keywords (and `T`).
#[derive(Debug)]
struct KeywordAutomaton {
    nodes: Vec<TrieNode>,
}

impl KeywordAutomaton {
    const ROOT: TrieId = 0;

    fn build() -> Self {
        let mut nodes = vec![TrieNode::default()];
        for kind in TokenKind::KEYWORDS {
            let spelling = kind.literal().unwrap_or_default();
            let mut current = Self::ROOT as usize;
            for byte in spelling.bytes() {
                let slot = (byte - b'A') as usize;
                current = match nodes[current].next[slot] {
                    Some(id) => id as usize,
                    None => {
                        nodes.push(TrieNode::default());
                        let id = nodes.len() - 1;
                        nodes[current].next[slot] = Some(id as TrieId);
                        id
                    }
                };
            }
            nodes[current].accept = Some(kind);
        }
        log::debug!("keyword automaton built with {} states", nodes.len());
        Self { nodes }
    }

    fn step(&self, state: TrieId, c: char) -> Option<TrieId> {
        if !c.is_ascii_uppercase() {
            return None;
        }
        self.nodes[state as usize].next[(c as u8 - b'A') as usize]
    }

    fn accept(&self, state: TrieId) -> Option<TokenKind> {
        self.nodes[state as usize].accept
    }
}

static KEYWORDS: Lazy<KeywordAutomaton> = Lazy::new(KeywordAutomaton::build);

// ============================================================================
// LEXER STATES
// ============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LexState {
    Start,
    Keyword(TrieId),
    Ident,
    Number,
    Comment,
    /// Saw `:`; `=` may follow.
    Colon,
    /// Saw `!`; only `=` may follow.
    Bang,
    /// Saw `>`; `=` may follow.
    Greater,
    /// Saw `<`; `=` may follow.
    Less,
    /// A complete punctuation token with no possible extension.
    Punct(TokenKind),
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

impl LexState {
    fn step(self, c: char) -> Option<LexState> {
        use LexState::*;
        match self {
            Start => match c {
                'a'..='z' | '_' => Some(Ident),
                '0'..='9' => Some(Number),
                'A'..='Z' => KEYWORDS.step(KeywordAutomaton::ROOT, c).map(Keyword),
                '#' => Some(Comment),
                ':' => Some(Colon),
                '!' => Some(Bang),
                '>' => Some(Greater),
                '<' => Some(Less),
                ';' => Some(Punct(TokenKind::Semicolon)),
                '(' => Some(Punct(TokenKind::LParen)),
                ')' => Some(Punct(TokenKind::RParen)),
                ',' => Some(Punct(TokenKind::Comma)),
                '[' => Some(Punct(TokenKind::LBracket)),
                ']' => Some(Punct(TokenKind::RBracket)),
                '+' => Some(Punct(TokenKind::Plus)),
                '-' => Some(Punct(TokenKind::Minus)),
                '*' => Some(Punct(TokenKind::Star)),
                '/' => Some(Punct(TokenKind::Slash)),
                '%' => Some(Punct(TokenKind::Percent)),
                '=' => Some(Punct(TokenKind::Eq)),
                _ => None,
            },
            Keyword(id) => KEYWORDS.step(id, c).map(Keyword),
            Ident => is_ident_continue(c).then_some(Ident),
            Number => c.is_ascii_digit().then_some(Number),
            Comment => (c != '\n').then_some(Comment),
            Colon => (c == '=').then_some(Punct(TokenKind::Assign)),
            Bang => (c == '=').then_some(Punct(TokenKind::NotEq)),
            Greater => (c == '=').then_some(Punct(TokenKind::GtEq)),
            Less => (c == '=').then_some(Punct(TokenKind::LtEq)),
            Punct(_) => None,
        }
    }

    fn accepts(self) -> Option<TokenKind> {
        use LexState::*;
        match self {
            Start | Bang => None,
            Keyword(id) => KEYWORDS.accept(id),
            Ident => Some(TokenKind::Pidentifier),
            Number => Some(TokenKind::Num),
            Comment => Some(TokenKind::Comment),
            Colon => Some(TokenKind::Colon),
            Greater => Some(TokenKind::Gt),
            Less => Some(TokenKind::Lt),
            Punct(kind) => Some(kind),
        }
    }
}

// ============================================================================
// SCANNER
// ============================================================================

/// Pull-based tokenizer over a source string.
#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    source: &'src str,
    offset: usize,
    position: Position,
    /// Set once `Eof` or an error has been yielded through `Iterator`.
    fused: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::START,
            fused: false,
        }
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Consumes and returns the next token; `Eof` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_whitespace();

        let rest = &self.source[self.offset..];
        let Some(first) = rest.chars().next() else {
            let span = Span::new(self.offset, self.offset, self.position);
            return Ok(Token::new(TokenKind::Eof, span, ""));
        };

        let mut state = LexState::Start;
        let mut accepted: Option<(TokenKind, usize)> = None;
        let mut stuck: Option<(usize, char)> = None;

        for (i, c) in rest.char_indices() {
            match state.step(c) {
                Some(next) => {
                    state = next;
                    if let Some(kind) = state.accepts() {
                        accepted = Some((kind, i + c.len_utf8()));
                    }
                }
                None => {
                    stuck = Some((i, c));
                    break;
                }
            }
        }

        match accepted {
            Some((kind, len)) => Ok(self.emit(kind, len)),
            None => Err(self.error_at(first, stuck)),
        }
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.offset;
        let text = &self.source[start..start + len];
        let token = Token::new(kind, Span::new(start, start + len, self.position), text);
        self.offset += len;
        self.position = self.position.advance(text);
        log::trace!("scanned {:?} {:?} at {}", kind, text, token.span.position);
        token
    }

    /// Blames the character the automaton got stuck on, unless it is
    /// whitespace or the input ended; then the token's first character.
    fn error_at(&self, first: char, stuck: Option<(usize, char)>) -> LexicalError {
        let rest = &self.source[self.offset..];
        let (index, character) = match stuck {
            Some((i, c)) if !is_whitespace(c) => (i, c),
            _ => (0, first),
        };
        let position = self.position.advance(&rest[..index]);
        let start = self.offset + index;
        LexicalError {
            character,
            span: Span::new(start, start + character.len_utf8(), position),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.offset..];
        let skipped = rest
            .char_indices()
            .find(|&(_, c)| !is_whitespace(c))
            .map_or(rest.len(), |(i, _)| i);
        if skipped > 0 {
            self.position = self.position.advance(&rest[..skipped]);
            self.offset += skipped;
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, LexicalError>;

    /// Yields every token including a single trailing `Eof`, then `None`.
    /// Stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        let item = self.next_token();
        match &item {
            Ok(token) if token.is_eof() => self.fused = true,
            Err(_) => self.fused = true,
            Ok(_) => {}
        }
        Some(item)
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

/// Scans the whole input, including the final `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    Scanner::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keyword_automaton_accepts_every_keyword() {
        for kind in TokenKind::KEYWORDS {
            let text = kind.literal().unwrap();
            assert_eq!(kinds(text), vec![kind, TokenKind::Eof], "{}", text);
        }
    }

    #[test]
    fn t_prefixed_keywords_and_marker() {
        use TokenKind::*;
        assert_eq!(kinds("T"), vec![ArrayMarker, Eof]);
        assert_eq!(kinds("TO"), vec![To, Eof]);
        assert_eq!(kinds("THEN"), vec![Then, Eof]);
        assert_eq!(kinds("T tab"), vec![ArrayMarker, Pidentifier, Eof]);
        assert_eq!(kinds("Ta"), vec![ArrayMarker, Pidentifier, Eof]);
    }

    #[test]
    fn keyword_prefixes_fall_back_to_longest_keyword() {
        use TokenKind::*;
        assert_eq!(kinds("ENDIF END ENDFOR"), vec![Endif, End, Endfor, Eof]);
        assert_eq!(kinds("DOWNTO DO"), vec![Downto, Do, Eof]);
        assert_eq!(kinds("ENDx"), vec![End, Pidentifier, Eof]);
    }

    #[test]
    fn two_character_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds(":= : != >= > <= < ="),
            vec![Assign, Colon, NotEq, GtEq, Gt, LtEq, Lt, Eq, Eof]
        );
        assert_eq!(kinds("a:=b"), vec![Pidentifier, Assign, Pidentifier, Eof]);
    }

    #[test]
    fn comments_stop_at_newline() {
        let tokens = tokenize("# hello ąę\nx").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, "# hello ąę");
        assert_eq!(tokens[1].kind, TokenKind::Pidentifier);
        assert_eq!(tokens[1].span.position, Position { line: 2, column: 1 });
    }

    #[test]
    fn lone_bang_is_rejected_at_the_bang() {
        let err = tokenize("a ! b").unwrap_err();
        assert_eq!(err.character, '!');
        assert_eq!(err.span.start, 2);
    }

    #[test]
    fn unknown_uppercase_is_rejected() {
        let err = tokenize("x := Y;").unwrap_err();
        assert_eq!(err.character, 'Y');
        assert_eq!(err.span.position, Position { line: 1, column: 6 });
    }

    #[test]
    fn eof_repeats_from_next_token_but_iterator_fuses() {
        let mut scanner = Scanner::new("  ");
        assert!(scanner.next_token().unwrap().is_eof());
        assert!(scanner.next_token().unwrap().is_eof());

        let mut iter = Scanner::new("x");
        assert!(iter.next().is_some());
        assert!(iter.next().unwrap().unwrap().is_eof());
        assert!(iter.next().is_none());
    }
}
