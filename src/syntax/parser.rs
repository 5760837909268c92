//! JFTT Parser - table-driven shift-reduce driver
//!
//! Pulls tokens one at a time from a scanner and runs the LALR(1) automaton
//! over them. The only mutable state is the stack of `(state, node)` entries
//! local to one call; the tables are shared and read-only.
//! This parser is purely syntactic - no semantic analysis or type checking.

use super::table::{tables, Action, ParseTables, StateId};
use super::{
    Branch, LexicalError, Node, ParseError, ParseTree, Position, Scanner, Span, SyntaxError,
    Token, TokenKind,
};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses JFTT source text into a concrete syntax tree.
///
/// ```rust
/// let tree = jftt::syntax::parse("PROGRAM IS BEGIN WRITE 1; END").unwrap();
/// assert_eq!(
///     tree.to_sexp(),
///     "(program_all (main (commands (command (value (num))))))"
/// );
/// ```
pub fn parse(source: &str) -> Result<ParseTree, ParseError> {
    Parser::new().parse_str(source)
}

/// One entry of the parse stack. The bottom entry carries no node.
#[derive(Debug)]
struct StackEntry {
    state: StateId,
    node: Option<Node>,
}

/// Shift-reduce driver over a set of tables.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'t> {
    tables: &'t ParseTables,
}

impl Parser<'static> {
    /// A parser over the built-in grammar's shared tables.
    pub fn new() -> Self {
        Self { tables: tables() }
    }
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> Parser<'t> {
    pub fn with_tables(tables: &'t ParseTables) -> Self {
        Self { tables }
    }

    pub fn parse_str(&self, source: &str) -> Result<ParseTree, ParseError> {
        self.parse_tokens(Scanner::new(source))
    }

    /// Runs the automaton over a token stream.
    ///
    /// Comment tokens are set aside as trivia. A stream that ends without an
    /// explicit `Eof` is treated as if one followed its last token.
    pub fn parse_tokens<I>(&self, tokens: I) -> Result<ParseTree, ParseError>
    where
        I: IntoIterator<Item = Result<Token, LexicalError>>,
    {
        let mut input = TokenInput::new(tokens.into_iter());
        let mut stack = vec![StackEntry {
            state: ParseTables::INITIAL_STATE,
            node: None,
        }];
        let mut lookahead = input.next()?;

        loop {
            let state = current_state(&stack);
            match self.tables.action(state, lookahead.kind) {
                Action::Shift(next) => {
                    log::trace!("state {state}: shift {} -> {next}", lookahead);
                    stack.push(StackEntry {
                        state: next,
                        node: Some(Node::Leaf(lookahead)),
                    });
                    lookahead = input.next()?;
                }
                Action::Reduce(rule) => {
                    let Some(production) = self.tables.production(rule) else {
                        unreachable!("reduce by {rule:?}, which the tables' grammar lacks");
                    };
                    let at = stack.len() - production.arity();
                    let children: Vec<Node> =
                        stack.drain(at..).filter_map(|entry| entry.node).collect();
                    let span = match (children.first(), children.last()) {
                        (Some(first), Some(last)) => first.span().merge(last.span()),
                        _ => Span::new(lookahead.span.start, lookahead.span.start, lookahead.span.position),
                    };

                    let top = current_state(&stack);
                    let Some(next) = self.tables.goto(top, production.lhs) else {
                        unreachable!("no goto from state {top} on {}", production.lhs);
                    };
                    log::trace!("state {state}: reduce {rule:?}, goto {next}");
                    stack.push(StackEntry {
                        state: next,
                        node: Some(Node::Branch(Branch {
                            kind: production.lhs,
                            rule,
                            span,
                            children,
                        })),
                    });
                }
                Action::Accept => {
                    log::trace!("state {state}: accept");
                    let root = stack.pop().and_then(|entry| entry.node);
                    let Some(root) = root else {
                        unreachable!("accept with an empty stack");
                    };
                    debug_assert_eq!(stack.len(), 1, "accept with leftover stack entries");
                    return Ok(ParseTree::new(root, input.comments));
                }
                Action::Error => {
                    let expected = self.tables.expected(state);
                    log::debug!("state {state}: no action for {}", lookahead);
                    return Err(SyntaxError {
                        expected,
                        found: lookahead,
                    }
                    .into());
                }
            }
        }
    }
}

fn current_state(stack: &[StackEntry]) -> StateId {
    stack
        .last()
        .map_or(ParseTables::INITIAL_STATE, |entry| entry.state)
}

// ============================================================================
// TOKEN INPUT
// ============================================================================

/// Lookahead source that strips comments and guarantees a final `Eof`.
struct TokenInput<I> {
    tokens: I,
    comments: Vec<Token>,
    /// Where an implicit `Eof` would sit.
    end: (usize, Position),
}

impl<I> TokenInput<I>
where
    I: Iterator<Item = Result<Token, LexicalError>>,
{
    fn new(tokens: I) -> Self {
        Self {
            tokens,
            comments: Vec::new(),
            end: (0, Position::START),
        }
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        loop {
            let Some(token) = self.tokens.next().transpose()? else {
                let (offset, position) = self.end;
                return Ok(Token::new(
                    TokenKind::Eof,
                    Span::new(offset, offset, position),
                    "",
                ));
            };
            self.end = (token.span.end, token.span.position.advance(&token.text));
            if token.kind.is_trivia() {
                self.comments.push(token);
                continue;
            }
            return Ok(token);
        }
    }
}
