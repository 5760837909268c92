//! Concrete syntax tree produced by the parser.
//!
//! Leaves wrap tokens; branches are tagged with the nonterminal and the
//! [`Rule`] they were reduced by. Children are owned and kept in source
//! order, so the tree is freshly allocated per parse and never shared.

use serde::Serialize;

use super::{Nonterminal, Rule, Span, Token, TokenKind};

// ============================================================================
// NODES
// ============================================================================

/// What a node stands for: a terminal or a syntactic category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Terminal(TokenKind),
    Nonterminal(Nonterminal),
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Terminal(kind) => kind.name(),
            NodeKind::Nonterminal(nt) => nt.name(),
        }
    }
}

/// An interior node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub kind: Nonterminal,
    pub rule: Rule,
    pub span: Span,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Node {
    Leaf(Token),
    Branch(Branch),
}

/// Releases descendants from a heap worklist so that freeing a deeply nested
/// tree does not recurse once per level.
impl Drop for Branch {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Branch(mut branch) = node {
                pending.append(&mut branch.children);
            }
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(token) => NodeKind::Terminal(token.kind),
            Node::Branch(branch) => NodeKind::Nonterminal(branch.kind),
        }
    }

    /// The nonterminal of a branch; `None` for leaves.
    pub fn nonterminal(&self) -> Option<Nonterminal> {
        match self {
            Node::Branch(branch) => Some(branch.kind),
            Node::Leaf(_) => None,
        }
    }

    /// The production a branch was reduced by; `None` for leaves.
    pub fn rule(&self) -> Option<Rule> {
        match self {
            Node::Branch(branch) => Some(branch.rule),
            Node::Leaf(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Leaf(token) => token.span,
            Node::Branch(branch) => branch.span,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            Node::Leaf(token) => Some(token),
            Node::Branch(_) => None,
        }
    }

    /// The literal text of a leaf.
    pub fn text(&self) -> Option<&str> {
        self.token().map(|t| t.text.as_str())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Branches and `pidentifier`/`num` leaves are named; keywords and
    /// punctuation are anonymous.
    pub fn is_named(&self) -> bool {
        match self {
            Node::Leaf(token) => token.kind.is_named(),
            Node::Branch(_) => true,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::Branch(branch) => &branch.children,
        }
    }

    pub fn named_children(&self) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(|c| c.is_named())
    }

    pub fn child_of_kind(&self, kind: Nonterminal) -> Option<&Node> {
        self.children()
            .iter()
            .find(|c| c.nonterminal() == Some(kind))
    }

    /// Leaf children of the given token kind, in order.
    pub fn tokens_of_kind(&self, kind: TokenKind) -> impl Iterator<Item = &Token> {
        self.children()
            .iter()
            .filter_map(Node::token)
            .filter(move |t| t.kind == kind)
    }

    /// Pre-order traversal of this node and all descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// All leaf tokens in source order.
    pub fn leaves(&self) -> impl Iterator<Item = &Token> {
        self.walk().filter_map(Node::token)
    }

    /// The deepest node whose span contains `offset`.
    pub fn descendant_at(&self, offset: usize) -> Option<&Node> {
        if !self.span().contains(offset) {
            return None;
        }
        let mut current = self;
        'descend: loop {
            for child in current.children() {
                if child.span().contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Structural equality ignoring spans: same kinds, rules and leaf text.
    pub fn same_shape(&self, other: &Node) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Node::Leaf(a), Node::Leaf(b)) => {
                    if a.kind != b.kind || a.text != b.text {
                        return false;
                    }
                }
                (Node::Branch(a), Node::Branch(b)) => {
                    if a.rule != b.rule || a.children.len() != b.children.len() {
                        return false;
                    }
                    pending.extend(a.children.iter().zip(&b.children));
                }
                _ => return false,
            }
        }
        true
    }

    /// Tree-sitter style S-expression over named nodes.
    pub fn to_sexp(&self) -> String {
        enum Step<'a> {
            Open(&'a Node),
            Close,
        }

        let mut out = String::new();
        let mut pending = vec![Step::Open(self)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Open(node) => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push('(');
                    out.push_str(node.kind().name());
                    pending.push(Step::Close);
                    let named: Vec<&Node> = node.named_children().collect();
                    pending.extend(named.into_iter().rev().map(Step::Open));
                }
                Step::Close => out.push(')'),
            }
        }
        out
    }

    /// Indented rendering that shows every node, including anonymous leaves.
    pub fn pretty(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut pending = vec![(self, 0usize)];
        while let Some((node, depth)) = pending.pop() {
            let indent = "  ".repeat(depth);
            let pos = node.span().position;
            let _ = match node {
                Node::Leaf(token) => writeln!(out, "{indent}{} {:?} @{}", token.kind.name(), token.text, pos),
                Node::Branch(branch) => writeln!(out, "{indent}{} [{:?}] @{}", branch.kind, branch.rule, pos),
            };
            pending.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
        }
        out
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sexp())
    }
}

/// Pre-order iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

// ============================================================================
// PARSE TREE
// ============================================================================

/// A successful parse: the root node plus the comments seen along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    root: Node,
    comments: Vec<Token>,
}

impl ParseTree {
    pub(crate) fn new(root: Node, comments: Vec<Token>) -> Self {
        Self { root, comments }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Comment tokens in source order.
    pub fn comments(&self) -> &[Token] {
        &self.comments
    }

    /// Rules of every branch in pre-order; replaying them is a leftmost derivation.
    pub fn productions(&self) -> Vec<Rule> {
        self.root.walk().filter_map(Node::rule).collect()
    }

    /// Leaves and comments merged in source order.
    pub fn tokens_with_trivia(&self) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self.root.leaves().chain(&self.comments).collect();
        tokens.sort_by_key(|t| t.span.start);
        tokens
    }

    /// Rebuilds source text from token texts, copying the whitespace between
    /// tokens from `source`. Equals `source` for the text this tree came from.
    pub fn reconstruct(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for token in self.tokens_with_trivia() {
            out.push_str(&source[cursor..token.span.start]);
            out.push_str(&token.text);
            cursor = token.span.end;
        }
        out.push_str(&source[cursor..]);
        out
    }

    pub fn to_sexp(&self) -> String {
        self.root.to_sexp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Position;

    fn leaf(kind: TokenKind, text: &str, start: usize) -> Node {
        let pos = Position {
            line: 1,
            column: start + 1,
        };
        Node::Leaf(Token::new(kind, Span::new(start, start + text.len(), pos), text))
    }

    fn sample() -> Node {
        // READ x ;
        let ident = Node::Branch(Branch {
            kind: Nonterminal::Identifier,
            rule: Rule::IdentifierPlain,
            span: Span::new(5, 6, Position { line: 1, column: 6 }),
            children: vec![leaf(TokenKind::Pidentifier, "x", 5)],
        });
        Node::Branch(Branch {
            kind: Nonterminal::Command,
            rule: Rule::CommandRead,
            span: Span::new(0, 7, Position::START),
            children: vec![
                leaf(TokenKind::Read, "READ", 0),
                ident,
                leaf(TokenKind::Semicolon, ";", 6),
            ],
        })
    }

    #[test]
    fn sexp_skips_anonymous_leaves() {
        assert_eq!(sample().to_sexp(), "(command (identifier (pidentifier)))");
    }

    #[test]
    fn walk_is_preorder() {
        let names: Vec<_> = sample().walk().map(|n| n.kind().name()).collect();
        assert_eq!(names, vec!["command", "READ", "identifier", "pidentifier", ";"]);
    }

    #[test]
    fn descendant_at_finds_deepest_node() {
        let tree = sample();
        let node = tree.descendant_at(5).unwrap();
        assert_eq!(node.text(), Some("x"));
        assert_eq!(tree.descendant_at(2).unwrap().text(), Some("READ"));
        assert!(tree.descendant_at(40).is_none());
    }

    #[test]
    fn same_shape_ignores_spans() {
        let a = sample();
        let mut b = sample();
        if let Node::Branch(branch) = &mut b {
            branch.span = Span::default();
        }
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&leaf(TokenKind::Read, "READ", 0)));
    }

    #[test]
    fn long_chains_drop_without_recursion() {
        let mut node = leaf(TokenKind::Num, "1", 0);
        for _ in 0..200_000 {
            node = Node::Branch(Branch {
                kind: Nonterminal::Value,
                rule: Rule::ValueNum,
                span: Span::new(0, 1, Position::START),
                children: vec![node],
            });
        }
        assert_eq!(node.walk().count(), 200_001);
        drop(node);
    }
}
