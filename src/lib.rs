//! jftt: the syntactic front end of the JFTT teaching language.
//!
//! Source text goes through a DFA scanner and an LALR(1) shift-reduce
//! parser and comes out as a concrete syntax tree, or as a single
//! [`ParseError`] pointing at the first offending character or token.
//!
//! ```rust
//! let source = "PROCEDURE swap(T a, i) IS BEGIN a[i] := 0; END\n\
//!               PROGRAM IS t[1:10] BEGIN swap(t, x); END";
//! let tree = jftt::parse(source).unwrap();
//! assert_eq!(tree.root().kind().name(), "program_all");
//! ```

pub use crate::diagnostics::SourceContext;
pub use crate::syntax::{parse, tokenize, ParseError, ParseTree};

pub mod cli;
pub mod diagnostics;
pub mod syntax;
