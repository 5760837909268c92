//! The JFTT context-free grammar.
//!
//! Every alternative of every nonterminal is a [`Production`] with its own
//! [`Rule`] tag. The LALR(1) tables in [`super::table`] are computed from
//! [`PRODUCTIONS`]; the tree builder tags each branch with the rule it was
//! reduced by.

use serde::Serialize;

use super::TokenKind;

// ============================================================================
// SYMBOLS
// ============================================================================

/// Syntactic categories. Discriminants are dense for goto-table indexing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Nonterminal {
    ProgramAll,
    Procedures,
    ProcedureDef,
    Main,
    Commands,
    Command,
    ProcHead,
    ProcCall,
    Declarations,
    ArgsDecl,
    Args,
    Expression,
    Value,
    Identifier,
    Condition,
}

impl Nonterminal {
    pub const COUNT: usize = Nonterminal::Condition as usize + 1;

    pub const ALL: [Nonterminal; Nonterminal::COUNT] = [
        Nonterminal::ProgramAll,
        Nonterminal::Procedures,
        Nonterminal::ProcedureDef,
        Nonterminal::Main,
        Nonterminal::Commands,
        Nonterminal::Command,
        Nonterminal::ProcHead,
        Nonterminal::ProcCall,
        Nonterminal::Declarations,
        Nonterminal::ArgsDecl,
        Nonterminal::Args,
        Nonterminal::Expression,
        Nonterminal::Value,
        Nonterminal::Identifier,
        Nonterminal::Condition,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable snake_case tag used in S-expressions and by tree consumers.
    pub fn name(self) -> &'static str {
        match self {
            Nonterminal::ProgramAll => "program_all",
            Nonterminal::Procedures => "procedures",
            Nonterminal::ProcedureDef => "procedure_def",
            Nonterminal::Main => "main",
            Nonterminal::Commands => "commands",
            Nonterminal::Command => "command",
            Nonterminal::ProcHead => "proc_head",
            Nonterminal::ProcCall => "proc_call",
            Nonterminal::Declarations => "declarations",
            Nonterminal::ArgsDecl => "args_decl",
            Nonterminal::Args => "args",
            Nonterminal::Expression => "expression",
            Nonterminal::Value => "value",
            Nonterminal::Identifier => "identifier",
            Nonterminal::Condition => "condition",
        }
    }

    /// The productions whose left-hand side is `self`.
    pub fn productions(self) -> impl Iterator<Item = &'static Production> {
        PRODUCTIONS.iter().filter(move |p| p.lhs == self)
    }
}

impl std::fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A grammar symbol: a token kind or a syntactic category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Symbol {
    Terminal(TokenKind),
    Nonterminal(Nonterminal),
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(kind) => write!(f, "{}", kind),
            Symbol::Nonterminal(nt) => write!(f, "{}", nt),
        }
    }
}

// ============================================================================
// PRODUCTIONS
// ============================================================================

/// Identity of a single alternative. Discriminants index [`PRODUCTIONS`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rule {
    ProgramWithProcedures,
    ProgramMainOnly,

    ProceduresMany,
    ProceduresOne,

    ProcedureWithDeclarations,
    ProcedureWithoutDeclarations,

    MainIsWithDeclarations,
    MainIsWithoutDeclarations,
    MainWithDeclarations,
    MainWithoutDeclarations,

    CommandsMany,
    CommandsOne,

    CommandAssign,
    CommandIfElse,
    CommandIf,
    CommandWhile,
    CommandRepeat,
    CommandForTo,
    CommandForDownto,
    CommandCall,
    CommandRead,
    CommandWrite,

    ProcHeadWithParams,
    ProcHeadEmpty,

    ProcCallWithArgs,
    ProcCallEmpty,

    DeclarationsAppendScalar,
    DeclarationsAppendArray,
    DeclarationsScalar,
    DeclarationsArray,

    ArgsDeclAppendScalar,
    ArgsDeclAppendArray,
    ArgsDeclScalar,
    ArgsDeclArray,

    ArgsAppend,
    ArgsOne,

    ExpressionValue,
    ExpressionAdd,
    ExpressionSub,
    ExpressionMul,
    ExpressionDiv,
    ExpressionMod,

    ValueNum,
    ValueIdentifier,

    IdentifierPlain,
    IdentifierIndexedByName,
    IdentifierIndexedByNum,

    ConditionEq,
    ConditionNotEq,
    ConditionGt,
    ConditionLt,
    ConditionGtEq,
    ConditionLtEq,
}

impl Rule {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn production(self) -> &'static Production {
        &PRODUCTIONS[self.index()]
    }

    pub fn lhs(self) -> Nonterminal {
        self.production().lhs
    }
}

/// `lhs := rhs`, tagged with its [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Production {
    pub rule: Rule,
    pub lhs: Nonterminal,
    pub rhs: &'static [Symbol],
}

impl Production {
    pub fn arity(&self) -> usize {
        self.rhs.len()
    }
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} :=", self.lhs)?;
        for symbol in self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// The start symbol of the language.
pub const START: Nonterminal = Nonterminal::ProgramAll;

macro_rules! rhs {
    (@one (T $kind:ident)) => { Symbol::Terminal(TokenKind::$kind) };
    (@one $nt:ident) => { Symbol::Nonterminal(Nonterminal::$nt) };
    ($($sym:tt)*) => { &[$(rhs!(@one $sym)),*] };
}

macro_rules! productions {
    ($($rule:ident : $lhs:ident => [$($sym:tt)*];)*) => {
        &[$(Production {
            rule: Rule::$rule,
            lhs: Nonterminal::$lhs,
            rhs: rhs!($($sym)*),
        }),*]
    };
}

/// All productions, in [`Rule`] order.
pub static PRODUCTIONS: &[Production] = productions! {
    ProgramWithProcedures: ProgramAll => [Procedures Main];
    ProgramMainOnly: ProgramAll => [Main];

    ProceduresMany: Procedures => [Procedures ProcedureDef];
    ProceduresOne: Procedures => [ProcedureDef];

    ProcedureWithDeclarations: ProcedureDef =>
        [(T Procedure) ProcHead (T Is) Declarations (T Begin) Commands (T End)];
    ProcedureWithoutDeclarations: ProcedureDef =>
        [(T Procedure) ProcHead (T Is) (T Begin) Commands (T End)];

    MainIsWithDeclarations: Main =>
        [(T Program) (T Is) Declarations (T Begin) Commands (T End)];
    MainIsWithoutDeclarations: Main => [(T Program) (T Is) (T Begin) Commands (T End)];
    MainWithDeclarations: Main => [(T Program) Declarations (T Begin) Commands (T End)];
    MainWithoutDeclarations: Main => [(T Program) (T Begin) Commands (T End)];

    CommandsMany: Commands => [Commands Command];
    CommandsOne: Commands => [Command];

    CommandAssign: Command => [Identifier (T Assign) Expression (T Semicolon)];
    CommandIfElse: Command =>
        [(T If) Condition (T Then) Commands (T Else) Commands (T Endif)];
    CommandIf: Command => [(T If) Condition (T Then) Commands (T Endif)];
    CommandWhile: Command => [(T While) Condition (T Do) Commands (T Endwhile)];
    CommandRepeat: Command => [(T Repeat) Commands (T Until) Condition (T Semicolon)];
    CommandForTo: Command => [
        (T For) (T Pidentifier) (T From) Value (T To) Value (T Do) Commands (T Endfor)
    ];
    CommandForDownto: Command => [
        (T For) (T Pidentifier) (T From) Value (T Downto) Value (T Do) Commands (T Endfor)
    ];
    CommandCall: Command => [ProcCall (T Semicolon)];
    CommandRead: Command => [(T Read) Identifier (T Semicolon)];
    CommandWrite: Command => [(T Write) Value (T Semicolon)];

    ProcHeadWithParams: ProcHead => [(T Pidentifier) (T LParen) ArgsDecl (T RParen)];
    ProcHeadEmpty: ProcHead => [(T Pidentifier) (T LParen) (T RParen)];

    ProcCallWithArgs: ProcCall => [(T Pidentifier) (T LParen) Args (T RParen)];
    ProcCallEmpty: ProcCall => [(T Pidentifier) (T LParen) (T RParen)];

    DeclarationsAppendScalar: Declarations => [Declarations (T Comma) (T Pidentifier)];
    DeclarationsAppendArray: Declarations => [
        Declarations (T Comma) (T Pidentifier) (T LBracket) (T Num) (T Colon) (T Num) (T RBracket)
    ];
    DeclarationsScalar: Declarations => [(T Pidentifier)];
    DeclarationsArray: Declarations =>
        [(T Pidentifier) (T LBracket) (T Num) (T Colon) (T Num) (T RBracket)];

    ArgsDeclAppendScalar: ArgsDecl => [ArgsDecl (T Comma) (T Pidentifier)];
    ArgsDeclAppendArray: ArgsDecl => [ArgsDecl (T Comma) (T ArrayMarker) (T Pidentifier)];
    ArgsDeclScalar: ArgsDecl => [(T Pidentifier)];
    ArgsDeclArray: ArgsDecl => [(T ArrayMarker) (T Pidentifier)];

    ArgsAppend: Args => [Args (T Comma) (T Pidentifier)];
    ArgsOne: Args => [(T Pidentifier)];

    ExpressionValue: Expression => [Value];
    ExpressionAdd: Expression => [Value (T Plus) Value];
    ExpressionSub: Expression => [Value (T Minus) Value];
    ExpressionMul: Expression => [Value (T Star) Value];
    ExpressionDiv: Expression => [Value (T Slash) Value];
    ExpressionMod: Expression => [Value (T Percent) Value];

    ValueNum: Value => [(T Num)];
    ValueIdentifier: Value => [Identifier];

    IdentifierPlain: Identifier => [(T Pidentifier)];
    IdentifierIndexedByName: Identifier =>
        [(T Pidentifier) (T LBracket) (T Pidentifier) (T RBracket)];
    IdentifierIndexedByNum: Identifier => [(T Pidentifier) (T LBracket) (T Num) (T RBracket)];

    ConditionEq: Condition => [Value (T Eq) Value];
    ConditionNotEq: Condition => [Value (T NotEq) Value];
    ConditionGt: Condition => [Value (T Gt) Value];
    ConditionLt: Condition => [Value (T Lt) Value];
    ConditionGtEq: Condition => [Value (T GtEq) Value];
    ConditionLtEq: Condition => [Value (T LtEq) Value];
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn productions_are_in_rule_order() {
        for (i, production) in PRODUCTIONS.iter().enumerate() {
            assert_eq!(production.rule.index(), i, "{:?} out of place", production.rule);
        }
    }

    #[test]
    fn every_nonterminal_has_a_production() {
        for nt in Nonterminal::ALL {
            assert!(nt.productions().next().is_some(), "{} is never defined", nt);
        }
    }

    #[test]
    fn no_production_is_empty_or_mentions_trivia() {
        for production in PRODUCTIONS {
            assert!(production.arity() > 0, "{}", production);
            assert!(!production
                .rhs
                .iter()
                .any(|s| matches!(s, Symbol::Terminal(TokenKind::Comment | TokenKind::Eof))));
        }
    }

    #[test]
    fn command_has_ten_alternatives() {
        assert_eq!(Nonterminal::Command.productions().count(), 10);
    }

    #[test]
    fn production_display() {
        assert_eq!(
            Rule::CommandRead.production().to_string(),
            "command := 'READ' identifier ';'"
        );
    }
}
