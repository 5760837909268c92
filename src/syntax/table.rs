//! LALR(1) action/goto tables.
//!
//! Tables are computed from a production list by the classic item-set
//! construction: states are identified by their LR(0) core and carry LR(1)
//! lookahead sets, which are propagated along goto edges with a worklist
//! until nothing changes. The result is the LALR(1) automaton.
//!
//! Conflict policy:
//! - shift/reduce resolves to shift (this is what attaches an `ELSE` to the
//!   nearest open `IF`); each resolution is recorded and logged;
//! - reduce/reduce aborts construction with [`GrammarConflict`].
//!
//! The tables for the built-in grammar are built once, on first use, and
//! shared read-only by every parse through [`tables`].

use std::collections::{BTreeMap, HashMap, VecDeque};

use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

use super::grammar::{self, Nonterminal, Production, Rule, Symbol, PRODUCTIONS};
use super::TokenKind;

pub type StateId = usize;

/// One cell of the action table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    Shift(StateId),
    Reduce(Rule),
    Accept,
    Error,
}

/// Raised when the grammar is not LALR(1) under the shift-preference policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarConflict {
    #[error("reduce/reduce conflict in state {state} on {terminal}: {first:?} vs {second:?}")]
    ReduceReduce {
        state: StateId,
        terminal: TokenKind,
        first: Rule,
        second: Rule,
    },
    #[error("accept/reduce conflict in state {state} on end of input: {rule:?}")]
    AcceptReduce { state: StateId, rule: Rule },
    #[error("rule {rule:?} labels more than one production")]
    DuplicateRule { rule: Rule },
}

/// A shift/reduce conflict that was settled in favour of the shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedConflict {
    pub state: StateId,
    pub terminal: TokenKind,
    pub shift_to: StateId,
    pub discarded: Rule,
}

// ============================================================================
// LOOKAHEAD SETS AND ITEMS
// ============================================================================

/// Bit set over [`TokenKind`] indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
struct TerminalSet(u64);

const _: () = assert!(TokenKind::COUNT <= 64);

impl TerminalSet {
    fn single(kind: TokenKind) -> Self {
        Self(1 << kind.index())
    }

    /// Adds `other` into `self`; true if anything new was added.
    fn union(&mut self, other: TerminalSet) -> bool {
        let before = self.0;
        self.0 |= other.0;
        self.0 != before
    }

    fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL
            .into_iter()
            .filter(move |k| self.0 & (1 << k.index()) != 0)
    }
}

/// `production` with a dot before `rhs[dot]`. The production index one past
/// the end of the list denotes the augmented `start' := start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    production: usize,
    dot: usize,
}

type ItemSet = BTreeMap<Item, TerminalSet>;

// ============================================================================
// CONSTRUCTION
// ============================================================================

struct Builder<'g> {
    productions: &'g [Production],
    augmented: [Symbol; 1],
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl<'g> Builder<'g> {
    fn new(productions: &'g [Production], start: Nonterminal) -> Self {
        let mut builder = Self {
            productions,
            augmented: [Symbol::Nonterminal(start)],
            first: vec![TerminalSet::default(); Nonterminal::COUNT],
            nullable: vec![false; Nonterminal::COUNT],
        };
        builder.compute_first_sets();
        builder
    }

    fn augmented_index(&self) -> usize {
        self.productions.len()
    }

    fn rhs(&self, production: usize) -> &[Symbol] {
        if production == self.augmented_index() {
            &self.augmented
        } else {
            self.productions[production].rhs
        }
    }

    fn compute_first_sets(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions {
                let lhs = production.lhs.index();
                let mut all_nullable = true;
                for symbol in production.rhs {
                    match *symbol {
                        Symbol::Terminal(kind) => {
                            changed |= self.first[lhs].union(TerminalSet::single(kind));
                            all_nullable = false;
                        }
                        Symbol::Nonterminal(nt) => {
                            let first = self.first[nt.index()];
                            changed |= self.first[lhs].union(first);
                            if !self.nullable[nt.index()] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    /// FIRST(`symbols` `lookahead`).
    fn first_of(&self, symbols: &[Symbol], lookahead: TerminalSet) -> TerminalSet {
        let mut set = TerminalSet::default();
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(kind) => {
                    set.union(TerminalSet::single(kind));
                    return set;
                }
                Symbol::Nonterminal(nt) => {
                    set.union(self.first[nt.index()]);
                    if !self.nullable[nt.index()] {
                        return set;
                    }
                }
            }
        }
        set.union(lookahead);
        set
    }

    fn closure(&self, kernel: &ItemSet) -> ItemSet {
        let mut items = kernel.clone();
        let mut work: Vec<Item> = items.keys().copied().collect();
        while let Some(item) = work.pop() {
            let lookahead = items[&item];
            let rhs = self.rhs(item.production);
            let Some(Symbol::Nonterminal(nt)) = rhs.get(item.dot).copied() else {
                continue;
            };
            let follow = self.first_of(&rhs[item.dot + 1..], lookahead);
            for (index, production) in self.productions.iter().enumerate() {
                if production.lhs != nt {
                    continue;
                }
                let fresh = Item {
                    production: index,
                    dot: 0,
                };
                if items.entry(fresh).or_default().union(follow) {
                    work.push(fresh);
                }
            }
        }
        items
    }

    /// Kernels reached from a closed item set, keyed by the symbol crossed.
    fn successors(&self, closed: &ItemSet) -> BTreeMap<Symbol, ItemSet> {
        let mut next: BTreeMap<Symbol, ItemSet> = BTreeMap::new();
        for (item, lookahead) in closed {
            if let Some(&symbol) = self.rhs(item.production).get(item.dot) {
                let advanced = Item {
                    production: item.production,
                    dot: item.dot + 1,
                };
                next.entry(symbol)
                    .or_default()
                    .entry(advanced)
                    .or_default()
                    .union(*lookahead);
            }
        }
        next
    }

    /// LALR(1) kernels and their transitions.
    fn automaton(&self) -> (Vec<ItemSet>, Vec<BTreeMap<Symbol, StateId>>) {
        let initial: ItemSet = [(
            Item {
                production: self.augmented_index(),
                dot: 0,
            },
            TerminalSet::single(TokenKind::Eof),
        )]
        .into_iter()
        .collect();

        let mut kernels = vec![initial];
        let mut transitions = vec![BTreeMap::new()];
        let mut by_core: HashMap<Vec<Item>, StateId> = HashMap::new();
        by_core.insert(kernels[0].keys().copied().collect(), 0);

        let mut queue = VecDeque::from([0]);
        let mut queued = vec![true];

        while let Some(state) = queue.pop_front() {
            queued[state] = false;
            let closed = self.closure(&kernels[state]);
            for (symbol, kernel) in self.successors(&closed) {
                let core: Vec<Item> = kernel.keys().copied().collect();
                let target = match by_core.get(&core) {
                    Some(&id) => {
                        let mut grew = false;
                        for (item, lookahead) in kernel {
                            grew |= kernels[id].entry(item).or_default().union(lookahead);
                        }
                        if grew && !queued[id] {
                            queued[id] = true;
                            queue.push_back(id);
                        }
                        id
                    }
                    None => {
                        let id = kernels.len();
                        kernels.push(kernel);
                        transitions.push(BTreeMap::new());
                        queued.push(true);
                        queue.push_back(id);
                        by_core.insert(core, id);
                        id
                    }
                };
                transitions[state].insert(symbol, target);
            }
        }
        (kernels, transitions)
    }
}

// ============================================================================
// TABLES
// ============================================================================

/// Immutable action/goto tables, together with the grammar they were built from.
#[derive(Debug, Clone)]
pub struct ParseTables {
    productions: HashMap<Rule, &'static Production>,
    action: Vec<Vec<Action>>,
    goto: Vec<Vec<Option<StateId>>>,
    resolved: Vec<ResolvedConflict>,
}

impl ParseTables {
    pub const INITIAL_STATE: StateId = 0;

    /// Builds the tables for `productions` with `start` as the start symbol.
    pub fn build(
        productions: &'static [Production],
        start: Nonterminal,
    ) -> Result<Self, GrammarConflict> {
        let mut by_rule = HashMap::with_capacity(productions.len());
        for production in productions {
            if by_rule.insert(production.rule, production).is_some() {
                return Err(GrammarConflict::DuplicateRule {
                    rule: production.rule,
                });
            }
        }

        let builder = Builder::new(productions, start);
        let (kernels, transitions) = builder.automaton();

        let mut action = vec![vec![Action::Error; TokenKind::COUNT]; kernels.len()];
        let mut goto = vec![vec![None; Nonterminal::COUNT]; kernels.len()];
        let mut resolved = Vec::new();

        for (state, kernel) in kernels.iter().enumerate() {
            for (symbol, &target) in &transitions[state] {
                match *symbol {
                    Symbol::Terminal(kind) => action[state][kind.index()] = Action::Shift(target),
                    Symbol::Nonterminal(nt) => goto[state][nt.index()] = Some(target),
                }
            }

            for (item, lookahead) in builder.closure(kernel) {
                if item.dot < builder.rhs(item.production).len() {
                    continue;
                }
                if item.production == builder.augmented_index() {
                    let cell = &mut action[state][TokenKind::Eof.index()];
                    if let Action::Reduce(rule) = *cell {
                        return Err(GrammarConflict::AcceptReduce { state, rule });
                    }
                    *cell = Action::Accept;
                    continue;
                }

                let rule = productions[item.production].rule;
                for terminal in lookahead.iter() {
                    let cell = &mut action[state][terminal.index()];
                    match *cell {
                        Action::Error => *cell = Action::Reduce(rule),
                        Action::Shift(shift_to) => {
                            log::debug!(
                                "state {state}: shift/reduce on {terminal} resolved as shift (dropped {rule:?})"
                            );
                            resolved.push(ResolvedConflict {
                                state,
                                terminal,
                                shift_to,
                                discarded: rule,
                            });
                        }
                        Action::Reduce(existing) if existing == rule => {}
                        Action::Reduce(existing) => {
                            return Err(GrammarConflict::ReduceReduce {
                                state,
                                terminal,
                                first: existing,
                                second: rule,
                            });
                        }
                        Action::Accept => {
                            return Err(GrammarConflict::AcceptReduce { state, rule });
                        }
                    }
                }
            }
        }

        log::debug!(
            "built LALR(1) tables: {} states, {} shift/reduce resolutions",
            action.len(),
            resolved.len()
        );
        Ok(Self {
            productions: by_rule,
            action,
            goto,
            resolved,
        })
    }

    /// The production `rule` labels in this grammar.
    pub fn production(&self, rule: Rule) -> Option<&'static Production> {
        self.productions.get(&rule).copied()
    }

    pub fn action(&self, state: StateId, lookahead: TokenKind) -> Action {
        self.action[state][lookahead.index()]
    }

    pub fn goto(&self, state: StateId, nonterminal: Nonterminal) -> Option<StateId> {
        self.goto[state][nonterminal.index()]
    }

    /// Terminals with a non-error action in `state`, in [`TokenKind`] order.
    pub fn expected(&self, state: StateId) -> Vec<TokenKind> {
        TokenKind::ALL
            .into_iter()
            .filter(|&kind| self.action(state, kind) != Action::Error)
            .collect()
    }

    pub fn state_count(&self) -> usize {
        self.action.len()
    }

    pub fn resolved_conflicts(&self) -> &[ResolvedConflict] {
        &self.resolved
    }
}

static TABLES: Lazy<ParseTables> = Lazy::new(|| {
    ParseTables::build(PRODUCTIONS, grammar::START)
        .unwrap_or_else(|conflict| panic!("built-in grammar is not LALR(1): {conflict}"))
});

/// Shared tables for the JFTT grammar.
pub fn tables() -> &'static ParseTables {
    &TABLES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TokenKind::*;
    use crate::syntax::{tokenize, Parser};

    #[test]
    fn builtin_grammar_has_no_reduce_reduce_conflicts() {
        let tables = ParseTables::build(PRODUCTIONS, grammar::START).unwrap();
        assert!(tables.state_count() > 50);
    }

    #[test]
    fn initial_state_expects_procedure_or_program() {
        let expected = tables().expected(ParseTables::INITIAL_STATE);
        assert_eq!(expected, vec![Procedure, Program]);
    }

    #[test]
    fn first_sets_of_builtin_grammar() {
        let builder = Builder::new(PRODUCTIONS, grammar::START);
        let first = |nt: Nonterminal| builder.first[nt.index()].iter().collect::<Vec<_>>();
        assert_eq!(first(Nonterminal::Value), vec![Pidentifier, Num]);
        assert_eq!(first(Nonterminal::ProgramAll), vec![Procedure, Program]);
        assert!(builder.nullable.iter().all(|n| !n));
    }

    static DANGLING: &[Production] = &[
        Production {
            rule: Rule::CommandIf,
            lhs: Nonterminal::Command,
            rhs: &[
                Symbol::Terminal(If),
                Symbol::Terminal(Num),
                Symbol::Terminal(Then),
                Symbol::Nonterminal(Nonterminal::Command),
            ],
        },
        Production {
            rule: Rule::CommandIfElse,
            lhs: Nonterminal::Command,
            rhs: &[
                Symbol::Terminal(If),
                Symbol::Terminal(Num),
                Symbol::Terminal(Then),
                Symbol::Nonterminal(Nonterminal::Command),
                Symbol::Terminal(Else),
                Symbol::Nonterminal(Nonterminal::Command),
            ],
        },
        Production {
            rule: Rule::CommandRead,
            lhs: Nonterminal::Command,
            rhs: &[Symbol::Terminal(Read)],
        },
    ];

    #[test]
    fn classic_dangling_else_resolves_to_shift() {
        let tables = ParseTables::build(DANGLING, Nonterminal::Command).unwrap();
        let resolved = tables.resolved_conflicts();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].terminal, Else);
        assert_eq!(resolved[0].discarded, Rule::CommandIf);
        assert_eq!(
            tables.action(resolved[0].state, Else),
            Action::Shift(resolved[0].shift_to)
        );
    }

    #[test]
    fn custom_tables_drive_the_parser() {
        let tables = ParseTables::build(DANGLING, Nonterminal::Command).unwrap();
        let parser = Parser::with_tables(&tables);
        let tree = parser
            .parse_tokens(tokenize("IF 1 THEN IF 2 THEN READ ELSE READ").unwrap().into_iter().map(Ok))
            .unwrap();
        assert_eq!(
            tree.productions(),
            vec![
                Rule::CommandIf,
                Rule::CommandIfElse,
                Rule::CommandRead,
                Rule::CommandRead
            ]
        );
        assert_eq!(tables.production(Rule::CommandRead).map(Production::arity), Some(1));
        assert!(tables.production(Rule::ProgramMainOnly).is_none());
    }

    static READ_ONLY: &[Production] = &[Production {
        rule: Rule::CommandRead,
        lhs: Nonterminal::Command,
        rhs: &[Symbol::Terminal(Read)],
    }];

    #[test]
    fn single_production_grammar_parses() {
        let tables = ParseTables::build(READ_ONLY, Nonterminal::Command).unwrap();
        let tree = Parser::with_tables(&tables)
            .parse_tokens(tokenize("READ").unwrap().into_iter().map(Ok))
            .unwrap();
        assert_eq!(tree.productions(), vec![Rule::CommandRead]);
        assert_eq!(tree.root().children().len(), 1);
    }

    static AMBIGUOUS: &[Production] = &[
        Production {
            rule: Rule::ProgramMainOnly,
            lhs: Nonterminal::ProgramAll,
            rhs: &[Symbol::Nonterminal(Nonterminal::Main)],
        },
        Production {
            rule: Rule::ExpressionValue,
            lhs: Nonterminal::ProgramAll,
            rhs: &[Symbol::Nonterminal(Nonterminal::Value)],
        },
        Production {
            rule: Rule::MainWithoutDeclarations,
            lhs: Nonterminal::Main,
            rhs: &[Symbol::Terminal(Num)],
        },
        Production {
            rule: Rule::ValueNum,
            lhs: Nonterminal::Value,
            rhs: &[Symbol::Terminal(Num)],
        },
    ];

    #[test]
    fn reduce_reduce_conflicts_are_reported() {
        let err = ParseTables::build(AMBIGUOUS, Nonterminal::ProgramAll).unwrap_err();
        match err {
            GrammarConflict::ReduceReduce {
                terminal,
                first,
                second,
                ..
            } => {
                assert_eq!(terminal, Eof);
                let mut pair = [first, second];
                pair.sort();
                assert_eq!(pair, [Rule::MainWithoutDeclarations, Rule::ValueNum]);
            }
            other => panic!("unexpected conflict {other:?}"),
        }
    }

    // `main := program_all` makes the start symbol's completion also a
    // reduction on end of input.
    static CYCLIC: &[Production] = &[
        Production {
            rule: Rule::ValueNum,
            lhs: Nonterminal::ProgramAll,
            rhs: &[Symbol::Terminal(Num)],
        },
        Production {
            rule: Rule::ProgramMainOnly,
            lhs: Nonterminal::ProgramAll,
            rhs: &[Symbol::Nonterminal(Nonterminal::Main)],
        },
        Production {
            rule: Rule::MainWithoutDeclarations,
            lhs: Nonterminal::Main,
            rhs: &[Symbol::Nonterminal(Nonterminal::ProgramAll)],
        },
    ];

    #[test]
    fn accept_reduce_conflicts_are_reported() {
        let err = ParseTables::build(CYCLIC, Nonterminal::ProgramAll).unwrap_err();
        assert!(
            matches!(
                err,
                GrammarConflict::AcceptReduce {
                    rule: Rule::MainWithoutDeclarations,
                    ..
                }
            ),
            "unexpected conflict {err:?}"
        );
    }

    static RELABELLED: &[Production] = &[
        Production {
            rule: Rule::CommandRead,
            lhs: Nonterminal::Command,
            rhs: &[Symbol::Terminal(Read)],
        },
        Production {
            rule: Rule::CommandRead,
            lhs: Nonterminal::Command,
            rhs: &[Symbol::Terminal(Write)],
        },
    ];

    #[test]
    fn duplicate_rule_labels_are_rejected() {
        let err = ParseTables::build(RELABELLED, Nonterminal::Command).unwrap_err();
        assert_eq!(err, GrammarConflict::DuplicateRule { rule: Rule::CommandRead });
    }

    #[test]
    fn tables_are_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>(_: &T) {}
        assert_sync(tables());
    }
}
