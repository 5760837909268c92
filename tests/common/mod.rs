//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use jftt::syntax::{Node, NodeKind, Rule, Symbol};

pub fn programs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/programs")
}

pub fn invalid_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/invalid")
}

/// `(file name, contents)` of every sample program, sorted by name.
pub fn sample_programs() -> Vec<(String, String)> {
    let mut entries: Vec<_> = fs::read_dir(programs_dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "imp"))
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&p).unwrap())
        })
        .collect()
}

pub fn read_program(name: &str) -> String {
    fs::read_to_string(programs_dir().join(name)).unwrap()
}

/// Wraps commands in a minimal main block.
pub fn in_main(commands: &str) -> String {
    format!("PROGRAM IS BEGIN {commands} END")
}

/// Asserts that every branch matches the production it claims to be reduced by.
pub fn assert_grammar_membership(root: &Node) {
    for node in root.walk() {
        let Node::Branch(branch) = node else { continue };
        let production = branch.rule.production();
        assert_eq!(branch.kind, production.lhs, "{:?}", branch.rule);
        let children: Vec<NodeKind> = branch.children.iter().map(Node::kind).collect();
        let expected: Vec<NodeKind> = production
            .rhs
            .iter()
            .map(|s| match *s {
                Symbol::Terminal(k) => NodeKind::Terminal(k),
                Symbol::Nonterminal(n) => NodeKind::Nonterminal(n),
            })
            .collect();
        assert_eq!(children, expected, "children of {:?}", branch.rule);
    }
}

/// Every node reduced by `rule`, in pre-order.
pub fn nodes_with_rule(root: &Node, rule: Rule) -> Vec<&Node> {
    root.walk().filter(|n| n.rule() == Some(rule)).collect()
}
