//! Defines the command-line arguments and subcommands for the jftt CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "jftt",
    version,
    about = "Scanner and LALR(1) parser for the JFTT teaching language."
)]
pub struct JfttArgs {
    /// Raise the log level (-v info, -vv debug, -vvv trace). RUST_LOG wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream of a source file.
    Tokens {
        /// The path to the source file to scan.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print the concrete syntax tree of a source file.
    Parse {
        /// The path to the source file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Emit the tree as JSON instead of an S-expression.
        #[arg(long, conflicts_with = "pretty")]
        json: bool,
        /// Emit an indented tree that includes keywords and punctuation.
        #[arg(long)]
        pretty: bool,
    },
    /// Syntax-check files; directories are searched recursively.
    Check {
        /// Files or directories to check.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Render errors as plain caret diagrams instead of miette reports.
        #[arg(long)]
        plain: bool,
    },
    /// List the grammar's productions and the size of its parse tables.
    Grammar,
}
