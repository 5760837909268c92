//! The jftt Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. File handling lives here; the syntax engine
//! only ever sees strings.

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use miette::{IntoDiagnostic, Report, WrapErr};
use walkdir::WalkDir;

use crate::{
    diagnostics::{self, SourceContext},
    syntax::{self, tables},
};

pub mod args;
pub mod output;

use args::{Command, JfttArgs};

/// Extensions picked up when `check` walks a directory.
const SOURCE_EXTENSIONS: &[&str] = &["imp", "txt"];

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = JfttArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Tokens { file } => handle_tokens(&file),
        Command::Parse { file, json, pretty } => handle_parse(&file, json, pretty),
        Command::Check { paths, plain } => handle_check(&paths, plain),
        Command::Grammar => {
            output::print_grammar(tables());
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(report) => {
            eprintln!("{report:?}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

// ============================================================================
// SUBCOMMAND HANDLERS
// ============================================================================

/// Each handler returns `Ok(false)` when the input was rejected and the
/// diagnostic has already been printed.
type HandlerResult = Result<bool, Report>;

fn handle_tokens(path: &Path) -> HandlerResult {
    let source = read_source(path)?;
    let tokens = syntax::tokenize(&source.content)
        .map_err(|e| diagnostics::report(e.into(), &source))?;
    output::print_tokens(&tokens);
    Ok(true)
}

fn handle_parse(path: &Path, json: bool, pretty: bool) -> HandlerResult {
    let source = read_source(path)?;
    let tree = syntax::parse(&source.content).map_err(|e| diagnostics::report(e, &source))?;
    if json {
        let text = serde_json::to_string_pretty(&tree)
            .into_diagnostic()
            .wrap_err("failed to serialize the syntax tree")?;
        println!("{text}");
    } else if pretty {
        print!("{}", tree.root().pretty());
    } else {
        println!("{}", tree.to_sexp());
    }
    Ok(true)
}

fn handle_check(paths: &[PathBuf], plain: bool) -> HandlerResult {
    let files = discover_sources(paths)?;
    log::info!("checking {} file(s)", files.len());

    let mut passed = 0;
    let mut failed = 0;
    for file in &files {
        let source = read_source(file)?;
        match syntax::parse(&source.content) {
            Ok(_) => {
                passed += 1;
                output::print_ok(file);
            }
            Err(err) => {
                failed += 1;
                if plain {
                    output::print_failure_header(file);
                    eprint!("{}", diagnostics::format_plain(&err, &source.content));
                } else {
                    eprintln!("{:?}", diagnostics::report(err, &source));
                }
            }
        }
    }

    if files.len() > 1 {
        output::print_summary(passed, failed);
    }
    Ok(failed == 0)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn read_source(path: &Path) -> Result<SourceContext, Report> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(SourceContext::new(path.display().to_string(), content))
}

/// Expands directories into the source files below them, sorted by path.
fn discover_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>, Report> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to walk {}", path.display()))?;
            let is_source = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
            if is_source {
                log::info!("found {}", entry.path().display());
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}
