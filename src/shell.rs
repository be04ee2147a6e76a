//! Imperative shell for translating ASP programs into first-order logic.
//!
//! Parses a [Cli] from the process arguments, wires it into [driver::Options]
//! and a [driver::Logger], and runs [driver::translate_files].

use std::io::stdout;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use crate::core::context::Context;
use crate::driver::{self, EmitFormat, Logger, Options, Priority};
use crate::emit::ParenthesisStyle;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Tptp,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Parentheses {
    Normal,
    Full,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogPriority {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogPriority> for Priority {
    fn from(value: LogPriority) -> Self {
        match value {
            LogPriority::Debug => Priority::Debug,
            LogPriority::Info => Priority::Info,
            LogPriority::Warning => Priority::Warning,
            LogPriority::Error => Priority::Error,
        }
    }
}

/// Translates ASP rules into first-order logic formulas.
#[derive(Debug, Parser)]
#[command(name = "htlogic", version, about)]
struct Cli {
    /// Input files; reads standard input if none are given.
    files: Vec<String>,

    /// Group per-predicate definitions into a completed first-order theory.
    #[arg(long)]
    complete: bool,

    /// Inline predicates not declared visible by `#show`.
    #[arg(long)]
    eliminate_hidden: bool,

    /// Infer integer-sorted variables over the completed theory.
    #[arg(long)]
    detect_integers: bool,

    /// Apply the simplification rewrite rules to a fixed point.
    #[arg(long)]
    simplify: bool,

    /// Rewrite for a single-sorted emission target.
    #[arg(long)]
    unify_domain: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Parenthesization style for the human-readable format.
    #[arg(long, value_enum, default_value = "normal")]
    parentheses: Parentheses,

    /// Minimum severity logged to standard error.
    #[arg(long, value_enum, default_value = "warning")]
    log_priority: LogPriority,
}

/// Main entry point; translates every given file (or standard input) in turn.
pub fn main(args: Vec<String>) -> ExitCode {
    crate::panic::install_panic_hook();

    let cli = Cli::parse_from(args);
    let options = Options {
        complete: cli.complete,
        eliminate_hidden: cli.eliminate_hidden,
        detect_integers: cli.detect_integers,
        simplify: cli.simplify,
        unify_domain: cli.unify_domain,
        emit_format: match cli.format {
            OutputFormat::Human => EmitFormat::Human,
            OutputFormat::Tptp => EmitFormat::Tptp,
        },
        parentheses: match cli.parentheses {
            Parentheses::Normal => ParenthesisStyle::Normal,
            Parentheses::Full => ParenthesisStyle::Full,
        },
    };

    let mut ctx = Context::new();
    let mut logger = Logger::new(stdout(), cli.log_priority.into());

    match driver::translate_files(&cli.files, &mut ctx, &options, &mut logger) {
        Ok(warnings) => {
            for warning in &warnings {
                logger.warn(warning);
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{} {failure}", failure.location());
            ExitCode::FAILURE
        }
    }
}
