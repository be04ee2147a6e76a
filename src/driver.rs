//! Pipeline sequencing (spec §4.9), grounded in `anthem/Context.h`'s bundling
//! of per-run options with the symbol table, and `anthem/output/Logger.h`'s
//! priority-gated logger.
//!
//! Per-file pipeline: Parse → Translate rules → [Completion] → [Hidden-predicate
//! elimination] → [Integer-variable detection] → [Simplification] →
//! [Domain unification] → Emit. Each bracketed step is optional, gated by
//! [Options].

use std::io::Write;

use crate::completion;
use crate::core::context::Context;
use crate::core::formula::Formula;
use crate::domain;
use crate::emit;
use crate::error::{HiddenEliminationFailure, Location, TranslationFailure, Warning};
use crate::hidden;
use crate::integer_detect;
use crate::parser::asp;
use crate::simplify;
use crate::source;
use crate::translate::rule::{translate_rule, RuleOutput};

/// Severity a logged message is gated by (`anthem::output::Priority`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Priority {
    Debug,
    Info,
    Warning,
    Error,
}

/// Which target format [emit] prints into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmitFormat {
    Human,
    Tptp,
}

/// Whether the output requires classical logic or the logic of here-and-there
/// (spec §4.9): negation in a body, or a choice rule, raises this irreversibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Semantics {
    ClassicalLogic,
    LogicOfHereAndThere,
}

impl Semantics {
    fn raise(&mut self) -> bool {
        if *self == Semantics::ClassicalLogic {
            *self = Semantics::LogicOfHereAndThere;
            true
        } else {
            false
        }
    }
}

/// Minimal logger: priority-gated writes to an output stream, mirroring
/// `anthem::output::Logger`'s `setOutputPriority`/`log` pair.
pub(crate) struct Logger<W: Write> {
    output: W,
    output_priority: Priority,
}

impl<W: Write> Logger<W> {
    pub(crate) fn new(output: W, output_priority: Priority) -> Self {
        Self { output, output_priority }
    }

    pub(crate) fn log(&mut self, priority: Priority, message: &str) {
        if priority >= self.output_priority {
            let _ = writeln!(self.output, "{message}");
        }
    }

    pub(crate) fn log_at(&mut self, priority: Priority, location: &Location, message: &str) {
        if priority >= self.output_priority {
            let _ = writeln!(self.output, "{location} {message}");
        }
    }

    pub(crate) fn warn(&mut self, warning: &Warning) {
        self.log(Priority::Warning, &warning.to_string());
    }

    pub(crate) fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }
}

/// Which optional pipeline steps run, and which target the result is emitted for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Options {
    pub(crate) complete: bool,
    pub(crate) eliminate_hidden: bool,
    pub(crate) detect_integers: bool,
    pub(crate) simplify: bool,
    pub(crate) unify_domain: bool,
    pub(crate) emit_format: EmitFormat,
    pub(crate) parentheses: emit::ParenthesisStyle,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            complete: false,
            eliminate_hidden: false,
            detect_integers: false,
            simplify: false,
            unify_domain: false,
            emit_format: EmitFormat::Human,
            parentheses: emit::ParenthesisStyle::Normal,
        }
    }
}

fn apply_show_external(statements: &[source::Statement], ctx: &mut Context, logger: &mut Logger<impl Write>) {
    let mut any_show = false;
    for statement in statements {
        match statement {
            source::Statement::Show(show) => {
                any_show = true;
                let decl = ctx.predicate(&show.name, show.arity);
                decl.visibility.set(crate::core::decl::Visibility::Visible);
                if !decl.is_used.get() {
                    logger.warn(&Warning::UnusedShow(format!("{}/{}", show.name, show.arity)));
                }
            }
            source::Statement::External(external) => {
                let decl = ctx.predicate(&external.name, external.arity);
                decl.is_external.set(true);
                if !decl.is_used.get() {
                    logger.warn(&Warning::UnmatchedExternal(format!("{}/{}", external.name, external.arity)));
                }
            }
            source::Statement::Rule(_) => {}
        }
    }
    // Absent #show, every predicate defaults to visible (spec §4.7: "Default"
    // resolves to the program-wide default); a #show list without a matching
    // #external flips the default to hidden.
    ctx.default_hidden.set(any_show);
}

/// Translates a whole program (already parsed into [source::Statement]s) and
/// emits the result through `logger`. Returns accumulated warnings.
pub(crate) fn translate_statements(
    statements: Vec<source::Statement>,
    ctx: &mut Context,
    options: &Options,
    logger: &mut Logger<impl Write>,
) -> Result<Vec<Warning>, TranslationFailure> {
    let mut semantics = Semantics::ClassicalLogic;
    let mut outputs = Vec::new();

    for statement in &statements {
        if let source::Statement::Rule(rule) = statement {
            let translation = translate_rule(rule, ctx)?;
            if translation.requires_here_and_there && semantics.raise() {
                logger.warn(&Warning::SemanticsDowngradedToHereAndThere);
            }
            if matches!(translation.output, RuleOutput::Choice(_)) && semantics.raise() {
                logger.warn(&Warning::SemanticsDowngradedToHereAndThere);
            }
            outputs.push(translation.output);
        }
    }

    apply_show_external(&statements, ctx, logger);

    // Absent --complete, each rule's translation is emitted as-is: an open
    // formula whose free variables (sf.free_vars) are implicitly universally
    // closed, with no literal `forall` printed. Completion (below) instead
    // builds its own explicit ForAll per predicate definition.
    let mut theory: Vec<Formula> = if options.complete {
        completion::complete(outputs, ctx).map_err(completion_to_translation)?
    } else {
        outputs
            .into_iter()
            .map(|output| match output {
                RuleOutput::Normal(sf) | RuleOutput::Choice(sf) | RuleOutput::IntegrityConstraint(sf) => sf.formula,
            })
            .collect()
    };

    let mut warnings = Vec::new();
    if options.eliminate_hidden {
        warnings.extend(hidden::eliminate_hidden(&mut theory, ctx).map_err(hidden_to_translation)?);
    }

    if options.detect_integers {
        integer_detect::detect_integers(&theory);
    }

    if options.simplify {
        theory = theory.into_iter().map(simplify::simplify).collect();
    }

    if options.unify_domain {
        let (rewritten, _symbols) = domain::unify(theory, ctx);
        theory = rewritten;
    }

    match options.emit_format {
        EmitFormat::Human => {
            for formula in &theory {
                let rendered = emit::human::render(formula, options.parentheses);
                let _ = writeln!(logger.output_mut(), "{rendered}");
            }
        }
        EmitFormat::Tptp => {
            emit::tptp::render_preamble(logger.output_mut());
            for (i, formula) in theory.iter().enumerate() {
                let rendered = emit::tptp::render(formula, &format!("formula_{i}"), emit::tptp::Role::Axiom);
                let _ = writeln!(logger.output_mut(), "{rendered}");
            }
        }
    }

    Ok(warnings)
}

fn completion_to_translation(err: crate::error::CompletionFailure) -> TranslationFailure {
    TranslationFailure::Other {
        location: Location::unknown(),
        message: err.to_string(),
    }
}

fn hidden_to_translation(err: HiddenEliminationFailure) -> TranslationFailure {
    TranslationFailure::Other {
        location: Location::unknown(),
        message: err.to_string(),
    }
}

/// Reads and translates each file in turn (spec §6 Driver: `translate(files, context)`).
pub(crate) fn translate_files(
    files: &[String],
    ctx: &mut Context,
    options: &Options,
    logger: &mut Logger<impl Write>,
) -> Result<Vec<Warning>, TranslationFailure> {
    let mut warnings = Vec::new();
    if files.is_empty() {
        let content = crate::util::read_stdin();
        warnings.extend(translate_stream(&content, "<stdin>", ctx, options, logger)?);
        return Ok(warnings);
    }
    for file in files {
        let content = crate::util::read_file_to_string(file);
        warnings.extend(translate_stream(&content, file, ctx, options, logger)?);
    }
    Ok(warnings)
}

/// Translates a single named stream (spec §6 Driver: `translate(file_name, stream, context)`).
pub(crate) fn translate_stream(
    content: &str,
    file_name: &str,
    ctx: &mut Context,
    options: &Options,
    logger: &mut Logger<impl Write>,
) -> Result<Vec<Warning>, TranslationFailure> {
    let statements = asp::parse_program(content, file_name).map_err(|message| TranslationFailure::Other {
        location: Location {
            file: file_name.to_string(),
            line_start: 0,
            col_start: 0,
            line_end: 0,
            col_end: 0,
        },
        message,
    })?;
    translate_statements(statements, ctx, options, logger)
}

/// Not part of the core's contract; used only by tests to check a single rule
/// end to end without going through the parser.
#[cfg(test)]
pub(crate) fn rule_outputs_to_theory(outputs: Vec<RuleOutput>) -> Vec<Formula> {
    outputs
        .into_iter()
        .map(|output| match output {
            RuleOutput::Normal(sf) | RuleOutput::Choice(sf) | RuleOutput::IntegrityConstraint(sf) => sf.formula,
        })
        .collect()
}
