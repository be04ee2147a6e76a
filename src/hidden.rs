//! Hidden-predicate elimination (spec §4.7): inlines every predicate not
//! declared visible (or Default when the program-wide default is Hidden) into
//! its call sites, then drops its now-trivial definition.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::context::Context;
use crate::core::copy::prepare_copy;
use crate::core::decl::{PredicateDeclaration, VarRef, VariableDeclaration};
use crate::core::formula::Formula;
use crate::core::term::Term;
use crate::error::{HiddenEliminationFailure, Warning};

/// The four shapes spec §4.7 step 2 recognizes for a completed definition.
enum ReplacementPattern {
    /// `∀X⃗ (p(X⃗) ↔ φ)` or `p(X⃗) ↔ ψ`: replace `p(a⃗)` with `φ[X⃗ := a⃗]`.
    Biconditional { params: Vec<Rc<VariableDeclaration>>, phi: Formula },
    /// Bare `p(X⃗)`: replace every occurrence with `⊤`.
    True,
    /// `¬p(X⃗)`: replace every occurrence with `⊥`.
    False,
}

fn predicate_atom_params<'a>(
    formula: &'a Formula,
    target: &Rc<PredicateDeclaration>,
) -> Option<&'a [Rc<VariableDeclaration>]> {
    if let Formula::ForAll(vars, inner) = formula {
        if let Formula::Predicate(decl, _) = inner.as_ref() {
            if Rc::ptr_eq(decl, target) {
                return Some(vars);
            }
        }
    }
    None
}

/// Derives the replacement pattern for `target` from its completed definition `def`.
fn derive_pattern(
    def: &Formula,
    target: &Rc<PredicateDeclaration>,
) -> Result<ReplacementPattern, HiddenEliminationFailure> {
    let fail = || HiddenEliminationFailure::UnsupportedDefinitionShape { name: target.name.clone() };

    if let Formula::ForAll(vars, inner) = def {
        match inner.as_ref() {
            Formula::Biconditional(l, r) => {
                if let Formula::Predicate(decl, args) = l.as_ref() {
                    if Rc::ptr_eq(decl, target) && args_are_params(args, vars) {
                        return Ok(ReplacementPattern::Biconditional { params: vars.clone(), phi: r.as_ref().clone() });
                    }
                }
                if let Formula::Predicate(decl, args) = r.as_ref() {
                    if Rc::ptr_eq(decl, target) && args_are_params(args, vars) {
                        return Ok(ReplacementPattern::Biconditional { params: vars.clone(), phi: l.as_ref().clone() });
                    }
                }
                Err(fail())
            }
            Formula::Predicate(decl, args) if Rc::ptr_eq(decl, target) && args_are_params(args, vars) => {
                Ok(ReplacementPattern::True)
            }
            Formula::Not(inner2) => {
                if let Formula::Predicate(decl, args) = inner2.as_ref() {
                    if Rc::ptr_eq(decl, target) && args_are_params(args, vars) {
                        return Ok(ReplacementPattern::False);
                    }
                }
                Err(fail())
            }
            _ => Err(fail()),
        }
    } else if let Formula::Biconditional(l, r) = def {
        if let Formula::Predicate(decl, args) = l.as_ref() {
            if Rc::ptr_eq(decl, target) {
                let params = args.iter().filter_map(as_variable).collect::<Vec<_>>();
                if params.len() == args.len() {
                    return Ok(ReplacementPattern::Biconditional { params, phi: r.as_ref().clone() });
                }
            }
        }
        Err(fail())
    } else {
        Err(fail())
    }
}

fn as_variable(term: &Term) -> Option<Rc<VariableDeclaration>> {
    match term {
        Term::Variable(v) => Some(v.clone()),
        _ => None,
    }
}

fn args_are_params(args: &[Term], params: &[Rc<VariableDeclaration>]) -> bool {
    args.len() == params.len()
        && args.iter().zip(params.iter()).all(|(a, p)| matches!(a, Term::Variable(v) if Rc::ptr_eq(v, p)))
}

/// `true` if `formula` mentions `target` anywhere (used for the circularity check).
fn mentions_predicate(formula: &Formula, target: &Rc<PredicateDeclaration>) -> bool {
    if let Formula::Predicate(decl, _) = formula {
        if Rc::ptr_eq(decl, target) {
            return true;
        }
    }
    formula.children().iter().any(|c| mentions_predicate(c, target))
}

fn substitute_vars_with_terms(formula: &mut Formula, map: &HashMap<VarRef, Term>) {
    match formula {
        Formula::Comparison(_, l, r) | Formula::In(l, r) => {
            substitute_term_vars_with_terms(l, map);
            substitute_term_vars_with_terms(r, map);
        }
        Formula::Predicate(_, args) => {
            for a in args {
                substitute_term_vars_with_terms(a, map);
            }
        }
        _ => {}
    }
    for child in formula.children_mut() {
        substitute_vars_with_terms(child, map);
    }
}

fn substitute_term_vars_with_terms(term: &mut Term, map: &HashMap<VarRef, Term>) {
    if let Term::Variable(v) = term {
        if let Some(replacement) = map.get(&VarRef(v.clone())) {
            *term = replacement.clone();
            return;
        }
    }
    for child in term.children_mut() {
        substitute_term_vars_with_terms(child, map);
    }
}

/// Replaces every occurrence of `target(a1..an)` anywhere in `formula` with a
/// fresh `prepare_copy` of `phi` with its formal parameters substituted by the
/// occurrence's actual arguments.
fn replace_occurrences(formula: &mut Formula, target: &Rc<PredicateDeclaration>, pattern: &ReplacementPattern) {
    if let Formula::Predicate(decl, args) = formula {
        if Rc::ptr_eq(decl, target) {
            *formula = match pattern {
                ReplacementPattern::True => Formula::Boolean(true),
                ReplacementPattern::False => Formula::Boolean(false),
                ReplacementPattern::Biconditional { params, phi } => {
                    let map: HashMap<VarRef, Term> =
                        params.iter().cloned().map(VarRef).zip(args.iter().cloned()).collect();
                    let mut replacement = prepare_copy(phi);
                    substitute_vars_with_terms(&mut replacement, &map);
                    replacement
                }
            };
            return;
        }
    }
    for child in formula.children_mut() {
        replace_occurrences(child, target, pattern);
    }
}

/// Eliminates every hidden predicate from `theory` in place, in declaration
/// order, then drops the now-trivial `⊤` definitions. Predicates whose
/// definition circularly refers to themselves are skipped with a warning
/// rather than eliminated (spec §4.7 step 3: would require second-order or
/// fixed-point reasoning, which this pass refuses).
pub(crate) fn eliminate_hidden(
    theory: &mut Vec<Formula>,
    ctx: &Context,
) -> Result<Vec<Warning>, HiddenEliminationFailure> {
    let mut warnings = Vec::new();

    for decl in ctx.predicates() {
        if !decl.is_used.get() || decl.is_external.get() || !decl.is_hidden(ctx.default_hidden.get()) {
            continue;
        }
        let Some(def_index) = theory.iter().position(|f| is_definition_of(f, decl)) else {
            continue;
        };
        let pattern = derive_pattern(&theory[def_index], decl)?;
        if let ReplacementPattern::Biconditional { phi, .. } = &pattern {
            if mentions_predicate(phi, decl) {
                warnings.push(Warning::CircularHiddenPredicateSkipped(decl.name.clone()));
                continue;
            }
        }

        for (i, formula) in theory.iter_mut().enumerate() {
            if i == def_index {
                continue;
            }
            replace_occurrences(formula, decl, &pattern);
        }
        theory[def_index] = Formula::Boolean(true);
    }

    theory.retain(|f| !matches!(f, Formula::Boolean(true)));
    Ok(warnings)
}

fn is_definition_of(formula: &Formula, target: &Rc<PredicateDeclaration>) -> bool {
    predicate_atom_params(formula, target).is_some()
        || matches!(
            formula,
            Formula::ForAll(_, inner) if matches!(inner.as_ref(), Formula::Biconditional(l, r)
                if matches!(l.as_ref(), Formula::Predicate(d, _) if Rc::ptr_eq(d, target))
                || matches!(r.as_ref(), Formula::Predicate(d, _) if Rc::ptr_eq(d, target)))
        )
        || matches!(
            formula,
            Formula::ForAll(_, inner) if matches!(inner.as_ref(), Formula::Not(n)
                if matches!(n.as_ref(), Formula::Predicate(d, _) if Rc::ptr_eq(d, target)))
        )
}
