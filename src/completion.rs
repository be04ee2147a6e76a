//! Clark completion (spec §4.4): groups rule-translation output by head
//! predicate into a universally closed biconditional.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use itertools::Itertools;

use crate::core::context::Context;
use crate::core::copy::substitute_free_vars;
use crate::core::decl::{PredicateDeclaration, Sort, VarKind, VarRef};
use crate::core::formula::Formula;
use crate::core::scoped::ScopedFormula;
use crate::core::term::Term;
use crate::error::CompletionFailure;
use crate::translate::rule::RuleOutput;

/// Groups the head atom's argument variables out of a `Normal` rule's
/// `Implies(antecedent, Predicate(decl, args))` shape, validating the §4.4 contract.
fn split_normal(sf: &ScopedFormula) -> Result<(&Formula, &Rc<PredicateDeclaration>, &[Term]), CompletionFailure> {
    match &sf.formula {
        Formula::Implies(antecedent, consequent) => match consequent.as_ref() {
            Formula::Predicate(decl, args) => Ok((antecedent.as_ref(), decl, args)),
            _ => Err(CompletionFailure::ConsequentNotAtom),
        },
        _ => Err(CompletionFailure::NotAConditional),
    }
}

/// Picks the head atom's predicate out of a `Choice` rule's
/// `Implies(Predicate(decl, args), conditions)` shape (the reverse of
/// [split_normal]'s Normal-rule shape, per `translate::rule`'s choice direction).
fn choice_predicate(sf: &ScopedFormula) -> Result<&Rc<PredicateDeclaration>, CompletionFailure> {
    match &sf.formula {
        Formula::Implies(atom, _) => match atom.as_ref() {
            Formula::Predicate(decl, _) => Ok(decl),
            _ => Err(CompletionFailure::ConsequentNotAtom),
        },
        _ => Err(CompletionFailure::NotAConditional),
    }
}

/// Produces the completed first-order theory: one closed formula per used,
/// non-external predicate (biconditional, or a negation when undefined), plus
/// one closed one-way implication per choice-rule output and one closed
/// negation per integrity constraint.
pub(crate) fn complete(
    outputs: Vec<RuleOutput>,
    ctx: &mut Context,
) -> Result<Vec<Formula>, CompletionFailure> {
    let mut normals_by_predicate: HashMap<*const PredicateDeclaration, Vec<ScopedFormula>> = HashMap::new();
    let mut choices = Vec::new();
    let mut constraints = Vec::new();

    for output in outputs {
        match output {
            RuleOutput::Normal(sf) => {
                let (_, decl, _) = split_normal(&sf)?;
                normals_by_predicate
                    .entry(Rc::as_ptr(decl))
                    .or_default()
                    .push(sf);
            }
            RuleOutput::Choice(sf) => choices.push(sf),
            RuleOutput::IntegrityConstraint(sf) => constraints.push(sf),
        }
    }

    let mut choice_predicates = std::collections::HashSet::new();
    for sf in &choices {
        choice_predicates.insert(Rc::as_ptr(choice_predicate(sf)?));
    }

    let mut theory = Vec::new();

    for decl in ctx.predicates() {
        if !decl.is_used.get() || decl.is_external.get() {
            continue;
        }
        // A predicate defined only by choice rules has no `Normal` output to
        // group here; its completed formula is the one-way implication built
        // below, not the "no defining rule ⇒ ¬p" fallback.
        if !normals_by_predicate.contains_key(&Rc::as_ptr(decl)) && choice_predicates.contains(&Rc::as_ptr(decl)) {
            continue;
        }
        let canonical_vars: Vec<_> = (0..decl.arity)
            .map(|i| ctx.fresh_variable(VarKind::Head, format!("V{}", i + 1), Sort::Unknown))
            .collect();
        let atom = Formula::predicate(decl.clone(), canonical_vars.iter().map(|v| Term::Variable(v.clone())).collect());

        let rules = normals_by_predicate.get(&Rc::as_ptr(decl));
        let completed = match rules {
            None => Formula::Not(Box::new(atom)),
            Some(rules) => {
                let mut disjuncts = Vec::with_capacity(rules.len());
                for sf in rules {
                    let (antecedent, _, args) = split_normal(sf)?;
                    let mut rename = HashMap::new();
                    let mut head_vars = Vec::new();
                    for (arg, canonical) in args.iter().zip_eq(canonical_vars.iter()) {
                        match arg {
                            Term::Variable(v) => {
                                rename.insert(VarRef(v.clone()), canonical.clone());
                                head_vars.push(VarRef(v.clone()));
                            }
                            _ => return Err(CompletionFailure::ConsequentNotAtom),
                        }
                    }
                    let mut antecedent = antecedent.clone();
                    substitute_free_vars(&mut antecedent, &rename);
                    let exist_vars: Vec<_> = sf
                        .free_vars
                        .iter()
                        .filter(|v| !head_vars.contains(&VarRef((*v).clone())))
                        .cloned()
                        .collect();
                    disjuncts.push(Formula::exists(exist_vars, antecedent));
                }
                Formula::Biconditional(Box::new(atom), Box::new(Formula::or(disjuncts)))
            }
        };
        theory.push(Formula::ForAll(canonical_vars, Box::new(completed)));
    }

    for sf in choices {
        theory.push(Formula::ForAll(sf.free_vars, Box::new(sf.formula)));
    }
    for sf in constraints {
        theory.push(Formula::ForAll(sf.free_vars, Box::new(sf.formula)));
    }

    Ok(theory)
}
