//! Capture-safe deep copy and dangling-variable repair (spec §4.1).
//!
//! These two operations are the load-bearing primitives behind every pass
//! that splices a subtree from one scope into another: choice-rule unfolding
//! (§4.3), hidden-predicate inlining (§4.7).

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::decl::VarRef;
use super::formula::Formula;
use super::scoped::ScopedFormula;
use super::term::Term;

/// Produces a structural deep copy of `formula` with every bound-variable
/// declaration freshly allocated and every reference to it rebound to the
/// fresh copy. Free variables (those not bound by an `Exists`/`ForAll`
/// encountered during the walk) keep their original declaration reference.
///
/// Cloning `Exists([x], P(x))` inside another formula produces
/// `Exists([x'], P(x'))` with a fresh `x'`. Cloning
/// `Exists([x], P(x)) ∧ Q(x)` (with `x` free in `Q`, bound in `Exists`) keeps
/// `Q(x)`'s reference pointing to the outer `x` and introduces a fresh `x'`
/// only inside the `Exists`, since the substitution is scoped to that subtree.
pub(crate) fn prepare_copy(formula: &Formula) -> Formula {
    let mut map = HashMap::new();
    copy_formula(formula, &mut map)
}

fn copy_formula(formula: &Formula, map: &mut HashMap<VarRef, Rc<super::decl::VariableDeclaration>>) -> Formula {
    match formula {
        Formula::Boolean(b) => Formula::Boolean(*b),
        Formula::Comparison(op, l, r) => Formula::Comparison(*op, copy_term(l, map), copy_term(r, map)),
        Formula::In(a, b) => Formula::In(copy_term(a, map), copy_term(b, map)),
        Formula::Predicate(decl, args) => {
            Formula::Predicate(decl.clone(), args.iter().map(|a| copy_term(a, map)).collect())
        }
        Formula::Not(a) => Formula::Not(Box::new(copy_formula(a, map))),
        Formula::And(args) => Formula::And(args.iter().map(|a| copy_formula(a, map)).collect()),
        Formula::Or(args) => Formula::Or(args.iter().map(|a| copy_formula(a, map)).collect()),
        Formula::Implies(a, b) => Formula::Implies(Box::new(copy_formula(a, map)), Box::new(copy_formula(b, map))),
        Formula::Biconditional(a, b) => {
            Formula::Biconditional(Box::new(copy_formula(a, map)), Box::new(copy_formula(b, map)))
        }
        Formula::Exists(vars, inner) => {
            let (fresh, inserted) = bind_fresh(vars, map);
            let inner = copy_formula(inner, map);
            unbind(inserted, map);
            Formula::Exists(fresh, Box::new(inner))
        }
        Formula::ForAll(vars, inner) => {
            let (fresh, inserted) = bind_fresh(vars, map);
            let inner = copy_formula(inner, map);
            unbind(inserted, map);
            Formula::ForAll(fresh, Box::new(inner))
        }
    }
}

fn bind_fresh(
    vars: &[Rc<super::decl::VariableDeclaration>],
    map: &mut HashMap<VarRef, Rc<super::decl::VariableDeclaration>>,
) -> (Vec<Rc<super::decl::VariableDeclaration>>, Vec<VarRef>) {
    let mut fresh = Vec::with_capacity(vars.len());
    let mut inserted = Vec::with_capacity(vars.len());
    for v in vars {
        let clone = v.clone_fresh();
        let key = VarRef(v.clone());
        map.insert(key.clone(), clone.clone());
        inserted.push(key);
        fresh.push(clone);
    }
    (fresh, inserted)
}

fn unbind(
    inserted: Vec<VarRef>,
    map: &mut HashMap<VarRef, Rc<super::decl::VariableDeclaration>>,
) {
    for key in inserted {
        map.remove(&key);
    }
}

fn copy_term(term: &Term, map: &mut HashMap<VarRef, Rc<super::decl::VariableDeclaration>>) -> Term {
    match term {
        Term::Integer(i) => Term::Integer(*i),
        Term::SpecialInteger(s) => Term::SpecialInteger(*s),
        Term::String(s) => Term::String(s.clone()),
        Term::Boolean(b) => Term::Boolean(*b),
        Term::Function(decl, args) => Term::Function(decl.clone(), args.iter().map(|a| copy_term(a, map)).collect()),
        Term::Variable(decl) => {
            let key = VarRef(decl.clone());
            Term::Variable(map.get(&key).cloned().unwrap_or_else(|| decl.clone()))
        }
        Term::BinaryOperation(op, l, r) => {
            Term::BinaryOperation(*op, Box::new(copy_term(l, map)), Box::new(copy_term(r, map)))
        }
        Term::UnaryOperation(op, a) => Term::UnaryOperation(*op, Box::new(copy_term(a, map))),
        Term::Interval(from, to) => Term::Interval(Box::new(copy_term(from, map)), Box::new(copy_term(to, map))),
    }
}

/// Replaces every reference to a variable declaration in `map`'s keys with its
/// mapped declaration, everywhere in `formula`. Used by [crate::completion] to
/// rewrite each defining rule's own head variables to a predicate-wide
/// canonical parameter list before grouping rules by head predicate.
///
/// Safe to apply unconditionally (without binder-scoped bookkeeping like
/// [prepare_copy]/[fix_dangling]): every key is a free variable of `formula`'s
/// owning `ScopedFormula`, so by the "bound declarations are exclusively owned
/// by their Exists/ForAll node" invariant, no inner binder can also reference it.
pub(crate) fn substitute_free_vars(
    formula: &mut Formula,
    map: &HashMap<VarRef, Rc<super::decl::VariableDeclaration>>,
) {
    match formula {
        Formula::Comparison(_, l, r) | Formula::In(l, r) => {
            substitute_term(l, map);
            substitute_term(r, map);
        }
        Formula::Predicate(_, args) => {
            for a in args {
                substitute_term(a, map);
            }
        }
        _ => {}
    }
    for child in formula.children_mut() {
        substitute_free_vars(child, map);
    }
}

fn substitute_term(term: &mut Term, map: &HashMap<VarRef, Rc<super::decl::VariableDeclaration>>) {
    match term {
        Term::Variable(decl) => {
            if let Some(replacement) = map.get(&VarRef(decl.clone())) {
                *decl = replacement.clone();
            }
        }
        Term::Function(_, args) => {
            for a in args {
                substitute_term(a, map);
            }
        }
        Term::BinaryOperation(_, l, r) => {
            substitute_term(l, map);
            substitute_term(r, map);
        }
        Term::UnaryOperation(_, a) => substitute_term(a, map),
        Term::Interval(from, to) => {
            substitute_term(from, map);
            substitute_term(to, map);
        }
        Term::Integer(_) | Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) => {}
    }
}

/// Collects `formula`'s free variable references: those not bound by an
/// `Exists`/`ForAll` encountered on the path to them. First-occurrence order,
/// deduplicated by declaration identity. This is how a rule's translation
/// recovers its true free-variable list after the fact, rather than tracking
/// it incrementally during construction (see [crate::translate::RuleScope]).
pub(crate) fn collect_free_vars(formula: &Formula) -> Vec<Rc<super::decl::VariableDeclaration>> {
    let mut bound: HashSet<VarRef> = HashSet::new();
    let mut seen: HashSet<VarRef> = HashSet::new();
    let mut out = Vec::new();
    collect_formula(formula, &mut bound, &mut seen, &mut out);
    out
}

fn collect_formula(
    formula: &Formula,
    bound: &mut HashSet<VarRef>,
    seen: &mut HashSet<VarRef>,
    out: &mut Vec<Rc<super::decl::VariableDeclaration>>,
) {
    match formula {
        Formula::Boolean(_) => {}
        Formula::Comparison(_, l, r) | Formula::In(l, r) => {
            collect_term(l, bound, seen, out);
            collect_term(r, bound, seen, out);
        }
        Formula::Predicate(_, args) => {
            for a in args {
                collect_term(a, bound, seen, out);
            }
        }
        Formula::Not(a) => collect_formula(a, bound, seen, out),
        Formula::And(args) | Formula::Or(args) => {
            for a in args {
                collect_formula(a, bound, seen, out);
            }
        }
        Formula::Implies(a, b) | Formula::Biconditional(a, b) => {
            collect_formula(a, bound, seen, out);
            collect_formula(b, bound, seen, out);
        }
        Formula::Exists(vars, inner) | Formula::ForAll(vars, inner) => {
            let added: Vec<VarRef> = vars.iter().map(|v| VarRef(v.clone())).collect();
            for a in &added {
                bound.insert(a.clone());
            }
            collect_formula(inner, bound, seen, out);
            for a in &added {
                bound.remove(a);
            }
        }
    }
}

fn collect_term(
    term: &Term,
    bound: &HashSet<VarRef>,
    seen: &mut HashSet<VarRef>,
    out: &mut Vec<Rc<super::decl::VariableDeclaration>>,
) {
    match term {
        Term::Variable(decl) => {
            let key = VarRef(decl.clone());
            if !bound.contains(&key) && seen.insert(key) {
                out.push(decl.clone());
            }
        }
        Term::Function(_, args) => {
            for a in args {
                collect_term(a, bound, seen, out);
            }
        }
        Term::BinaryOperation(_, l, r) => {
            collect_term(l, bound, seen, out);
            collect_term(r, bound, seen, out);
        }
        Term::UnaryOperation(_, a) => collect_term(a, bound, seen, out),
        Term::Interval(from, to) => {
            collect_term(from, bound, seen, out);
            collect_term(to, bound, seen, out);
        }
        Term::Integer(_) | Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) => {}
    }
}

/// Walks `sf.formula`; any variable reference whose declaration is not visible
/// through an enclosing binder and is not already in `sf.free_vars` is
/// redeclared as a fresh free variable (preserving kind and display name) and
/// rewritten to point to it. All occurrences of the same dangling declaration
/// map to the same new declaration.
pub(crate) fn fix_dangling(mut sf: ScopedFormula) -> ScopedFormula {
    let mut visible: HashSet<VarRef> = sf.free_vars.iter().map(|v| VarRef(v.clone())).collect();
    let mut replacements = HashMap::new();
    let mut new_free = Vec::new();
    fix_formula(&mut sf.formula, &mut visible, &mut replacements, &mut new_free);
    sf.free_vars.extend(new_free);
    sf
}

fn fix_formula(
    formula: &mut Formula,
    visible: &mut HashSet<VarRef>,
    replacements: &mut HashMap<VarRef, Rc<super::decl::VariableDeclaration>>,
    new_free: &mut Vec<Rc<super::decl::VariableDeclaration>>,
) {
    match formula {
        Formula::Boolean(_) => {}
        Formula::Comparison(_, l, r) | Formula::In(l, r) => {
            fix_term(l, visible, replacements, new_free);
            fix_term(r, visible, replacements, new_free);
        }
        Formula::Predicate(_, args) => {
            for a in args {
                fix_term(a, visible, replacements, new_free);
            }
        }
        Formula::Not(a) => fix_formula(a, visible, replacements, new_free),
        Formula::And(args) | Formula::Or(args) => {
            for a in args {
                fix_formula(a, visible, replacements, new_free);
            }
        }
        Formula::Implies(a, b) | Formula::Biconditional(a, b) => {
            fix_formula(a, visible, replacements, new_free);
            fix_formula(b, visible, replacements, new_free);
        }
        Formula::Exists(vars, inner) | Formula::ForAll(vars, inner) => {
            let added: Vec<VarRef> = vars.iter().map(|v| VarRef(v.clone())).collect();
            for a in &added {
                visible.insert(a.clone());
            }
            fix_formula(inner, visible, replacements, new_free);
            for a in &added {
                visible.remove(a);
            }
        }
    }
}

fn fix_term(
    term: &mut Term,
    visible: &HashSet<VarRef>,
    replacements: &mut HashMap<VarRef, Rc<super::decl::VariableDeclaration>>,
    new_free: &mut Vec<Rc<super::decl::VariableDeclaration>>,
) {
    match term {
        Term::Variable(decl) => {
            let key = VarRef(decl.clone());
            if !visible.contains(&key) {
                let replacement = replacements
                    .entry(key)
                    .or_insert_with(|| {
                        let fresh = decl.clone_fresh();
                        new_free.push(fresh.clone());
                        fresh
                    })
                    .clone();
                *decl = replacement;
            }
        }
        Term::Function(_, args) => {
            for a in args {
                fix_term(a, visible, replacements, new_free);
            }
        }
        Term::BinaryOperation(_, l, r) => {
            fix_term(l, visible, replacements, new_free);
            fix_term(r, visible, replacements, new_free);
        }
        Term::UnaryOperation(_, a) => fix_term(a, visible, replacements, new_free),
        Term::Interval(from, to) => {
            fix_term(from, visible, replacements, new_free);
            fix_term(to, visible, replacements, new_free);
        }
        Term::Integer(_) | Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) => {}
    }
}
