//! Fixed-point equivalence-preserving rewriter (spec §4.5).
//!
//! The post-order visitor simplifies every child first, then tries each of the
//! 13 rules below in order and rewrites on first match. The whole pass repeats
//! until a full sweep makes no change.

use std::rc::Rc;

use crate::core::decl::{VarRef, VariableDeclaration};
use crate::core::formula::{ComparisonOperator, Formula};
use crate::core::term::Term;

/// Three-valued result of the equality helper backing rule 9: never confuses
/// "provably unequal" with "can't tell".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tri {
    True,
    False,
    Unknown,
}

fn and_tri(a: Tri, b: Tri) -> Tri {
    match (a, b) {
        (Tri::False, _) | (_, Tri::False) => Tri::False,
        (Tri::True, Tri::True) => Tri::True,
        _ => Tri::Unknown,
    }
}

fn or_tri(a: Tri, b: Tri) -> Tri {
    match (a, b) {
        (Tri::True, _) | (_, Tri::True) => Tri::True,
        (Tri::False, Tri::False) => Tri::False,
        _ => Tri::Unknown,
    }
}

fn term_eq(a: &Term, b: &Term) -> Tri {
    match (a, b) {
        (Term::Integer(x), Term::Integer(y)) => tri_bool(x == y),
        (Term::SpecialInteger(x), Term::SpecialInteger(y)) => tri_bool(x == y),
        (Term::String(x), Term::String(y)) => tri_bool(x == y),
        (Term::Boolean(x), Term::Boolean(y)) => tri_bool(x == y),
        (Term::Variable(x), Term::Variable(y)) => tri_bool(Rc::ptr_eq(x, y)),
        (Term::Function(d1, a1), Term::Function(d2, a2)) => {
            if !Rc::ptr_eq(d1, d2) || a1.len() != a2.len() {
                return Tri::False;
            }
            a1.iter().zip(a2.iter()).fold(Tri::True, |acc, (x, y)| and_tri(acc, term_eq(x, y)))
        }
        (Term::BinaryOperation(op1, l1, r1), Term::BinaryOperation(op2, l2, r2)) => {
            if op1 != op2 {
                return Tri::False;
            }
            if op1.is_commutative() {
                or_tri(
                    and_tri(term_eq(l1, l2), term_eq(r1, r2)),
                    and_tri(term_eq(l1, r2), term_eq(r1, l2)),
                )
            } else {
                and_tri(term_eq(l1, l2), term_eq(r1, r2))
            }
        }
        (Term::UnaryOperation(op1, a), Term::UnaryOperation(op2, b)) => {
            if op1 != op2 {
                Tri::False
            } else {
                term_eq(a, b)
            }
        }
        (Term::Interval(f1, t1), Term::Interval(f2, t2)) => and_tri(term_eq(f1, f2), term_eq(t1, t2)),
        _ => Tri::False,
    }
}

fn tri_bool(b: bool) -> Tri {
    if b {
        Tri::True
    } else {
        Tri::False
    }
}

/// Greedy multiset comparison for the commutative n-ary connectives (And, Or).
/// Not a full bipartite matching; a leftover element whose only candidates are
/// Unknown reports Unknown rather than False, per the helper's no-false-positive contract.
fn multiset_eq(a: &[Formula], b: &[Formula]) -> Tri {
    if a.len() != b.len() {
        return Tri::False;
    }
    let mut used = vec![false; b.len()];
    let mut saw_unknown = false;
    for fa in a {
        let mut matched = false;
        for (j, fb) in b.iter().enumerate() {
            if used[j] {
                continue;
            }
            match formula_eq(fa, fb) {
                Tri::True => {
                    used[j] = true;
                    matched = true;
                    break;
                }
                Tri::Unknown => saw_unknown = true,
                Tri::False => {}
            }
        }
        if !matched {
            return if saw_unknown { Tri::Unknown } else { Tri::False };
        }
    }
    Tri::True
}

fn formula_eq(a: &Formula, b: &Formula) -> Tri {
    match (a, b) {
        (Formula::Boolean(x), Formula::Boolean(y)) => tri_bool(x == y),
        (Formula::Comparison(op1, l1, r1), Formula::Comparison(op2, l2, r2)) => {
            if op1 != op2 {
                return Tri::False;
            }
            if op1.is_commutative() {
                or_tri(
                    and_tri(term_eq(l1, l2), term_eq(r1, r2)),
                    and_tri(term_eq(l1, r2), term_eq(r1, l2)),
                )
            } else {
                and_tri(term_eq(l1, l2), term_eq(r1, r2))
            }
        }
        (Formula::In(a1, b1), Formula::In(a2, b2)) => and_tri(term_eq(a1, a2), term_eq(b1, b2)),
        (Formula::Predicate(d1, a1), Formula::Predicate(d2, a2)) => {
            if !Rc::ptr_eq(d1, d2) || a1.len() != a2.len() {
                return Tri::False;
            }
            a1.iter().zip(a2.iter()).fold(Tri::True, |acc, (x, y)| and_tri(acc, term_eq(x, y)))
        }
        (Formula::Not(x), Formula::Not(y)) => formula_eq(x, y),
        (Formula::And(x), Formula::And(y)) | (Formula::Or(x), Formula::Or(y)) => multiset_eq(x, y),
        (Formula::Implies(a1, b1), Formula::Implies(a2, b2)) => and_tri(formula_eq(a1, a2), formula_eq(b1, b2)),
        (Formula::Biconditional(a1, b1), Formula::Biconditional(a2, b2)) => or_tri(
            and_tri(formula_eq(a1, a2), formula_eq(b1, b2)),
            and_tri(formula_eq(a1, b2), formula_eq(b1, a2)),
        ),
        (Formula::Exists(v1, f1), Formula::Exists(v2, f2)) | (Formula::ForAll(v1, f1), Formula::ForAll(v2, f2)) => {
            if v1.len() != v2.len() || !v1.iter().zip(v2.iter()).all(|(x, y)| Rc::ptr_eq(x, y)) {
                Tri::Unknown
            } else {
                formula_eq(f1, f2)
            }
        }
        _ => Tri::False,
    }
}

fn term_contains_var(term: &Term, var: &VarRef) -> bool {
    match term {
        Term::Variable(v) => VarRef(v.clone()) == *var,
        _ => term.children().iter().any(|c| term_contains_var(c, var)),
    }
}

fn substitute_var_with_term(formula: &mut Formula, var: &VarRef, replacement: &Term) {
    match formula {
        Formula::Comparison(_, l, r) | Formula::In(l, r) => {
            substitute_term_with_term(l, var, replacement);
            substitute_term_with_term(r, var, replacement);
        }
        Formula::Predicate(_, args) => {
            for a in args {
                substitute_term_with_term(a, var, replacement);
            }
        }
        _ => {}
    }
    for child in formula.children_mut() {
        substitute_var_with_term(child, var, replacement);
    }
}

fn substitute_term_with_term(term: &mut Term, var: &VarRef, replacement: &Term) {
    if let Term::Variable(v) = term {
        if VarRef(v.clone()) == *var {
            *term = replacement.clone();
            return;
        }
    }
    for child in term.children_mut() {
        substitute_term_with_term(child, var, replacement);
    }
}

fn is_integer_sorted(term: &Term) -> bool {
    use crate::core::decl::Sort;
    match term {
        Term::Integer(_) => true,
        Term::Variable(v) => v.sort.get() == Sort::Integer,
        _ => false,
    }
}

/// Applies the 13 rewrite rules (in order) to `formula`'s top level, assuming
/// its children are already in fixed-point form. Returns `None` if none apply.
fn try_rules(formula: &Formula) -> Option<Formula> {
    // 1. ¬¬F ⇒ F.
    if let Formula::Not(inner) = formula {
        if let Formula::Not(f) = inner.as_ref() {
            return Some(f.as_ref().clone());
        }
    }

    // 2. ∃x (x = y ∧ …) ⇒ ∃(rest) (…[y/x]) when x ∈ bound vars, y doesn't mention x.
    if let Formula::Exists(vars, inner) = formula {
        if let Formula::And(conjuncts) = inner.as_ref() {
            for (i, c) in conjuncts.iter().enumerate() {
                if let Formula::Comparison(ComparisonOperator::Equal, l, r) = c {
                    if let Some((var_decl, y)) = pick_eliminable(vars, l, r) {
                        let var_ref = VarRef(var_decl.clone());
                        let new_vars: Vec<Rc<VariableDeclaration>> =
                            vars.iter().filter(|v| !Rc::ptr_eq(v, &var_decl)).cloned().collect();
                        let mut rest: Vec<Formula> =
                            conjuncts.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, f)| f.clone()).collect();
                        for f in &mut rest {
                            substitute_var_with_term(f, &var_ref, &y);
                        }
                        return Some(Formula::exists(new_vars, Formula::and(rest)));
                    }
                }
            }
        }
    }

    // 3. ∃x (x = y) ⇒ ⊤ when x is a bound var and y doesn't mention x.
    if let Formula::Exists(vars, inner) = formula {
        if let Formula::Comparison(ComparisonOperator::Equal, l, r) = inner.as_ref() {
            if pick_eliminable(vars, l, r).is_some() {
                return Some(Formula::Boolean(true));
            }
        }
    }

    // 4. Empty conjunction ⇒ ⊤.
    if let Formula::And(args) = formula {
        if args.is_empty() {
            return Some(Formula::Boolean(true));
        }
    }

    // 5. ⊤/⊥-only quantifier body collapses the quantifier.
    if let Formula::Exists(_, inner) | Formula::ForAll(_, inner) = formula {
        if let Formula::Boolean(b) = inner.as_ref() {
            return Some(Formula::Boolean(*b));
        }
    }

    // 6. One-element conjunction/disjunction ⇒ its element.
    if let Formula::And(args) | Formula::Or(args) = formula {
        if args.len() == 1 {
            return Some(args[0].clone());
        }
    }

    // 7. ∃()/∀() F ⇒ F.
    if let Formula::Exists(vars, inner) | Formula::ForAll(vars, inner) = formula {
        if vars.is_empty() {
            return Some(inner.as_ref().clone());
        }
    }

    // 8. In(a, b), both primitive ⇒ a = b.
    if let Formula::In(a, b) = formula {
        if a.is_primitive() && b.is_primitive() {
            return Some(Formula::Comparison(ComparisonOperator::Equal, a.clone(), b.clone()));
        }
    }

    // 9. Biconditional subsumption: (F ↔ F ∧ G) ⇒ (F → G).
    if let Formula::Biconditional(lhs, rhs) = formula {
        if let Some(implication) = try_subsumption(lhs, rhs) {
            return Some(implication);
        }
        if let Some(implication) = try_subsumption(rhs, lhs) {
            return Some(implication);
        }
    }

    // 10. ¬(F ∧ G) ⇒ ¬F ∨ ¬G.
    if let Formula::Not(inner) = formula {
        if let Formula::And(args) = inner.as_ref() {
            return Some(Formula::Or(args.iter().map(|a| Formula::Not(Box::new(a.clone()))).collect()));
        }
    }

    // 11. (¬F ∨ G) ⇒ (F → G).
    if let Formula::Or(args) = formula {
        if args.len() >= 2 {
            if let Some(i) = args.iter().position(|a| matches!(a, Formula::Not(_))) {
                if let Formula::Not(f) = &args[i] {
                    let rest: Vec<Formula> = args.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, a)| a.clone()).collect();
                    return Some(Formula::Implies(f.clone(), Box::new(Formula::or(rest))));
                }
            }
        }
    }

    // 12. ¬(a ⊙ b) ⇒ a ⊙̄ b.
    if let Formula::Not(inner) = formula {
        if let Formula::Comparison(op, l, r) = inner.as_ref() {
            return Some(Formula::Comparison(op.complement(), l.clone(), r.clone()));
        }
    }

    // 13. In(a, b) both known Integer-sorted ⇒ a = b.
    if let Formula::In(a, b) = formula {
        if is_integer_sorted(a) && is_integer_sorted(b) {
            return Some(Formula::Comparison(ComparisonOperator::Equal, a.clone(), b.clone()));
        }
    }

    None
}

/// Returns `(x, y)` if one of `l`/`r` is a variable in `vars` and the other
/// term does not mention it — the precondition shared by rules 2 and 3.
fn pick_eliminable(
    vars: &[Rc<VariableDeclaration>],
    l: &Term,
    r: &Term,
) -> Option<(Rc<VariableDeclaration>, Term)> {
    if let Term::Variable(v) = l {
        if vars.iter().any(|b| Rc::ptr_eq(b, v)) && !term_contains_var(r, &VarRef(v.clone())) {
            return Some((v.clone(), r.clone()));
        }
    }
    if let Term::Variable(v) = r {
        if vars.iter().any(|b| Rc::ptr_eq(b, v)) && !term_contains_var(l, &VarRef(v.clone())) {
            return Some((v.clone(), l.clone()));
        }
    }
    None
}

/// If `rhs` is a conjunction containing a conjunct equal (per [formula_eq]) to
/// `lhs`, returns `lhs → (rest of rhs)`.
fn try_subsumption(lhs: &Formula, rhs: &Formula) -> Option<Formula> {
    let Formula::And(conjuncts) = rhs else {
        return None;
    };
    let i = conjuncts.iter().position(|c| formula_eq(lhs, c) == Tri::True)?;
    let rest: Vec<Formula> = conjuncts.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, f)| f.clone()).collect();
    Some(Formula::Implies(Box::new(lhs.clone()), Box::new(Formula::and(rest))))
}

fn simplify_once(formula: &Formula) -> (Formula, bool) {
    let mut changed = false;
    let recursed = match formula {
        Formula::Boolean(_) | Formula::Comparison(..) | Formula::In(..) | Formula::Predicate(..) => formula.clone(),
        Formula::Not(a) => {
            let (a, c) = simplify_once(a);
            changed |= c;
            Formula::Not(Box::new(a))
        }
        Formula::And(args) => {
            let args = args
                .iter()
                .map(|a| {
                    let (a, c) = simplify_once(a);
                    changed |= c;
                    a
                })
                .collect();
            Formula::And(args)
        }
        Formula::Or(args) => {
            let args = args
                .iter()
                .map(|a| {
                    let (a, c) = simplify_once(a);
                    changed |= c;
                    a
                })
                .collect();
            Formula::Or(args)
        }
        Formula::Implies(a, b) => {
            let (a, c1) = simplify_once(a);
            let (b, c2) = simplify_once(b);
            changed |= c1 || c2;
            Formula::Implies(Box::new(a), Box::new(b))
        }
        Formula::Biconditional(a, b) => {
            let (a, c1) = simplify_once(a);
            let (b, c2) = simplify_once(b);
            changed |= c1 || c2;
            Formula::Biconditional(Box::new(a), Box::new(b))
        }
        Formula::Exists(vars, inner) => {
            let (inner, c) = simplify_once(inner);
            changed |= c;
            Formula::Exists(vars.clone(), Box::new(inner))
        }
        Formula::ForAll(vars, inner) => {
            let (inner, c) = simplify_once(inner);
            changed |= c;
            Formula::ForAll(vars.clone(), Box::new(inner))
        }
    };

    match try_rules(&recursed) {
        Some(rewritten) => (rewritten, true),
        None => (recursed, changed),
    }
}

/// Simplifies `formula` to a fixed point: repeats full passes until one makes
/// no change anywhere in the tree.
pub(crate) fn simplify(formula: Formula) -> Formula {
    let mut current = formula;
    loop {
        let (next, changed) = simplify_once(&current);
        current = next;
        if !changed {
            return current;
        }
    }
}
