//! Integer-variable detection (spec §4.6): a fixed-point process that proves
//! some `Sort::Unknown` variables can only ever take integer values, so they
//! can be printed with a distinct variable family in the emitted output.
//!
//! The evaluator is a three-valued (four-valued, with `Error`) abstract
//! interpretation grounded in `anthem/Type.h`'s `Type{Domain, SetSize}` term
//! visitor and `anthem/Evaluation.h`'s `EvaluateFormulaVisitor`.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::decl::{Sort, VarRef, VariableDeclaration};
use crate::core::formula::{ComparisonOperator, Formula};
use crate::core::term::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    Integer,
    Symbolic,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetSize {
    Empty,
    Unit,
    Multi,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TermType {
    domain: Domain,
    set_size: SetSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eval {
    True,
    False,
    Unknown,
    Error,
}

/// Overrides the sort-derived domain of a single variable declaration, used to
/// test the "variable has sort General" hypothesis (spec §4.6 step 2) without
/// mutating the declaration itself.
struct EvalCtx {
    hypothesis: Option<(VarRef, Domain)>,
}

impl EvalCtx {
    fn default_domain_of(&self, decl: &Rc<VariableDeclaration>) -> Domain {
        if let Some((var, domain)) = &self.hypothesis {
            if *var == VarRef(decl.clone()) {
                return *domain;
            }
        }
        match decl.sort.get() {
            Sort::Integer => Domain::Integer,
            Sort::Symbolic => Domain::Symbolic,
            Sort::Unknown | Sort::Program | Sort::Union => Domain::Unknown,
        }
    }
}

fn term_type(term: &Term, ctx: &EvalCtx) -> TermType {
    match term {
        Term::Integer(_) => TermType { domain: Domain::Integer, set_size: SetSize::Unit },
        Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) => {
            TermType { domain: Domain::Symbolic, set_size: SetSize::Unit }
        }
        Term::Variable(decl) => TermType { domain: ctx.default_domain_of(decl), set_size: SetSize::Unit },
        Term::Function(decl, _) => {
            let domain = match decl.domain.get() {
                Sort::Integer => Domain::Integer,
                Sort::Symbolic => Domain::Symbolic,
                Sort::Unknown | Sort::Program | Sort::Union => Domain::Unknown,
            };
            TermType { domain, set_size: SetSize::Unit }
        }
        Term::UnaryOperation(_, inner) => {
            let t = term_type(inner, ctx);
            if t.set_size == SetSize::Empty {
                return TermType { domain: Domain::Unknown, set_size: SetSize::Empty };
            }
            if t.domain == Domain::Symbolic {
                return TermType { domain: Domain::Unknown, set_size: SetSize::Empty };
            }
            if t.domain == Domain::Integer {
                return t;
            }
            TermType { domain: Domain::Unknown, set_size: SetSize::Unknown }
        }
        Term::BinaryOperation(_, l, r) => {
            let lt = term_type(l, ctx);
            let rt = term_type(r, ctx);
            binary_type(lt, rt)
        }
        Term::Interval(from, to) => {
            let ft = term_type(from, ctx);
            let tt = term_type(to, ctx);
            if ft.set_size == SetSize::Empty || tt.set_size == SetSize::Empty {
                return TermType { domain: Domain::Unknown, set_size: SetSize::Empty };
            }
            if ft.domain == Domain::Symbolic || tt.domain == Domain::Symbolic {
                return TermType { domain: Domain::Unknown, set_size: SetSize::Empty };
            }
            if ft.domain == Domain::Unknown || tt.domain == Domain::Unknown {
                return TermType { domain: Domain::Unknown, set_size: SetSize::Unknown };
            }
            TermType { domain: Domain::Integer, set_size: SetSize::Unknown }
        }
    }
}

fn binary_type(left: TermType, right: TermType) -> TermType {
    if left.set_size == SetSize::Empty || right.set_size == SetSize::Empty {
        return TermType { domain: Domain::Unknown, set_size: SetSize::Empty };
    }
    if left.domain == Domain::Symbolic || right.domain == Domain::Symbolic {
        return TermType { domain: Domain::Unknown, set_size: SetSize::Empty };
    }
    if left.domain == Domain::Unknown || right.domain == Domain::Unknown {
        return TermType { domain: Domain::Unknown, set_size: SetSize::Unknown };
    }
    if left.set_size == SetSize::Unknown || right.set_size == SetSize::Unknown {
        return TermType { domain: Domain::Integer, set_size: SetSize::Unknown };
    }
    if left.set_size == SetSize::Multi || right.set_size == SetSize::Multi {
        return TermType { domain: Domain::Integer, set_size: SetSize::Multi };
    }
    TermType { domain: Domain::Integer, set_size: SetSize::Unit }
}

fn eval(formula: &Formula, ctx: &EvalCtx) -> Eval {
    match formula {
        Formula::Boolean(b) => {
            if *b {
                Eval::True
            } else {
                Eval::False
            }
        }
        Formula::And(args) => {
            let mut some_unknown = false;
            for a in args {
                match eval(a, ctx) {
                    Eval::Error => return Eval::Error,
                    Eval::True => {}
                    Eval::False => return Eval::False,
                    Eval::Unknown => some_unknown = true,
                }
            }
            if some_unknown {
                Eval::Unknown
            } else {
                Eval::True
            }
        }
        Formula::Or(args) => {
            let mut some_unknown = false;
            for a in args {
                match eval(a, ctx) {
                    Eval::Error => return Eval::Error,
                    Eval::True => return Eval::True,
                    Eval::False => {}
                    Eval::Unknown => some_unknown = true,
                }
            }
            if some_unknown {
                Eval::Unknown
            } else {
                Eval::False
            }
        }
        Formula::Not(inner) => match eval(inner, ctx) {
            Eval::Error => Eval::Error,
            Eval::Unknown => Eval::Unknown,
            Eval::True => Eval::False,
            Eval::False => Eval::True,
        },
        Formula::Implies(antecedent, consequent) => {
            let a = eval(antecedent, ctx);
            let c = eval(consequent, ctx);
            if a == Eval::Error || c == Eval::Error {
                return Eval::Error;
            }
            if a == Eval::False {
                return Eval::True;
            }
            if c == Eval::True {
                return Eval::True;
            }
            if a == Eval::True && c == Eval::False {
                return Eval::False;
            }
            Eval::Unknown
        }
        Formula::Biconditional(l, r) => {
            let l = eval(l, ctx);
            let r = eval(r, ctx);
            if l == Eval::Error || r == Eval::Error {
                return Eval::Error;
            }
            if l == Eval::Unknown || r == Eval::Unknown {
                return Eval::Unknown;
            }
            if l == r {
                Eval::True
            } else {
                Eval::False
            }
        }
        Formula::Exists(_, inner) | Formula::ForAll(_, inner) => eval(inner, ctx),
        Formula::Comparison(op, l, r) => {
            let lt = term_type(l, ctx);
            let rt = term_type(r, ctx);
            if lt.set_size == SetSize::Empty || rt.set_size == SetSize::Empty {
                return Eval::False;
            }
            if lt.domain == Domain::Unknown || rt.domain == Domain::Unknown {
                return Eval::Unknown;
            }
            if lt.domain == rt.domain {
                return Eval::Unknown;
            }
            match op {
                ComparisonOperator::Equal => Eval::False,
                ComparisonOperator::NotEqual => Eval::True,
                _ => Eval::Unknown,
            }
        }
        Formula::In(element, set) => {
            let et = term_type(element, ctx);
            let st = term_type(set, ctx);
            if st.set_size == SetSize::Empty {
                return Eval::False;
            }
            if et.domain == Domain::Unknown || st.domain == Domain::Unknown {
                return Eval::Unknown;
            }
            if et.domain == st.domain {
                return Eval::Unknown;
            }
            Eval::False
        }
        Formula::Predicate(decl, args) => {
            for (i, arg) in args.iter().enumerate() {
                if decl.param_sorts[i].get() != Sort::Integer {
                    continue;
                }
                let t = term_type(arg, ctx);
                if t.domain == Domain::Symbolic || t.set_size == SetSize::Empty {
                    return Eval::Error;
                }
            }
            Eval::Unknown
        }
    }
}

fn collect_unknown_vars(formula: &Formula, out: &mut Vec<Rc<VariableDeclaration>>) {
    if let Some(vars) = formula.bound_vars() {
        for v in vars {
            if v.sort.get() == Sort::Unknown {
                out.push(v.clone());
            }
        }
    }
    for child in formula.children() {
        collect_unknown_vars(child, out);
    }
}

/// Marks `v.sort` as `Integer` on every predicate argument occurrence that
/// lines up with a known-Integer parameter position (spec §4.6 step 4).
fn propagate_from_predicate_parameters(formula: &Formula) -> bool {
    let mut changed = false;
    if let Formula::Predicate(decl, args) = formula {
        for (i, arg) in args.iter().enumerate() {
            if decl.param_sorts[i].get() == Sort::Integer {
                if let Term::Variable(v) = arg {
                    if v.sort.get() == Sort::Unknown {
                        v.sort.set(Sort::Integer);
                        changed = true;
                    }
                }
            }
        }
    }
    for child in formula.children() {
        changed |= propagate_from_predicate_parameters(child);
    }
    changed
}

/// The opposite direction of [propagate_from_predicate_parameters]: once a
/// variable is itself proven Integer, any predicate parameter position it
/// occupies is known Integer too, letting the propagation above reach other
/// occurrences of that predicate (spec §4.6 step 4). Without this, the
/// parameter table stays all-`Unknown` forever and step 4 never fires.
fn mark_param_sorts_for_var(formula: &Formula, var: &Rc<VariableDeclaration>) {
    if let Formula::Predicate(decl, args) = formula {
        for (i, arg) in args.iter().enumerate() {
            if let Term::Variable(v) = arg {
                if Rc::ptr_eq(v, var) {
                    decl.param_sorts[i].set(Sort::Integer);
                }
            }
        }
    }
    for child in formula.children() {
        mark_param_sorts_for_var(child, var);
    }
}

/// A predicate's own completion axiom has the shape `forall V (p(V) <->
/// phi(V))`. Evaluating that whole biconditional under a hypothesis about `V`
/// is useless for detection: `p(V)`'s truth value is always `Unknown` (no
/// parameter is known Integer yet), and `Biconditional` treats any `Unknown`
/// operand as masking the other side, so a contradiction in `phi` alone never
/// surfaces. Spec §4.6 step 1 evaluates "the surrounding formula and the
/// defining formula" for this reason — `phi` on its own is the defining
/// formula, tested in addition to the whole axiom.
fn definition_rhs(formula: &Formula) -> Option<&Formula> {
    let mut f = formula;
    loop {
        match f {
            Formula::ForAll(_, inner) | Formula::Exists(_, inner) => f = inner,
            Formula::Biconditional(lhs, rhs) if matches!(lhs.as_ref(), Formula::Predicate(_, _)) => return Some(rhs),
            _ => return None,
        }
    }
}

fn formula_contradicts(formula: &Formula, ctx: &EvalCtx) -> bool {
    if matches!(eval(formula, ctx), Eval::Error | Eval::False) {
        return true;
    }
    if let Some(rhs) = definition_rhs(formula) {
        if matches!(eval(rhs, ctx), Eval::Error | Eval::False) {
            return true;
        }
    }
    false
}

/// Runs the fixed-point integer-detection process over a completed theory.
pub(crate) fn detect_integers(theory: &[Formula]) {
    loop {
        let mut changed = false;

        let mut candidates: Vec<Rc<VariableDeclaration>> = Vec::new();
        let mut seen = HashMap::new();
        for f in theory {
            collect_unknown_vars(f, &mut candidates);
        }
        candidates.retain(|v| {
            let key = Rc::as_ptr(v) as usize;
            if seen.contains_key(&key) {
                false
            } else {
                seen.insert(key, ());
                true
            }
        });

        for var in &candidates {
            if var.sort.get() != Sort::Unknown {
                continue;
            }
            let default_ctx = EvalCtx { hypothesis: None };
            let baseline_ok = !theory.iter().any(|f| formula_contradicts(f, &default_ctx));
            if !baseline_ok {
                continue;
            }

            let hypothesis_ctx = EvalCtx { hypothesis: Some((VarRef(var.clone()), Domain::Symbolic)) };
            let contradicted = theory.iter().any(|f| formula_contradicts(f, &hypothesis_ctx));
            if contradicted {
                var.sort.set(Sort::Integer);
                for f in theory {
                    mark_param_sorts_for_var(f, var);
                }
                changed = true;
            }
        }

        for f in theory {
            changed |= propagate_from_predicate_parameters(f);
        }

        if !changed {
            return;
        }
    }
}
