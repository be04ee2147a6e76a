//! Domain unification / domain mapping (spec §4.8): rewrites a closed theory
//! for a single-sorted emission target (e.g. TPTP's one untyped "object" sort).
//!
//! Two independent strategies, selected by the emitter: [unify] injects an
//! `integer(·)` wrapper and uninterpreted arithmetic/comparison symbols plus
//! `is_integer` guards; [map] instead numerically encodes every value as a
//! (possibly negative) integer, requiring no injection or guards but relying
//! on the emitted theory's arithmetic axioms to carry the right semantics.
//! Both must preserve the set of satisfying interpretations.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::context::Context;
use crate::core::decl::{FunctionDeclaration, PredicateDeclaration, Sort};
use crate::core::formula::{ComparisonOperator, Formula};
use crate::core::term::{BinaryOperator, SpecialInteger, Term, UnaryOperator};
use crate::error::logic_failure;

/// The uninterpreted function/predicate symbols domain unification rewrites into.
pub(crate) struct DomainSymbols {
    pub(crate) integer_injection: Rc<FunctionDeclaration>,
    pub(crate) sum: Rc<FunctionDeclaration>,
    pub(crate) difference: Rc<FunctionDeclaration>,
    pub(crate) product: Rc<FunctionDeclaration>,
    pub(crate) quotient: Rc<FunctionDeclaration>,
    pub(crate) remainder: Rc<FunctionDeclaration>,
    pub(crate) negative: Rc<FunctionDeclaration>,
    pub(crate) absolute: Rc<FunctionDeclaration>,
    pub(crate) less: Rc<PredicateDeclaration>,
    pub(crate) less_equal: Rc<PredicateDeclaration>,
    pub(crate) greater: Rc<PredicateDeclaration>,
    pub(crate) greater_equal: Rc<PredicateDeclaration>,
    pub(crate) is_integer: Rc<PredicateDeclaration>,
}

impl DomainSymbols {
    pub(crate) fn declare(ctx: &mut Context) -> Self {
        Self {
            integer_injection: ctx.function("integer", 1),
            sum: ctx.function("sum", 2),
            difference: ctx.function("difference", 2),
            product: ctx.function("product", 2),
            quotient: ctx.function("quotient", 2),
            remainder: ctx.function("remainder", 2),
            negative: ctx.function("negative", 1),
            absolute: ctx.function("absolute", 1),
            less: ctx.predicate("less", 2),
            less_equal: ctx.predicate("less_equal", 2),
            greater: ctx.predicate("greater", 2),
            greater_equal: ctx.predicate("greater_equal", 2),
            is_integer: ctx.predicate("is_integer", 1),
        }
    }
}

fn unify_term(term: &Term, symbols: &DomainSymbols) -> Term {
    match term {
        Term::Integer(_) => Term::function(symbols.integer_injection.clone(), vec![term.clone()]),
        Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) | Term::Variable(_) => term.clone(),
        Term::Function(decl, args) => Term::function(decl.clone(), args.iter().map(|a| unify_term(a, symbols)).collect()),
        Term::BinaryOperation(op, l, r) => {
            let decl = match op {
                BinaryOperator::Add => &symbols.sum,
                BinaryOperator::Subtract => &symbols.difference,
                BinaryOperator::Multiply => &symbols.product,
                BinaryOperator::Divide => &symbols.quotient,
                BinaryOperator::Modulo => &symbols.remainder,
                BinaryOperator::Power => logic_failure!("power survived to domain unification; choose-value-in-term must reject it"),
            };
            Term::function(decl.clone(), vec![unify_term(l, symbols), unify_term(r, symbols)])
        }
        Term::UnaryOperation(op, a) => {
            let decl = match op {
                UnaryOperator::Negative => &symbols.negative,
                UnaryOperator::AbsoluteValue => &symbols.absolute,
            };
            Term::function(decl.clone(), vec![unify_term(a, symbols)])
        }
        Term::Interval(from, to) => Term::Interval(Box::new(unify_term(from, symbols)), Box::new(unify_term(to, symbols))),
    }
}

/// `In(a, from..to)` is the one `In` shape simplification doesn't collapse
/// (rules 8/13 require a primitive or integer-sorted set operand); rewritten
/// here as `less_equal(from, a) ∧ less_equal(a, to)`.
fn unify_formula(formula: &Formula, symbols: &DomainSymbols) -> Formula {
    match formula {
        Formula::Boolean(b) => Formula::Boolean(*b),
        Formula::Comparison(op, l, r) => {
            let l = unify_term(l, symbols);
            let r = unify_term(r, symbols);
            match op {
                ComparisonOperator::Equal => Formula::Comparison(ComparisonOperator::Equal, l, r),
                ComparisonOperator::NotEqual => Formula::Not(Box::new(Formula::Comparison(ComparisonOperator::Equal, l, r))),
                ComparisonOperator::Less => Formula::predicate(symbols.less.clone(), vec![l, r]),
                ComparisonOperator::LessEqual => Formula::predicate(symbols.less_equal.clone(), vec![l, r]),
                ComparisonOperator::Greater => Formula::predicate(symbols.greater.clone(), vec![l, r]),
                ComparisonOperator::GreaterEqual => Formula::predicate(symbols.greater_equal.clone(), vec![l, r]),
            }
        }
        Formula::In(a, b) => match b {
            Term::Interval(from, to) => {
                let a = unify_term(a, symbols);
                let from = unify_term(from, symbols);
                let to = unify_term(to, symbols);
                Formula::And(vec![
                    Formula::predicate(symbols.less_equal.clone(), vec![from, a.clone()]),
                    Formula::predicate(symbols.less_equal.clone(), vec![a, to]),
                ])
            }
            _ => Formula::Comparison(ComparisonOperator::Equal, unify_term(a, symbols), unify_term(b, symbols)),
        },
        Formula::Predicate(decl, args) => Formula::predicate(decl.clone(), args.iter().map(|a| unify_term(a, symbols)).collect()),
        Formula::Not(a) => Formula::Not(Box::new(unify_formula(a, symbols))),
        Formula::And(args) => Formula::And(args.iter().map(|a| unify_formula(a, symbols)).collect()),
        Formula::Or(args) => Formula::Or(args.iter().map(|a| unify_formula(a, symbols)).collect()),
        Formula::Implies(a, b) => Formula::Implies(Box::new(unify_formula(a, symbols)), Box::new(unify_formula(b, symbols))),
        Formula::Biconditional(a, b) => Formula::Biconditional(Box::new(unify_formula(a, symbols)), Box::new(unify_formula(b, symbols))),
        Formula::Exists(vars, inner) => {
            let inner = unify_formula(inner, symbols);
            let guards = integer_guards(vars, symbols);
            let mut conjuncts = guards;
            conjuncts.push(inner);
            Formula::Exists(vars.clone(), Box::new(Formula::and(conjuncts)))
        }
        Formula::ForAll(vars, inner) => {
            let inner = unify_formula(inner, symbols);
            let guards = integer_guards(vars, symbols);
            let body = if guards.is_empty() {
                inner
            } else {
                Formula::Implies(Box::new(Formula::and(guards)), Box::new(inner))
            };
            Formula::ForAll(vars.clone(), Box::new(body))
        }
    }
}

fn integer_guards(vars: &[Rc<crate::core::decl::VariableDeclaration>], symbols: &DomainSymbols) -> Vec<Formula> {
    vars.iter()
        .filter(|v| v.sort.get() == Sort::Integer)
        .map(|v| Formula::predicate(symbols.is_integer.clone(), vec![Term::Variable(v.clone())]))
        .collect()
}

/// Domain-unification pass (spec §4.8, first variant). Declares the
/// uninterpreted symbols in `ctx` and rewrites every formula in `theory`.
pub(crate) fn unify(theory: Vec<Formula>, ctx: &mut Context) -> (Vec<Formula>, DomainSymbols) {
    let symbols = DomainSymbols::declare(ctx);
    let rewritten = theory.iter().map(|f| unify_formula(f, &symbols)).collect();
    (rewritten, symbols)
}

/// Assigns each distinct symbolic value encountered a fresh odd integer, so
/// that the domain-mapping variant's encoding is injective and stable across
/// the whole theory it rewrites.
pub(crate) struct SymbolicRegistry {
    next_odd: i64,
    assigned: HashMap<String, i64>,
}

impl SymbolicRegistry {
    pub(crate) fn new() -> Self {
        Self { next_odd: 1, assigned: HashMap::new() }
    }

    fn assign(&mut self, key: String) -> i64 {
        if let Some(&n) = self.assigned.get(&key) {
            return n;
        }
        let n = self.next_odd;
        self.next_odd += 2;
        self.assigned.insert(key, n);
        n
    }
}

fn map_term(term: &Term, registry: &mut SymbolicRegistry) -> Term {
    match term {
        Term::Integer(n) => Term::Integer(n * 2),
        Term::SpecialInteger(SpecialInteger::Infimum) => Term::Integer(registry.assign("#inf".to_string())),
        Term::SpecialInteger(SpecialInteger::Supremum) => Term::Integer(registry.assign("#sup".to_string())),
        Term::String(s) => Term::Integer(registry.assign(format!("str:{s}"))),
        Term::Boolean(b) => Term::Integer(registry.assign(format!("bool:{b}"))),
        Term::Function(decl, args) if args.is_empty() => Term::Integer(registry.assign(format!("{}/0", decl.name))),
        Term::Function(decl, args) => Term::function(decl.clone(), args.iter().map(|a| map_term(a, registry)).collect()),
        Term::Variable(v) => Term::Variable(v.clone()),
        Term::BinaryOperation(op, l, r) => Term::BinaryOperation(*op, Box::new(map_term(l, registry)), Box::new(map_term(r, registry))),
        Term::UnaryOperation(op, a) => Term::UnaryOperation(*op, Box::new(map_term(a, registry))),
        Term::Interval(from, to) => Term::Interval(Box::new(map_term(from, registry)), Box::new(map_term(to, registry))),
    }
}

fn map_formula(formula: &Formula, registry: &mut SymbolicRegistry) -> Formula {
    match formula {
        Formula::Boolean(b) => Formula::Boolean(*b),
        Formula::Comparison(op, l, r) => Formula::Comparison(*op, map_term(l, registry), map_term(r, registry)),
        Formula::In(a, b) => Formula::In(map_term(a, registry), map_term(b, registry)),
        Formula::Predicate(decl, args) => Formula::predicate(decl.clone(), args.iter().map(|a| map_term(a, registry)).collect()),
        Formula::Not(a) => Formula::Not(Box::new(map_formula(a, registry))),
        Formula::And(args) => Formula::And(args.iter().map(|a| map_formula(a, registry)).collect()),
        Formula::Or(args) => Formula::Or(args.iter().map(|a| map_formula(a, registry)).collect()),
        Formula::Implies(a, b) => Formula::Implies(Box::new(map_formula(a, registry)), Box::new(map_formula(b, registry))),
        Formula::Biconditional(a, b) => Formula::Biconditional(Box::new(map_formula(a, registry)), Box::new(map_formula(b, registry))),
        Formula::Exists(vars, inner) => Formula::Exists(vars.clone(), Box::new(map_formula(inner, registry))),
        Formula::ForAll(vars, inner) => Formula::ForAll(vars.clone(), Box::new(map_formula(inner, registry))),
    }
}

/// Domain-mapping pass (spec §4.8, alternative variant): a purely
/// integer-sorted encoding, no injection function or guards needed. Arithmetic
/// operators are left native; the emitted theory's axioms (not this pass) must
/// account for the doubling so that native `*`/`/` still denote the right
/// values under the encoding.
pub(crate) fn map(theory: Vec<Formula>) -> Vec<Formula> {
    let mut registry = SymbolicRegistry::new();
    theory.iter().map(|f| map_formula(f, &mut registry)).collect()
}
