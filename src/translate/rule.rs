//! Maps one source rule to one or more [ScopedFormula]s (spec §4.3).

use std::rc::Rc;

use itertools::Itertools;

use crate::core::context::Context;
use crate::core::copy::collect_free_vars;
use crate::core::decl::{Sort, VarKind, VariableDeclaration};
use crate::core::formula::{ComparisonOperator as CoreCmp, Formula};
use crate::core::scoped::ScopedFormula;
use crate::core::term::Term;
use crate::error::{Location, TranslationFailure};
use crate::source;

use super::choose::choose_value_in_term;
use super::RuleScope;

/// The head-translation-analysis outcome (spec §4.3): which of the four shapes
/// a rule's head translates to.
pub(crate) enum RuleOutput {
    /// `(body ∧ head-term-choices) → head-atom`. Also covers facts (body = ⊤).
    Normal(ScopedFormula),
    /// A single-element choice rule `{A}`, completed as a one-way implication.
    Choice(ScopedFormula),
    /// `body → ⊥`; universally closed by [crate::completion].
    IntegrityConstraint(ScopedFormula),
}

pub(crate) struct RuleTranslation {
    pub(crate) output: RuleOutput,
    /// Whether this rule's body used negation, raising the output semantics
    /// flag to the logic of here-and-there (spec §4.9).
    pub(crate) requires_here_and_there: bool,
}

pub(crate) fn translate_rule(rule: &source::Rule, ctx: &mut Context) -> Result<RuleTranslation, TranslationFailure> {
    let mut scope = RuleScope::new(ctx);
    let (body_formula, requires_here_and_there) = translate_body(&rule.body, &mut scope)?;

    let output = match &rule.head {
        None => {
            let formula = Formula::Implies(Box::new(body_formula), Box::new(Formula::Boolean(false)));
            let free_vars = collect_free_vars(&formula);
            RuleOutput::IntegrityConstraint(ScopedFormula::new(formula, free_vars))
        }

        Some(source::HeadLiteral::Literal { name, args, location }) => {
            let (atom, in_conjuncts) = translate_head_atom(name, args, location, &mut scope)?;
            let mut antecedent = in_conjuncts;
            if !rule.body.is_empty() {
                antecedent.push(body_formula);
            }
            let formula = Formula::Implies(Box::new(Formula::and(antecedent)), Box::new(atom));
            let free_vars = collect_free_vars(&formula);
            RuleOutput::Normal(ScopedFormula::new(formula, free_vars))
        }

        Some(source::HeadLiteral::Disjunction(_)) => {
            return Err(TranslationFailure::Other {
                location: rule.location.clone(),
                message: "disjunctive rule heads are not supported".to_string(),
            });
        }

        Some(source::HeadLiteral::Aggregate {
            lower_guard,
            elements,
            upper_guard,
            location,
        }) => {
            if lower_guard.is_some() || upper_guard.is_some() {
                return Err(TranslationFailure::UnsupportedHeadAggregate { location: location.clone() });
            }
            if elements.len() != 1 || !elements[0].condition.is_empty() {
                return Err(TranslationFailure::UnsupportedHeadAggregate { location: location.clone() });
            }
            let element = &elements[0];
            let (atom, in_conjuncts) = translate_head_atom(&element.name, &element.args, location, &mut scope)?;
            // A choice rule only constrains what must hold *if* the atom is
            // chosen — the implication runs atom-to-condition, the reverse of
            // a Normal rule's condition-to-atom (spec §8 scenario 6).
            let mut consequent = in_conjuncts;
            if !rule.body.is_empty() {
                consequent.push(body_formula);
            }
            let formula = Formula::Implies(Box::new(atom), Box::new(Formula::and(consequent)));
            let free_vars = collect_free_vars(&formula);
            RuleOutput::Choice(ScopedFormula::new(formula, free_vars))
        }
    };

    Ok(RuleTranslation {
        output,
        requires_here_and_there,
    })
}

/// Builds the head atom `p(v1,...,vn)` with fresh head-kind variables, plus
/// the `vi in ti` conjuncts relating each to its source argument term (§4.3).
fn translate_head_atom(
    name: &str,
    args: &[source::Term],
    location: &Location,
    scope: &mut RuleScope,
) -> Result<(Formula, Vec<Formula>), TranslationFailure> {
    let decl = scope.ctx.predicate(name, args.len());
    decl.is_used.set(true);
    let vs: Vec<Rc<VariableDeclaration>> = args
        .iter()
        .map(|_| scope.fresh(VarKind::Head, Sort::Unknown))
        .collect();
    let atom = Formula::predicate(decl, vs.iter().map(|v| Term::Variable(v.clone())).collect());
    let mut in_conjuncts = Vec::with_capacity(args.len());
    for (arg, v) in args.iter().zip_eq(vs.iter()) {
        let converted = convert_term(arg, scope, location)?;
        in_conjuncts.push(Formula::In(Term::Variable(v.clone()), converted));
    }
    Ok((atom, in_conjuncts))
}

fn translate_body(body: &[source::BodyLiteral], scope: &mut RuleScope) -> Result<(Formula, bool), TranslationFailure> {
    if body.is_empty() {
        return Ok((Formula::Boolean(true), false));
    }
    let mut conjuncts = Vec::with_capacity(body.len());
    let mut requires_here_and_there = false;
    for literal in body {
        let (formula, negated) = translate_body_literal(literal, scope)?;
        requires_here_and_there |= negated;
        conjuncts.push(formula);
    }
    Ok((Formula::And(conjuncts), requires_here_and_there))
}

fn translate_body_literal(
    literal: &source::BodyLiteral,
    scope: &mut RuleScope,
) -> Result<(Formula, bool), TranslationFailure> {
    match &literal.literal {
        source::Literal::Boolean(b) => Ok((Formula::Boolean(*b), false)),

        source::Literal::Comparison(op, left, right) => {
            let u1 = scope.fresh(VarKind::Body, Sort::Unknown);
            let u2 = scope.fresh(VarKind::Body, Sort::Unknown);
            let ch1 = choose_value_in_term(left, Term::Variable(u1.clone()), scope, &literal.location)?;
            let ch2 = choose_value_in_term(right, Term::Variable(u2.clone()), scope, &literal.location)?;
            let cmp = Formula::Comparison(convert_comparison_operator(*op), Term::Variable(u1.clone()), Term::Variable(u2.clone()));
            let inner = Formula::exists(vec![u1, u2], Formula::And(vec![ch1, ch2, cmp]));
            Ok((inner, false))
        }

        source::Literal::Predicate { name, args } => {
            let decl = scope.ctx.predicate(name, args.len());
            decl.is_used.set(true);
            let us: Vec<Rc<VariableDeclaration>> = args
                .iter()
                .map(|_| scope.fresh(VarKind::Body, Sort::Unknown))
                .collect();
            let atom = Formula::predicate(decl, us.iter().map(|u| Term::Variable(u.clone())).collect());
            let (signed_atom, negated) = apply_sign(atom, literal.sign);
            let mut conjuncts = Vec::with_capacity(args.len() + 1);
            for (arg, u) in args.iter().zip_eq(us.iter()) {
                conjuncts.push(choose_value_in_term(arg, Term::Variable(u.clone()), scope, &literal.location)?);
            }
            conjuncts.push(signed_atom);
            Ok((Formula::exists(us, Formula::And(conjuncts)), negated))
        }
    }
}

fn apply_sign(atom: Formula, sign: source::Sign) -> (Formula, bool) {
    match sign {
        source::Sign::None => (atom, false),
        source::Sign::Negation => (Formula::Not(Box::new(atom)), true),
        source::Sign::DoubleNegation => (Formula::Not(Box::new(Formula::Not(Box::new(atom)))), true),
    }
}

fn convert_comparison_operator(op: source::ComparisonOperator) -> CoreCmp {
    match op {
        source::ComparisonOperator::Greater => CoreCmp::Greater,
        source::ComparisonOperator::Less => CoreCmp::Less,
        source::ComparisonOperator::LessEqual => CoreCmp::LessEqual,
        source::ComparisonOperator::GreaterEqual => CoreCmp::GreaterEqual,
        source::ComparisonOperator::NotEqual => CoreCmp::NotEqual,
        source::ComparisonOperator::Equal => CoreCmp::Equal,
    }
}

/// Structurally converts a source term into a core term without eliminating
/// compound structure (unlike [choose_value_in_term]); used to build the `set`
/// operand of a head argument's `In` conjunct, which may itself be a compound
/// term or interval (spec §3 Formulas: `In(element, set)`).
fn convert_term(term: &source::Term, scope: &mut RuleScope, location: &Location) -> Result<Term, TranslationFailure> {
    use crate::core::term::{BinaryOperator as CoreBinOp, UnaryOperator as CoreUnOp};

    match term {
        source::Term::Symbol(symbol) => Ok(super::choose::symbol_to_term(symbol, scope)),
        source::Term::Variable(name) => Ok(Term::Variable(scope.get_or_bind(name))),
        source::Term::Function(name, args, _external) => {
            let decl = scope.ctx.function(name, args.len());
            let converted = args
                .iter()
                .map(|a| convert_term(a, scope, location))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::function(decl, converted))
        }
        source::Term::BinaryOperation(op, left, right) => {
            let core_op = match op {
                source::BinaryOperator::Add => CoreBinOp::Add,
                source::BinaryOperator::Subtract => CoreBinOp::Subtract,
                source::BinaryOperator::Multiply => CoreBinOp::Multiply,
                source::BinaryOperator::Divide => CoreBinOp::Divide,
                source::BinaryOperator::Modulo => CoreBinOp::Modulo,
                source::BinaryOperator::Power
                | source::BinaryOperator::Xor
                | source::BinaryOperator::Or
                | source::BinaryOperator::And => {
                    return Err(TranslationFailure::UnsupportedOperator {
                        location: location.clone(),
                        operator: format!("{op:?}"),
                    })
                }
            };
            Ok(Term::BinaryOperation(
                core_op,
                Box::new(convert_term(left, scope, location)?),
                Box::new(convert_term(right, scope, location)?),
            ))
        }
        source::Term::UnaryOperation(op, inner) => {
            let core_op = match op {
                source::UnaryOperator::Minus => CoreUnOp::Negative,
                source::UnaryOperator::AbsoluteValue => {
                    return Err(TranslationFailure::UnsupportedOperator {
                        location: location.clone(),
                        operator: "abs".to_string(),
                    })
                }
            };
            Ok(Term::UnaryOperation(core_op, Box::new(convert_term(inner, scope, location)?)))
        }
        source::Term::Interval(from, to) => Ok(Term::Interval(
            Box::new(convert_term(from, scope, location)?),
            Box::new(convert_term(to, scope, location)?),
        )),
        source::Term::Pool(_) => Err(TranslationFailure::UnsupportedOperator {
            location: location.clone(),
            operator: "pool".to_string(),
        }),
    }
}
