//! Choose-value-in-term (spec §4.3): the central construction eliminating
//! compound terms and intervals by relating a fresh variable `z` to the value(s)
//! the term denotes, under ASP's term semantics.

use itertools::Itertools;

use crate::core::decl::{Sort, VarKind};
use crate::core::formula::{ComparisonOperator as CoreCmp, Formula};
use crate::core::term::{BinaryOperator as CoreBinOp, SpecialInteger, Term, UnaryOperator as CoreUnOp};
use crate::error::{Location, TranslationFailure};
use crate::source;

use super::RuleScope;

/// Builds `choose(t, z)`: a formula whose models are exactly the assignments
/// to `z` consistent with `z = t` under ASP's term semantics (spec §4.3 table).
pub(crate) fn choose_value_in_term(
    term: &source::Term,
    z: Term,
    scope: &mut RuleScope,
    location: &Location,
) -> Result<Formula, TranslationFailure> {
    match term {
        // These three base cases build `z in t` rather than `z = t`: t is
        // always primitive here, so simplification (rule 8) collapses it to
        // an equality wherever it runs, but left as `In` it also renders
        // correctly as-is when simplification doesn't run.
        source::Term::Symbol(symbol) => Ok(Formula::In(z, symbol_to_term(symbol, scope))),

        source::Term::Variable(name) => {
            // Whether already in scope or not, get_or_bind resolves to the same
            // declaration for repeated mentions and allocates a fresh free
            // variable on first mention (spec §4.3 "unbound variable" case).
            let decl = scope.get_or_bind(name);
            Ok(Formula::In(z, Term::Variable(decl)))
        }

        source::Term::Function(name, args, _external) if args.is_empty() => {
            let decl = scope.ctx.function(name, 0);
            Ok(Formula::In(z, Term::function(decl, vec![])))
        }

        source::Term::Function(name, args, _external) => {
            let decl = scope.ctx.function(name, args.len());
            let us: Vec<_> = args
                .iter()
                .map(|_| scope.fresh(VarKind::Body, Sort::Integer))
                .collect();
            let z_eq = Formula::Comparison(
                CoreCmp::Equal,
                z,
                Term::function(decl, us.iter().map(|u| Term::Variable(u.clone())).collect()),
            );
            let mut conjuncts = vec![z_eq];
            for (arg, u) in args.iter().zip_eq(us.iter()) {
                conjuncts.push(choose_value_in_term(arg, Term::Variable(u.clone()), scope, location)?);
            }
            Ok(Formula::exists(us, Formula::And(conjuncts)))
        }

        source::Term::BinaryOperation(op, left, right) => match op {
            source::BinaryOperator::Add | source::BinaryOperator::Subtract | source::BinaryOperator::Multiply => {
                let core_op = match op {
                    source::BinaryOperator::Add => CoreBinOp::Add,
                    source::BinaryOperator::Subtract => CoreBinOp::Subtract,
                    source::BinaryOperator::Multiply => CoreBinOp::Multiply,
                    _ => unreachable!(),
                };
                let u1 = scope.fresh(VarKind::Body, Sort::Integer);
                let u2 = scope.fresh(VarKind::Body, Sort::Integer);
                let z_eq = Formula::Comparison(
                    CoreCmp::Equal,
                    z,
                    Term::BinaryOperation(core_op, Box::new(Term::Variable(u1.clone())), Box::new(Term::Variable(u2.clone()))),
                );
                let ch1 = choose_value_in_term(left, Term::Variable(u1.clone()), scope, location)?;
                let ch2 = choose_value_in_term(right, Term::Variable(u2.clone()), scope, location)?;
                Ok(Formula::exists(vec![u1, u2], Formula::And(vec![z_eq, ch1, ch2])))
            }

            source::BinaryOperator::Divide | source::BinaryOperator::Modulo => {
                let i = scope.fresh(VarKind::Body, Sort::Integer);
                let j = scope.fresh(VarKind::Body, Sort::Integer);
                let q = scope.fresh(VarKind::Body, Sort::Integer);
                let r = scope.fresh(VarKind::Body, Sort::Integer);

                let eq1 = Formula::Comparison(
                    CoreCmp::Equal,
                    Term::Variable(i.clone()),
                    Term::BinaryOperation(
                        CoreBinOp::Add,
                        Box::new(Term::BinaryOperation(
                            CoreBinOp::Multiply,
                            Box::new(Term::Variable(j.clone())),
                            Box::new(Term::Variable(q.clone())),
                        )),
                        Box::new(Term::Variable(r.clone())),
                    ),
                );
                let ch_i = choose_value_in_term(left, Term::Variable(i.clone()), scope, location)?;
                let ch_j = choose_value_in_term(right, Term::Variable(j.clone()), scope, location)?;
                let j_nonzero = Formula::Comparison(CoreCmp::NotEqual, Term::Variable(j.clone()), Term::Integer(0));
                let r_nonneg = Formula::Comparison(CoreCmp::GreaterEqual, Term::Variable(r.clone()), Term::Integer(0));
                let r_lt_q = Formula::Comparison(CoreCmp::Less, Term::Variable(r.clone()), Term::Variable(q.clone()));
                // Corrected per spec §9 open question: select exactly one of z=q / z=r, never both.
                let z_eq = Formula::Comparison(
                    CoreCmp::Equal,
                    z,
                    match op {
                        source::BinaryOperator::Divide => Term::Variable(q.clone()),
                        source::BinaryOperator::Modulo => Term::Variable(r.clone()),
                        _ => unreachable!(),
                    },
                );
                Ok(Formula::exists(
                    vec![i, j, q, r],
                    Formula::And(vec![eq1, ch_i, ch_j, j_nonzero, r_nonneg, r_lt_q, z_eq]),
                ))
            }

            source::BinaryOperator::Power => Err(TranslationFailure::UnsupportedOperator {
                location: location.clone(),
                operator: "**".to_string(),
            }),

            source::BinaryOperator::Xor | source::BinaryOperator::Or | source::BinaryOperator::And => {
                Err(TranslationFailure::UnsupportedOperator {
                    location: location.clone(),
                    operator: format!("{op:?}"),
                })
            }
        },

        source::Term::UnaryOperation(source::UnaryOperator::Minus, inner) => {
            let z2 = scope.fresh(VarKind::Body, Sort::Integer);
            let z_eq = Formula::Comparison(
                CoreCmp::Equal,
                z,
                Term::UnaryOperation(CoreUnOp::Negative, Box::new(Term::Variable(z2.clone()))),
            );
            let ch = choose_value_in_term(inner, Term::Variable(z2.clone()), scope, location)?;
            Ok(Formula::exists(vec![z2], Formula::And(vec![z_eq, ch])))
        }

        source::Term::UnaryOperation(source::UnaryOperator::AbsoluteValue, _) => {
            Err(TranslationFailure::UnsupportedOperator {
                location: location.clone(),
                operator: "abs".to_string(),
            })
        }

        source::Term::Interval(from, to) => {
            // z in (i..j), not the literal three-variable ∃k chain the bounds
            // table sketches: an In-over-Interval conjunct is what the
            // simplifier (rule 2, applied to i and then j) collapses down to
            // a bare `z in (lo..hi)`, whereas binding a third witness k
            // between i and j leaves a dangling pair of <= comparisons no
            // rule below rewrites back into an In.
            let i = scope.fresh(VarKind::Body, Sort::Integer);
            let j = scope.fresh(VarKind::Body, Sort::Integer);
            let ch_i = choose_value_in_term(from, Term::Variable(i.clone()), scope, location)?;
            let ch_j = choose_value_in_term(to, Term::Variable(j.clone()), scope, location)?;
            let in_range = Formula::In(z, Term::Interval(Box::new(Term::Variable(i.clone())), Box::new(Term::Variable(j.clone()))));
            Ok(Formula::exists(vec![i, j], Formula::And(vec![ch_i, ch_j, in_range])))
        }

        source::Term::Pool(_) => Err(TranslationFailure::UnsupportedOperator {
            location: location.clone(),
            operator: "pool".to_string(),
        }),
    }
}

pub(crate) fn symbol_to_term(symbol: &source::Symbol, scope: &mut RuleScope) -> Term {
    match symbol {
        source::Symbol::Number(n) => Term::Integer(*n),
        source::Symbol::String(s) => Term::String(s.clone()),
        source::Symbol::Infimum => Term::SpecialInteger(SpecialInteger::Infimum),
        source::Symbol::Supremum => Term::SpecialInteger(SpecialInteger::Supremum),
        source::Symbol::Function(name) => Term::function(scope.ctx.function(name, 0), vec![]),
    }
}
