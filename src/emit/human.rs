//! Human-readable pretty-printer (spec §6 Emit format): infix formulas with
//! keywords `and`, `or`, `not`, `in`, `exists`, `forall`, `#true`, `#false`,
//! `#inf`, `#sup`, intervals `a..b`, operators `+ - * / % = != < <= > >= -> <->`.
//!
//! `And`/`Or`/`Implies`/`Biconditional` always parenthesize themselves,
//! except directly as a quantifier's body (the quantifier already supplies
//! the delimiting parens there); `Not` and binary arithmetic never need to,
//! since they bind tighter than any connective they could be an operand of.

use std::rc::Rc;

use crate::core::decl::VariableDeclaration;
use crate::core::formula::{ComparisonOperator, Formula};
use crate::core::term::{BinaryOperator, SpecialInteger, Term, UnaryOperator};

use super::ParenthesisStyle;

pub(crate) fn render(formula: &Formula, style: ParenthesisStyle) -> String {
    fmt_formula(formula, style, false)
}

fn comparison_symbol(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "!=",
        ComparisonOperator::Less => "<",
        ComparisonOperator::LessEqual => "<=",
        ComparisonOperator::Greater => ">",
        ComparisonOperator::GreaterEqual => ">=",
    }
}

fn var_list(vars: &[Rc<VariableDeclaration>]) -> String {
    vars.iter().map(|v| v.effective_name()).collect::<Vec<_>>().join(" ")
}

fn fmt_formula(f: &Formula, style: ParenthesisStyle, is_quantifier_body: bool) -> String {
    match f {
        Formula::Boolean(true) => "#true".to_string(),
        Formula::Boolean(false) => "#false".to_string(),
        Formula::Comparison(op, l, r) => {
            format!("{} {} {}", fmt_term(l, style), comparison_symbol(*op), fmt_term(r, style))
        }
        Formula::In(element, set) => format!("{} in {}", fmt_term(element, style), fmt_term(set, style)),
        Formula::Predicate(decl, args) => {
            if args.is_empty() {
                decl.name.clone()
            } else {
                let args = args.iter().map(|a| fmt_term(a, style)).collect::<Vec<_>>().join(", ");
                format!("{}({})", decl.name, args)
            }
        }
        Formula::Not(inner) => format!("not {}", fmt_formula(inner, style, false)),
        Formula::And(args) => {
            let body = join_associative(args, "and", style);
            if is_quantifier_body {
                body
            } else {
                format!("({body})")
            }
        }
        Formula::Or(args) => {
            let body = join_associative(args, "or", style);
            if is_quantifier_body {
                body
            } else {
                format!("({body})")
            }
        }
        Formula::Implies(a, b) => {
            let body = format!("{} -> {}", fmt_formula(a, style, false), fmt_formula(b, style, false));
            if is_quantifier_body {
                body
            } else {
                format!("({body})")
            }
        }
        Formula::Biconditional(a, b) => {
            let body = format!("{} <-> {}", fmt_formula(a, style, false), fmt_formula(b, style, false));
            if is_quantifier_body {
                body
            } else {
                format!("({body})")
            }
        }
        Formula::Exists(vars, inner) => format!("exists {} ({})", var_list(vars), fmt_formula(inner, style, true)),
        Formula::ForAll(vars, inner) => format!("forall {} ({})", var_list(vars), fmt_formula(inner, style, true)),
    }
}

/// Renders an n-ary And/Or. `Normal` style keeps one flat infix group;
/// `Full` style pairwise-parenthesizes as a left-associated binary chain.
fn join_associative(args: &[Formula], keyword: &str, style: ParenthesisStyle) -> String {
    if style == ParenthesisStyle::Normal {
        return args.iter().map(|a| fmt_formula(a, style, false)).collect::<Vec<_>>().join(&format!(" {keyword} "));
    }
    let mut iter = args.iter();
    let mut acc = fmt_formula(iter.next().expect("And/Or must have at least one operand"), style, false);
    for arg in iter {
        acc = format!("({acc} {keyword} {})", fmt_formula(arg, style, false));
    }
    acc
}

fn fmt_term(t: &Term, style: ParenthesisStyle) -> String {
    match t {
        Term::Integer(n) => n.to_string(),
        Term::SpecialInteger(SpecialInteger::Infimum) => "#inf".to_string(),
        Term::SpecialInteger(SpecialInteger::Supremum) => "#sup".to_string(),
        Term::String(s) => format!("\"{s}\""),
        Term::Boolean(true) => "#true".to_string(),
        Term::Boolean(false) => "#false".to_string(),
        Term::Variable(decl) => decl.effective_name(),
        Term::Function(decl, args) => {
            if args.is_empty() {
                decl.name.clone()
            } else {
                let args = args.iter().map(|a| fmt_term(a, style)).collect::<Vec<_>>().join(", ");
                format!("{}({})", decl.name, args)
            }
        }
        Term::BinaryOperation(op, l, r) => {
            format!("({} {} {})", fmt_term(l, style), binary_symbol(*op), fmt_term(r, style))
        }
        Term::UnaryOperation(UnaryOperator::Negative, inner) => format!("-{}", fmt_term(inner, style)),
        Term::UnaryOperation(UnaryOperator::AbsoluteValue, inner) => format!("|{}|", fmt_term(inner, style)),
        Term::Interval(from, to) => format!("({}..{})", fmt_term(from, style), fmt_term(to, style)),
    }
}

fn binary_symbol(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::Power => "**",
    }
}
