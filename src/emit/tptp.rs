//! TPTP pretty-printer (spec §6 Emit format): `tff(<name>, <role>, <formula>).`
//! with a fixed preamble declaring the single object sort and the
//! domain-unification symbols' axioms.
//!
//! Domain-unification's plain declaration names (`integer`, `less`, `sum`, ...,
//! see [crate::domain]) are mangled here into TPTP's `f__<name>__`/`p__<name>__`
//! convention at print time; the declarations themselves stay un-mangled so
//! [crate::domain] doesn't need to know about the emit target.

use std::io::Write;
use std::rc::Rc;

use crate::core::decl::VariableDeclaration;
use crate::core::formula::{ComparisonOperator, Formula};
use crate::core::term::{BinaryOperator, SpecialInteger, Term, UnaryOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Axiom,
    Conjecture,
    Type,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Axiom => "axiom",
            Role::Conjecture => "conjecture",
            Role::Type => "type",
        }
    }
}

const MANGLED_FUNCTIONS: &[&str] = &["integer", "sum", "difference", "product", "quotient", "remainder", "negative", "absolute"];
const MANGLED_PREDICATES: &[&str] = &["less", "less_equal", "greater", "greater_equal", "is_integer"];

fn function_symbol(name: &str) -> String {
    if MANGLED_FUNCTIONS.contains(&name) {
        format!("f__{name}__")
    } else {
        name.to_string()
    }
}

fn predicate_symbol(name: &str) -> String {
    if MANGLED_PREDICATES.contains(&name) {
        format!("p__{name}__")
    } else {
        name.to_string()
    }
}

pub(crate) fn render(formula: &Formula, name: &str, role: Role) -> String {
    format!("tff({name}, {}, {}).", role.as_str(), fmt_formula(formula))
}

fn var_list(vars: &[Rc<VariableDeclaration>]) -> String {
    vars.iter().map(|v| v.effective_name().to_uppercase()).collect::<Vec<_>>().join(", ")
}

fn comparison_symbol(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "!=",
        ComparisonOperator::Less => "$less",
        ComparisonOperator::LessEqual => "$lesseq",
        ComparisonOperator::Greater => "$greater",
        ComparisonOperator::GreaterEqual => "$greatereq",
    }
}

fn fmt_formula(f: &Formula) -> String {
    match f {
        Formula::Boolean(true) => "$true".to_string(),
        Formula::Boolean(false) => "$false".to_string(),
        Formula::Comparison(op, l, r) => format!("({} {} {})", fmt_term(l), comparison_symbol(*op), fmt_term(r)),
        Formula::In(element, set) => format!("p__in__({}, {})", fmt_term(element), fmt_term(set)),
        Formula::Predicate(decl, args) => {
            if args.is_empty() {
                predicate_symbol(&decl.name)
            } else {
                let args = args.iter().map(fmt_term).collect::<Vec<_>>().join(", ");
                format!("{}({})", predicate_symbol(&decl.name), args)
            }
        }
        Formula::Not(inner) => format!("~({})", fmt_formula(inner)),
        Formula::And(args) => format!("({})", args.iter().map(fmt_formula).collect::<Vec<_>>().join(" & ")),
        Formula::Or(args) => format!("({})", args.iter().map(fmt_formula).collect::<Vec<_>>().join(" | ")),
        Formula::Implies(a, b) => format!("({} => {})", fmt_formula(a), fmt_formula(b)),
        Formula::Biconditional(a, b) => format!("({} <=> {})", fmt_formula(a), fmt_formula(b)),
        Formula::Exists(vars, inner) => format!("(? [{}] : {})", var_list(vars), fmt_formula(inner)),
        Formula::ForAll(vars, inner) => format!("(! [{}] : {})", var_list(vars), fmt_formula(inner)),
    }
}

fn fmt_term(t: &Term) -> String {
    match t {
        Term::Integer(n) => n.to_string(),
        Term::SpecialInteger(SpecialInteger::Infimum) => "f__inf__".to_string(),
        Term::SpecialInteger(SpecialInteger::Supremum) => "f__sup__".to_string(),
        Term::String(s) => format!("\"{s}\""),
        Term::Boolean(true) => "f__true__".to_string(),
        Term::Boolean(false) => "f__false__".to_string(),
        Term::Variable(decl) => decl.effective_name().to_uppercase(),
        Term::Function(decl, args) => {
            if args.is_empty() {
                function_symbol(&decl.name)
            } else {
                let args = args.iter().map(fmt_term).collect::<Vec<_>>().join(", ");
                format!("{}({})", function_symbol(&decl.name), args)
            }
        }
        Term::BinaryOperation(op, l, r) => format!("{}({}, {})", function_symbol(binary_name(*op)), fmt_term(l), fmt_term(r)),
        Term::UnaryOperation(UnaryOperator::Negative, inner) => format!("{}({})", function_symbol("negative"), fmt_term(inner)),
        Term::UnaryOperation(UnaryOperator::AbsoluteValue, inner) => format!("{}({})", function_symbol("absolute"), fmt_term(inner)),
        Term::Interval(from, to) => format!("f__interval__({}, {})", fmt_term(from), fmt_term(to)),
    }
}

fn binary_name(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "sum",
        BinaryOperator::Subtract => "difference",
        BinaryOperator::Multiply => "product",
        BinaryOperator::Divide => "quotient",
        BinaryOperator::Modulo => "remainder",
        BinaryOperator::Power => "power",
    }
}

/// A fixed preamble declaring the single object sort and the
/// domain-unification symbols' defining axioms (spec §6 Emit format).
pub(crate) fn render_preamble(out: &mut impl Write) {
    let _ = writeln!(out, "tff(object_type, type, object: $tType).");
    let _ = writeln!(out, "tff(f__integer__type, type, f__integer__: $int > object).");
    for name in ["sum", "difference", "product", "quotient", "remainder"] {
        let _ = writeln!(out, "tff(f__{name}__type, type, f__{name}__: (object * object) > object).");
    }
    for name in ["negative", "absolute"] {
        let _ = writeln!(out, "tff(f__{name}__type, type, f__{name}__: object > object).");
    }
    for name in ["less", "less_equal", "greater", "greater_equal"] {
        let _ = writeln!(out, "tff(p__{name}__type, type, p__{name}__: (object * object) > $o).");
    }
    let _ = writeln!(out, "tff(p__is_integer__type, type, p__is_integer__: object > $o).");
    let _ = writeln!(
        out,
        "tff(is_integer_def, axiom, ! [X] : (p__is_integer__(X) <=> ? [N] : (X = f__integer__(N))))."
    );
}
