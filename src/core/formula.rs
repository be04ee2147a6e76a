//! The formula AST (spec §3 Formulas).

use std::fmt;
use std::rc::Rc;

use super::decl::{PredicateDeclaration, VariableDeclaration};
use super::term::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonOperator {
    /// The complementary operator used by simplifier rule 12 (`¬(a ⊙ b) ⇒ a ⊙̄ b`).
    pub(crate) fn complement(self) -> Self {
        match self {
            ComparisonOperator::Equal => ComparisonOperator::NotEqual,
            ComparisonOperator::NotEqual => ComparisonOperator::Equal,
            ComparisonOperator::Less => ComparisonOperator::GreaterEqual,
            ComparisonOperator::LessEqual => ComparisonOperator::Greater,
            ComparisonOperator::Greater => ComparisonOperator::LessEqual,
            ComparisonOperator::GreaterEqual => ComparisonOperator::Less,
        }
    }

    pub(crate) fn is_commutative(self) -> bool {
        matches!(self, ComparisonOperator::Equal | ComparisonOperator::NotEqual)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
        };
        write!(f, "{s}")
    }
}

/// A formula, as defined by spec §3.
#[derive(Debug, Clone)]
pub(crate) enum Formula {
    Boolean(bool),
    Comparison(ComparisonOperator, Term, Term),
    /// `element in set`; `set` may be an interval or a compound term.
    In(Term, Term),
    Predicate(Rc<PredicateDeclaration>, Vec<Term>),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Biconditional(Box<Formula>, Box<Formula>),
    /// Owns its bound declarations: every reference to one of them inside `arg`
    /// must resolve to this binder (see spec §3 Essential invariants).
    Exists(Vec<Rc<VariableDeclaration>>, Box<Formula>),
    ForAll(Vec<Rc<VariableDeclaration>>, Box<Formula>),
}

impl Formula {
    pub(crate) fn predicate(decl: Rc<PredicateDeclaration>, args: Vec<Term>) -> Self {
        assert_eq!(
            args.len(),
            decl.arity,
            "predicate {} applied with {} arguments, expected {}",
            decl.name,
            args.len(),
            decl.arity
        );
        Formula::Predicate(decl, args)
    }

    pub(crate) fn and(mut args: Vec<Formula>) -> Self {
        if args.len() == 1 {
            return args.pop().unwrap();
        }
        Formula::And(args)
    }

    pub(crate) fn or(mut args: Vec<Formula>) -> Self {
        if args.len() == 1 {
            return args.pop().unwrap();
        }
        Formula::Or(args)
    }

    pub(crate) fn exists(vars: Vec<Rc<VariableDeclaration>>, arg: Formula) -> Self {
        if vars.is_empty() {
            return arg;
        }
        Formula::Exists(vars, Box::new(arg))
    }

    pub(crate) fn children(&self) -> Vec<&Formula> {
        match self {
            Formula::Boolean(_) | Formula::Comparison(..) | Formula::In(..) | Formula::Predicate(..) => vec![],
            Formula::Not(a) => vec![a.as_ref()],
            Formula::And(args) | Formula::Or(args) => args.iter().collect(),
            Formula::Implies(a, b) | Formula::Biconditional(a, b) => vec![a.as_ref(), b.as_ref()],
            Formula::Exists(_, a) | Formula::ForAll(_, a) => vec![a.as_ref()],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Vec<&mut Formula> {
        match self {
            Formula::Boolean(_) | Formula::Comparison(..) | Formula::In(..) | Formula::Predicate(..) => vec![],
            Formula::Not(a) => vec![a.as_mut()],
            Formula::And(args) | Formula::Or(args) => args.iter_mut().collect(),
            Formula::Implies(a, b) | Formula::Biconditional(a, b) => vec![a.as_mut(), b.as_mut()],
            Formula::Exists(_, a) | Formula::ForAll(_, a) => vec![a.as_mut()],
        }
    }

    /// The bound declarations this node directly owns, if any.
    pub(crate) fn bound_vars(&self) -> Option<&[Rc<VariableDeclaration>]> {
        match self {
            Formula::Exists(vars, _) | Formula::ForAll(vars, _) => Some(vars),
            _ => None,
        }
    }
}
