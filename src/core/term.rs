//! The term AST (spec §3 Terms).

use std::fmt;
use std::rc::Rc;

use super::decl::{FunctionDeclaration, VariableDeclaration};

/// Order-theoretic endpoint, distinct from every integer and every symbolic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecialInteger {
    Infimum,
    Supremum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOperator {
    pub(crate) fn is_commutative(self) -> bool {
        matches!(self, BinaryOperator::Add | BinaryOperator::Multiply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOperator {
    AbsoluteValue,
    Negative,
}

/// A term, as defined by spec §3.
#[derive(Debug, Clone)]
pub(crate) enum Term {
    Integer(i64),
    SpecialInteger(SpecialInteger),
    String(String),
    Boolean(bool),
    /// A function application; 0-ary functions are symbolic constants.
    Function(Rc<FunctionDeclaration>, Vec<Term>),
    Variable(Rc<VariableDeclaration>),
    BinaryOperation(BinaryOperator, Box<Term>, Box<Term>),
    UnaryOperation(UnaryOperator, Box<Term>),
    /// `from..to`, the integer range, empty when `from > to`.
    Interval(Box<Term>, Box<Term>),
}

impl Term {
    pub(crate) fn function(decl: Rc<FunctionDeclaration>, args: Vec<Term>) -> Self {
        assert_eq!(
            args.len(),
            decl.arity,
            "function {} applied with {} arguments, expected {}",
            decl.name,
            args.len(),
            decl.arity
        );
        Term::Function(decl, args)
    }

    /// Whether this term is "primitive" in the sense of simplifier rule 8
    /// (not an interval, not a binary operation, not a function with arguments).
    pub(crate) fn is_primitive(&self) -> bool {
        match self {
            Term::Integer(_)
            | Term::SpecialInteger(_)
            | Term::String(_)
            | Term::Boolean(_)
            | Term::Variable(_) => true,
            Term::Function(_, args) => args.is_empty(),
            Term::UnaryOperation(_, _) => true,
            Term::BinaryOperation(_, _, _) | Term::Interval(_, _) => false,
        }
    }

    pub(crate) fn children(&self) -> Vec<&Term> {
        match self {
            Term::Integer(_) | Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) | Term::Variable(_) => {
                vec![]
            }
            Term::Function(_, args) => args.iter().collect(),
            Term::BinaryOperation(_, l, r) => vec![l.as_ref(), r.as_ref()],
            Term::UnaryOperation(_, a) => vec![a.as_ref()],
            Term::Interval(from, to) => vec![from.as_ref(), to.as_ref()],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Vec<&mut Term> {
        match self {
            Term::Integer(_) | Term::SpecialInteger(_) | Term::String(_) | Term::Boolean(_) | Term::Variable(_) => {
                vec![]
            }
            Term::Function(_, args) => args.iter_mut().collect(),
            Term::BinaryOperation(_, l, r) => vec![l.as_mut(), r.as_mut()],
            Term::UnaryOperation(_, a) => vec![a.as_mut()],
            Term::Interval(from, to) => vec![from.as_mut(), to.as_mut()],
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
        };
        write!(f, "{s}")
    }
}
