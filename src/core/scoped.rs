//! A formula paired with the free-variable declarations it owns (spec §3).

use std::rc::Rc;

use super::decl::VariableDeclaration;
use super::formula::Formula;

/// The unit of output from the rule translator (§4.3) and the unit of input
/// to completion (§4.4): a formula together with the free variables it owns.
///
/// Every free variable reference inside `formula` must resolve to one of
/// `free_vars`; every bound reference must resolve to an `Exists`/`ForAll`
/// inside `formula` itself (spec §3 Essential invariants).
#[derive(Debug, Clone)]
pub(crate) struct ScopedFormula {
    pub(crate) formula: Formula,
    pub(crate) free_vars: Vec<Rc<VariableDeclaration>>,
}

impl ScopedFormula {
    pub(crate) fn new(formula: Formula, free_vars: Vec<Rc<VariableDeclaration>>) -> Self {
        Self { formula, free_vars }
    }
}
