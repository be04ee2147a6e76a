//! Generic recursive traversals over terms and formulas (spec §4.2).
//!
//! A visitor exposes one `visit_<variant>` method per tag; `accept` dispatches
//! on the tag and, by default, recurses into children first (post-order) before
//! calling the corresponding `visit_*` method. A rewriter overrides the
//! variants it cares about; unmentioned variants keep the default recursion.
//! Mirrors `clausy`'s `postorder_rev`/`prepostorder_rev` traversal idiom
//! (`core/arena.rs`), adapted from arena-index iteration to owned recursive trees.

use super::formula::Formula;
use super::term::Term;

/// A post-order rewriting visitor over [Term].
///
/// Every method receives the node by mutable reference and may replace it
/// in place. The default implementation for compound variants simply
/// recurses into each child with [TermVisitor::accept_term] and leaves the
/// node itself untouched; override `visit_*` to add behavior at that variant.
pub(crate) trait TermVisitor {
    fn visit_integer(&mut self, _t: &mut Term) {}
    fn visit_special_integer(&mut self, _t: &mut Term) {}
    fn visit_string(&mut self, _t: &mut Term) {}
    fn visit_boolean(&mut self, _t: &mut Term) {}
    fn visit_function(&mut self, _t: &mut Term) {}
    fn visit_variable(&mut self, _t: &mut Term) {}
    fn visit_binary_operation(&mut self, _t: &mut Term) {}
    fn visit_unary_operation(&mut self, _t: &mut Term) {}
    fn visit_interval(&mut self, _t: &mut Term) {}

    /// Recurses into `term`'s children, then dispatches to the matching `visit_*`.
    fn accept_term(&mut self, term: &mut Term) {
        for child in term.children_mut() {
            self.accept_term(child);
        }
        match term {
            Term::Integer(_) => self.visit_integer(term),
            Term::SpecialInteger(_) => self.visit_special_integer(term),
            Term::String(_) => self.visit_string(term),
            Term::Boolean(_) => self.visit_boolean(term),
            Term::Function(_, _) => self.visit_function(term),
            Term::Variable(_) => self.visit_variable(term),
            Term::BinaryOperation(..) => self.visit_binary_operation(term),
            Term::UnaryOperation(..) => self.visit_unary_operation(term),
            Term::Interval(..) => self.visit_interval(term),
        }
    }
}

/// A post-order rewriting visitor over [Formula], analogous to [TermVisitor].
///
/// A visitor that also needs to touch terms should call
/// [TermVisitor::accept_term] explicitly from the relevant `visit_*` override
/// (e.g. `visit_comparison`); the two traversals are not auto-composed, since
/// not every formula visitor needs to reach into terms.
pub(crate) trait FormulaVisitor {
    fn visit_boolean(&mut self, _f: &mut Formula) {}
    fn visit_comparison(&mut self, _f: &mut Formula) {}
    fn visit_in(&mut self, _f: &mut Formula) {}
    fn visit_predicate(&mut self, _f: &mut Formula) {}
    fn visit_not(&mut self, _f: &mut Formula) {}
    fn visit_and(&mut self, _f: &mut Formula) {}
    fn visit_or(&mut self, _f: &mut Formula) {}
    fn visit_implies(&mut self, _f: &mut Formula) {}
    fn visit_biconditional(&mut self, _f: &mut Formula) {}
    fn visit_exists(&mut self, _f: &mut Formula) {}
    fn visit_forall(&mut self, _f: &mut Formula) {}

    /// Recurses into `formula`'s children, then dispatches to the matching `visit_*`.
    fn accept_formula(&mut self, formula: &mut Formula) {
        for child in formula.children_mut() {
            self.accept_formula(child);
        }
        match formula {
            Formula::Boolean(_) => self.visit_boolean(formula),
            Formula::Comparison(..) => self.visit_comparison(formula),
            Formula::In(..) => self.visit_in(formula),
            Formula::Predicate(..) => self.visit_predicate(formula),
            Formula::Not(_) => self.visit_not(formula),
            Formula::And(_) => self.visit_and(formula),
            Formula::Or(_) => self.visit_or(formula),
            Formula::Implies(..) => self.visit_implies(formula),
            Formula::Biconditional(..) => self.visit_biconditional(formula),
            Formula::Exists(..) => self.visit_exists(formula),
            Formula::ForAll(..) => self.visit_forall(formula),
        }
    }
}

/// Applies `f` to every [Term] appearing anywhere inside `formula`, including
/// terms nested inside [Term::Function] arguments. Used by passes (e.g.
/// [crate::integer_detect]) that need to inspect/rewrite terms without
/// implementing a full [FormulaVisitor].
pub(crate) fn for_each_term_mut(formula: &mut Formula, f: &mut impl FnMut(&mut Term)) {
    match formula {
        Formula::Comparison(_, l, r) | Formula::In(l, r) => {
            f(l);
            f(r);
        }
        Formula::Predicate(_, args) => {
            for a in args {
                f(a);
            }
        }
        _ => {}
    }
    for child in formula.children_mut() {
        for_each_term_mut(child, f);
    }
}
