//! Declarations for predicates, functions, and variables.
//!
//! Declarations are shared by reference (see [crate::core::context::Context]):
//! once allocated, a declaration lives for the lifetime of the translation and
//! every term/formula node that mentions it holds an [std::rc::Rc] to the same
//! object, per spec's "process-lifetime symbol table" invariant.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// The sort (type) a variable or function result is known to range over.
///
/// `Program` is the untyped default sort used by plain ASP source; `Union` is
/// introduced only by [crate::domain]'s domain-unification pass when emitting
/// into a single-sorted target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sort {
    Unknown,
    Program,
    Integer,
    Symbolic,
    Union,
}

/// Why a variable declaration exists, i.e. where it was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VarKind {
    /// Declared directly by the source program.
    UserDefined,
    /// Introduced by the rule translator for a head argument (§4.3).
    Head,
    /// Introduced by the rule translator for a body/choose-value auxiliary (§4.3).
    Body,
    /// Introduced for an `#external`-declared input parameter.
    Input,
}

/// Whether a predicate's definition is folded away by hidden-predicate elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    /// Inherits the program-wide default (set by the driver from `#show`/absence thereof).
    Default,
    Visible,
    Hidden,
}

/// A predicate's declaration, identified by `(name, arity)`.
#[derive(Debug)]
pub(crate) struct PredicateDeclaration {
    pub(crate) name: String,
    pub(crate) arity: usize,
    /// Per-parameter sort, mutated in place by [crate::integer_detect] and [crate::domain].
    pub(crate) param_sorts: Vec<Cell<Sort>>,
    pub(crate) visibility: Cell<Visibility>,
    /// Whether any rule head or body literal mentions this predicate.
    pub(crate) is_used: Cell<bool>,
    pub(crate) is_external: Cell<bool>,
}

impl PredicateDeclaration {
    pub(crate) fn new(name: String, arity: usize) -> Self {
        Self {
            name,
            arity,
            param_sorts: (0..arity).map(|_| Cell::new(Sort::Unknown)).collect(),
            visibility: Cell::new(Visibility::Default),
            is_used: Cell::new(false),
            is_external: Cell::new(false),
        }
    }

    /// Whether this predicate's definition should be inlined away (§4.7).
    pub(crate) fn is_hidden(&self, default_hidden: bool) -> bool {
        match self.visibility.get() {
            Visibility::Visible => false,
            Visibility::Hidden => true,
            Visibility::Default => default_hidden,
        }
    }
}

impl fmt::Display for PredicateDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A function's declaration, identified by `(name, arity)`.
#[derive(Debug)]
pub(crate) struct FunctionDeclaration {
    pub(crate) name: String,
    pub(crate) arity: usize,
    pub(crate) domain: Cell<Sort>,
}

impl FunctionDeclaration {
    pub(crate) fn new(name: String, arity: usize) -> Self {
        Self {
            name,
            arity,
            domain: Cell::new(Sort::Unknown),
        }
    }
}

impl fmt::Display for FunctionDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A variable's declaration.
///
/// Unlike predicate/function declarations, variable declarations are *not*
/// deduplicated by name: each call to [crate::core::context::Context::fresh_variable]
/// (or a clone performed by [crate::core::copy::prepare_copy]) allocates a new,
/// distinct declaration, addressed by identity ([Rc] pointer equality) rather
/// than by name. Two variables named `X` in different rules are unrelated.
#[derive(Debug)]
pub(crate) struct VariableDeclaration {
    pub(crate) kind: VarKind,
    pub(crate) display_name: String,
    pub(crate) sort: Cell<Sort>,
}

impl VariableDeclaration {
    pub(crate) fn new(kind: VarKind, display_name: impl Into<String>, sort: Sort) -> Rc<Self> {
        Rc::new(Self {
            kind,
            display_name: display_name.into(),
            sort: Cell::new(sort),
        })
    }

    /// Clones this declaration's kind/name/sort into a fresh, independent declaration.
    ///
    /// Used by [crate::core::copy::prepare_copy] to rebind bound variables on copy.
    pub(crate) fn clone_fresh(&self) -> Rc<Self> {
        Rc::new(Self {
            kind: self.kind,
            display_name: self.display_name.clone(),
            sort: Cell::new(self.sort.get()),
        })
    }

    /// `display_name` with its leading letter(s) swapped for `N` once this
    /// variable is known to range over integers (spec §4.6): a head variable
    /// minted as `V1` renders as `N1` after [crate::integer_detect] marks it.
    pub(crate) fn effective_name(&self) -> String {
        if self.sort.get() != Sort::Integer {
            return self.display_name.clone();
        }
        let digits_at = self.display_name.find(|c: char| c.is_ascii_digit()).unwrap_or(self.display_name.len());
        format!("N{}", &self.display_name[digits_at..])
    }
}

impl fmt::Display for VariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Pointer-identity equality/hash for `Rc<VariableDeclaration>`, used wherever
/// we need a `HashMap`/`HashSet` keyed by declaration identity (e.g. the
/// replacement map in [crate::core::copy::prepare_copy]).
#[derive(Debug, Clone)]
pub(crate) struct VarRef(pub(crate) Rc<VariableDeclaration>);

impl PartialEq for VarRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for VarRef {}

impl std::hash::Hash for VarRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state)
    }
}
