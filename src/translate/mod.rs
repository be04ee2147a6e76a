//! Rule translation: mapping one source rule to a [crate::core::scoped::ScopedFormula] (§4.3).

pub(crate) mod choose;
pub(crate) mod rule;

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::context::Context;
use crate::core::decl::{Sort, VarKind, VariableDeclaration};

/// Binds named source variables to a single declaration per rule and mints
/// fresh auxiliaries, without prejudging which of either ends up free in the
/// rule's final formula — some auxiliaries (choose-value-in-term's `u`s,
/// a literal's own argument variables) are immediately closed by a local
/// `Exists` the caller builds right after minting them. The true free-variable
/// list is recovered afterward by walking the finished formula (see
/// [crate::core::copy::collect_free_vars]), not tracked incrementally here.
///
/// Display names are numbered per rule and per kind, not per source name:
/// `V1`, `V2`, ... for head variables, `U1`, `U2`, ... for the source's own
/// named variables (in first-mention order), `X1`, `X2`, ... for every other
/// auxiliary. [crate::core::decl::VariableDeclaration::effective_name] later
/// overrides this to `N1`, `N2`, ... wherever [crate::integer_detect] marks
/// the variable's sort as `Integer`.
pub(crate) struct RuleScope<'ctx> {
    pub(crate) ctx: &'ctx mut Context,
    named: HashMap<String, Rc<VariableDeclaration>>,
    head_count: u32,
    user_count: u32,
    aux_count: u32,
}

impl<'ctx> RuleScope<'ctx> {
    pub(crate) fn new(ctx: &'ctx mut Context) -> Self {
        Self {
            ctx,
            named: HashMap::new(),
            head_count: 0,
            user_count: 0,
            aux_count: 0,
        }
    }

    /// Returns the declaration already bound to `name` in this rule, or binds
    /// a fresh one (sort `Unknown`, to be refined by [crate::integer_detect]).
    /// `name` is only the lookup key; the declaration's display name is the
    /// next `U`-numbered slot, independent of the source's own spelling.
    pub(crate) fn get_or_bind(&mut self, name: &str) -> Rc<VariableDeclaration> {
        if let Some(decl) = self.named.get(name) {
            return decl.clone();
        }
        self.user_count += 1;
        let decl = self.ctx.fresh_variable(VarKind::UserDefined, format!("U{}", self.user_count), Sort::Unknown);
        self.named.insert(name.to_string(), decl.clone());
        decl
    }

    /// Allocates a fresh auxiliary variable of the given kind and sort. Used
    /// for choose-value-in-term's `u`/`i`/`j`/`q`/`r`/`k` auxiliaries (always
    /// `Body`/`Integer`, numbered `X1`, `X2`, ...) and for head-argument
    /// variables (`Head`, sort `Unknown`, numbered `V1`, `V2`, ...).
    pub(crate) fn fresh(&mut self, kind: VarKind, sort: Sort) -> Rc<VariableDeclaration> {
        let display = match kind {
            VarKind::Head => {
                self.head_count += 1;
                format!("V{}", self.head_count)
            }
            _ => {
                self.aux_count += 1;
                format!("X{}", self.aux_count)
            }
        };
        self.ctx.fresh_variable(kind, display, sort)
    }
}
