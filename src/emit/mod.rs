//! Pretty-printers (spec §6 Emit format): the core produces a formula AST,
//! printing it is a separate, swappable concern exercised only through
//! [human]/[tptp]'s free functions.

pub(crate) mod human;
pub(crate) mod tptp;

/// `--parentheses` (spec §6 CLI surface): `Normal` omits parentheses implied by
/// precedence, `Full` always parenthesizes every compound sub-formula/term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParenthesisStyle {
    Normal,
    Full,
}
