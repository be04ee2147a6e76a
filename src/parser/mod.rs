//! Front end for the restricted ASP rule language (spec §6 source-AST
//! boundary): the only producer of [crate::source] nodes, kept entirely
//! separate from the core so the core never depends on surface syntax.

pub(crate) mod asp;
