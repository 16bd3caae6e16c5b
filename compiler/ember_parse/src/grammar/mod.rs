//! Grammar productions, split by syntactic category.
//!
//! Precedence, loosest first: assignment, conditional, `||`/`or`,
//! `&&`/`and`, equality, comparison, additive, multiplicative,
//! prefix (`-`, `!`, `not`, `await`, `++`, `--`), postfix (calls, members,
//! indexing, `++`, `--`), primary.

mod expr;
mod item;
mod stmt;
