// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! The per-dialect rendering seams. [`SQLCompiler`] owns every piece of SQL
//! syntax that varies across Postgres/SQLite/MySQL; the visitor in
//! [`crate::emit`] is otherwise dialect-agnostic.

use planguard_ir::{LikeOp, Operand};

use crate::error::CompileResult;

/// Dialect-specific SQL syntax: identifier quoting, parameter placeholders,
/// `LIKE`/`ILIKE` rendering, and function-call shape.
pub trait SQLCompiler: Send + Sync {
    fn dialect_name(&self) -> &str;

    /// Quotes a bare identifier (table, column, or alias) for this dialect.
    fn quote_identifier(&self, name: &str) -> String;

    /// Renders the placeholder for logical parameter `name`.
    fn param_placeholder(&self, name: &str) -> String;

    /// Renders the SQL keyword for a `LikeOp`, adapting `ILIKE` on engines
    /// that don't have it natively.
    fn like_operator(&self, op: LikeOp) -> &'static str;

    /// Renders a function call from its un-rendered argument operands.
    /// `build_arg` compiles one argument the normal way (binding a literal
    /// as a parameter, recursing into a nested call, ...); a dialect only
    /// needs to call it directly when an argument's raw shape doesn't
    /// matter. A dialect with a positional argument that must stay a literal
    /// in the rendered SQL (MySQL's `DATE_PART` unit name, say) inspects
    /// `args` itself instead of calling `build_arg` for that position.
    ///
    /// The default renders `NAME(arg0, arg1, ...)`, calling `build_arg` on
    /// every argument in order.
    fn build_func_call(
        &self,
        name: &str,
        args: &[Operand],
        build_arg: &mut dyn FnMut(&Operand) -> CompileResult<String>,
    ) -> CompileResult<String> {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            rendered.push(build_arg(arg)?);
        }
        Ok(format!("{}({})", name, rendered.join(", ")))
    }
}
