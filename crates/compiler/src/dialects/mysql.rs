// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use planguard_ir::{LikeOp, Literal, Operand};

use crate::error::CompileResult;
use crate::sql_compiler::SQLCompiler;

/// MySQL quotes identifiers with backticks and has no `ILIKE`; it also
/// lacks `DATE_PART`. `DATE_PART(YEAR, ...)` rewrites to `YEAR(...)`; every
/// other part falls back to `EXTRACT(<PART> FROM ...)`, which MySQL 8+
/// also accepts.
#[derive(Debug, Default)]
pub struct MysqlCompiler;

/// The literal part name a `DATE_PART` call's first argument carries, if
/// it's a plain string literal and not something that needs `build_arg` to
/// render (a parameter, a nested call, ...).
fn literal_part_name(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Value(Literal::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

impl SQLCompiler for MysqlCompiler {
    fn dialect_name(&self) -> &str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn param_placeholder(&self, name: &str) -> String {
        format!("%({})s", name)
    }

    fn like_operator(&self, _op: LikeOp) -> &'static str {
        "LIKE"
    }

    fn build_func_call(
        &self,
        name: &str,
        args: &[Operand],
        build_arg: &mut dyn FnMut(&Operand) -> CompileResult<String>,
    ) -> CompileResult<String> {
        if name.eq_ignore_ascii_case("DATE_PART") && args.len() == 2 {
            let expr = build_arg(&args[1])?;
            return Ok(match literal_part_name(&args[0]) {
                Some(part) if part.eq_ignore_ascii_case("YEAR") => format!("YEAR({})", expr),
                Some(part) => format!("EXTRACT({} FROM {})", part, expr),
                None => format!("EXTRACT({} FROM {})", build_arg(&args[0])?, expr),
            });
        }
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            rendered.push(build_arg(arg)?);
        }
        Ok(format!("{}({})", name, rendered.join(", ")))
    }
}
