// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use planguard_ir::LikeOp;

use crate::sql_compiler::SQLCompiler;

/// Postgres renders `ILIKE` natively and double-quotes identifiers.
#[derive(Debug, Default)]
pub struct PostgresCompiler;

impl SQLCompiler for PostgresCompiler {
    fn dialect_name(&self) -> &str {
        "postgres"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn param_placeholder(&self, name: &str) -> String {
        format!("%({})s", name)
    }

    fn like_operator(&self, op: LikeOp) -> &'static str {
        match op {
            LikeOp::Like => "LIKE",
            LikeOp::ILike => "ILIKE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_with_doubled_embedded_quotes() {
        let c = PostgresCompiler;
        assert_eq!(c.quote_identifier("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn placeholder_is_percent_paren_s() {
        let c = PostgresCompiler;
        assert_eq!(c.param_placeholder("tenant_id"), "%(tenant_id)s");
    }
}
