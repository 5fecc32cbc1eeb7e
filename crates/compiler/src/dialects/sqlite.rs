// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use planguard_ir::LikeOp;

use crate::sql_compiler::SQLCompiler;

/// SQLite has no `ILIKE`; `ILIKE` is downgraded to `LIKE` since SQLite's
/// `LIKE` is already case-insensitive for ASCII by default.
#[derive(Debug, Default)]
pub struct SqliteCompiler;

impl SQLCompiler for SqliteCompiler {
    fn dialect_name(&self) -> &str {
        "sqlite"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn param_placeholder(&self, name: &str) -> String {
        format!(":{}", name)
    }

    fn like_operator(&self, _op: LikeOp) -> &'static str {
        "LIKE"
    }
}
