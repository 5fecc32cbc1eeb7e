// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Policy-enforcement errors: column denial, missing tenant/ABAC
//! parameters, and OR-bypass hardening failures.

use serde_json::{json, Value};
use thiserror::Error;

pub type PolicyResult<T> = Result<T, PolicyError>;

#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("column '{table}.{column}' is denied by policy")]
    ColumnDenied { table: String, column: String },

    #[error("table '{table}' requires a bound predicate on '{column}' via parameter '{param}'")]
    MissingRequiredParam {
        table: String,
        column: String,
        param: String,
    },

    #[error(
        "required predicate '{table}.{column} = :{param}' is missing from at least one OR branch \
         that references '{table}'"
    )]
    OrBypass {
        table: String,
        column: String,
        param: String,
    },
}

impl PolicyError {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::ColumnDenied { .. } => "policy.column_denied",
            PolicyError::MissingRequiredParam { .. } => "policy.missing_required_param",
            PolicyError::OrBypass { .. } => "policy.or_bypass",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            PolicyError::ColumnDenied { table, column } => {
                json!({ "table": table, "column": column })
            }
            PolicyError::MissingRequiredParam { table, column, param } => {
                json!({ "table": table, "column": column, "param": param })
            }
            PolicyError::OrBypass { table, column, param } => {
                json!({ "table": table, "column": column, "param": param })
            }
        }
    }
}
