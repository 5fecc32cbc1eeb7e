// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified error type
//!
//! [`QueryCoreError`] wraps the per-crate leaf error types behind one root
//! so a caller driving an LLM repair loop only has to match on one enum.
//! Each leaf already carries its own stable `code()`/`details()`; this type
//! just forwards to whichever one fired.

use serde_json::{json, Value};
use thiserror::Error;

use planguard_compiler::CompilationError;
use planguard_ir::ProfileConfigError;
use planguard_parser::ParseError;
use planguard_policy::PolicyError;
use planguard_semantic::ValidationError;

pub type QueryCoreResult<T> = Result<T, QueryCoreError>;

/// The `{code, message, details}` triple handed back to an LLM repair loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Clone, Error)]
pub enum QueryCoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validate(#[from] ValidationError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Compile(#[from] CompilationError),
    #[error(transparent)]
    DialectConfig(#[from] ProfileConfigError),
}

impl QueryCoreError {
    pub fn code(&self) -> String {
        match self {
            QueryCoreError::Parse(e) => e.code().to_string(),
            QueryCoreError::Validate(e) => e.code().to_string(),
            QueryCoreError::Policy(e) => e.code().to_string(),
            QueryCoreError::Compile(e) => e.code().to_string(),
            QueryCoreError::DialectConfig(ProfileConfigError::MissingDependency { capability, requires }) => {
                format!("dialect.missing_dependency.{}.{}", capability, requires)
            }
        }
    }

    pub fn details(&self) -> Value {
        match self {
            QueryCoreError::Parse(e) => e.details(),
            QueryCoreError::Validate(e) => e.details(),
            QueryCoreError::Policy(e) => e.details(),
            QueryCoreError::Compile(e) => e.details(),
            QueryCoreError::DialectConfig(ProfileConfigError::MissingDependency { capability, requires }) => {
                json!({ "capability": capability, "requires": requires })
            }
        }
    }

    /// Builds the `{code, message, details}` triple this crate's doc
    /// promises every caller for LLM repair loops.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_error_surfaces_its_own_code() {
        let err = QueryCoreError::from(PolicyError::ColumnDenied {
            table: "employees".to_string(),
            column: "salary".to_string(),
        });
        let response = err.to_error_response();
        assert_eq!(response.code, "policy.column_denied");
        assert_eq!(response.details["table"], "employees");
    }

    #[test]
    fn dialect_config_error_names_the_unmet_dependency() {
        let err = QueryCoreError::from(ProfileConfigError::MissingDependency {
            capability: "ctes",
            requires: "subqueries",
        });
        let response = err.to_error_response();
        assert_eq!(response.code, "dialect.missing_dependency.ctes.subqueries");
    }
}
