// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Validation errors
//!
//! One flat enum covering dialect, schema, and semantic violations. Each
//! variant maps to a dotted `code` and a `details` object so a caller can
//! hand the failure back to the planner as a structured repair hint.

use serde_json::{json, Value};
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

// A scalar subquery (`(SELECT ...)` used where a value is expected) has no
// `Operand` variant and no parser tag, so an attempt to express one fails
// during parsing with `ParseError::UnknownTag` rather than reaching
// validation at all. There is deliberately no `ValidationError` variant for
// it.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("capability '{capability}' is not enabled for dialect '{target}'")]
    DialectDisabled { target: String, capability: String },

    #[error("WITH RECURSIVE requires both 'ctes' and 'subqueries' to be enabled")]
    RecursionNotEnabled,

    #[error("join chain length {len} exceeds max_join_depth {max}")]
    JoinDepthExceeded { len: usize, max: usize },

    #[error("table '{table}' is not declared in the schema or in scope")]
    UnknownTable { table: String },

    #[error("column '{table}.{column}' does not exist")]
    UnknownColumn { table: String, column: String },

    #[error("relationship '{key}' is not declared in the schema")]
    UnknownRelationship { key: String },

    #[error("relationship '{key}' does not connect to any table currently in scope")]
    JoinNotConnected { key: String },

    #[error("function '{name}' is not allowed for dialect '{target}'")]
    BadFunction { name: String, target: String },

    #[error("HAVING requires a non-empty GROUP BY")]
    HavingWithoutGroupBy,

    #[error("operand in {clause} is neither aggregated nor present in GROUP BY")]
    NonAggregateNotInGroupBy { clause: &'static str },

    #[error("duplicate SELECT alias '{0}'")]
    DuplicateAlias(String),

    #[error("SET_OP branches project {left} and {right} columns")]
    SetOpColumnMismatch { left: usize, right: usize },

    #[error("{clause} value {value} is out of range [0, {max})")]
    ValueOutOfRange {
        clause: &'static str,
        value: i64,
        max: i64,
    },

    #[error("OFFSET without a preceding LIMIT is not enabled for dialect '{target}'")]
    OffsetWithoutLimit { target: String },

    #[error("operator '{op}' expects {expected}, found {found}")]
    ArityMismatch {
        op: &'static str,
        expected: &'static str,
        found: usize,
    },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::DialectDisabled { .. } => "validate.dialect_disabled",
            ValidationError::RecursionNotEnabled => "validate.recursion_not_enabled",
            ValidationError::JoinDepthExceeded { .. } => "validate.join_depth_exceeded",
            ValidationError::UnknownTable { .. } => "validate.unknown_table",
            ValidationError::UnknownColumn { .. } => "validate.unknown_column",
            ValidationError::UnknownRelationship { .. } => "validate.unknown_relationship",
            ValidationError::JoinNotConnected { .. } => "validate.join_not_connected",
            ValidationError::BadFunction { .. } => "validate.bad_function",
            ValidationError::HavingWithoutGroupBy => "validate.having_without_group_by",
            ValidationError::NonAggregateNotInGroupBy { .. } => "validate.group_by_coverage",
            ValidationError::DuplicateAlias(_) => "validate.duplicate_alias",
            ValidationError::SetOpColumnMismatch { .. } => "validate.set_op_column_mismatch",
            ValidationError::ValueOutOfRange { .. } => "validate.value_out_of_range",
            ValidationError::OffsetWithoutLimit { .. } => "validate.offset_without_limit",
            ValidationError::ArityMismatch { .. } => "validate.arity_mismatch",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            ValidationError::DialectDisabled { target, capability } => {
                json!({ "target": target, "capability": capability })
            }
            ValidationError::RecursionNotEnabled => json!({}),
            ValidationError::JoinDepthExceeded { len, max } => {
                json!({ "len": len, "max": max })
            }
            ValidationError::UnknownTable { table } => json!({ "table": table }),
            ValidationError::UnknownColumn { table, column } => {
                json!({ "table": table, "column": column })
            }
            ValidationError::UnknownRelationship { key } => json!({ "key": key }),
            ValidationError::JoinNotConnected { key } => json!({ "key": key }),
            ValidationError::BadFunction { name, target } => {
                json!({ "name": name, "target": target })
            }
            ValidationError::HavingWithoutGroupBy => json!({}),
            ValidationError::NonAggregateNotInGroupBy { clause } => json!({ "clause": clause }),
            ValidationError::DuplicateAlias(alias) => json!({ "alias": alias }),
            ValidationError::SetOpColumnMismatch { left, right } => {
                json!({ "left": left, "right": right })
            }
            ValidationError::ValueOutOfRange { clause, value, max } => {
                json!({ "clause": clause, "value": value, "max": max })
            }
            ValidationError::OffsetWithoutLimit { target } => json!({ "target": target }),
            ValidationError::ArityMismatch {
                op,
                expected,
                found,
            } => json!({ "op": op, "expected": expected, "found": found }),
        }
    }
}
