// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scalar expressions and predicates
//!
//! This module holds the two mutually referential trees that make up a
//! [`crate::query::QueryPlan`]'s scalar language:
//!
//! - [`Operand`] — a value-producing expression (column, literal, runtime
//!   parameter, function call, or CASE).
//! - [`Predicate`] — a boolean-producing expression (comparisons, NULL
//!   checks, pattern matches, set membership, ranges, boolean connectives,
//!   and EXISTS).
//!
//! `Operand::Case` holds `Predicate` conditions and `Predicate::In`/`Exists`
//! can hold a nested `QueryPlan`, so the three types are validated by
//! mutually recursive functions in `planguard-semantic` — see that crate's
//! `ValidationContext`.

use serde::{Deserialize, Serialize};

use crate::query::QueryPlan;

/// A scalar expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Operand {
    /// A bound `table.column` reference.
    Col(ColumnRef),
    /// A literal value, always compiled as a bound parameter.
    Value(Literal),
    /// A runtime-supplied named parameter.
    Param(String),
    /// A function call; `name` is checked against the dialect allowlist or
    /// the builtin aggregate/window registry during validation.
    Func { name: String, args: Vec<Operand> },
    /// A `CASE WHEN <predicate> THEN <operand> ... [ELSE <operand>] END`.
    Case {
        when: Vec<WhenClause>,
        r#else: Option<Box<Operand>>,
    },
}

/// One `WHEN <cond> THEN <then>` arm of an [`Operand::Case`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub cond: Predicate,
    pub then: Operand,
}

/// A `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

/// Raised when a `"table.column"` string doesn't match `IDENT "." IDENT`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column reference '{0}' is not of the form IDENT.IDENT")]
pub struct ColumnRefParseError(pub String);

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Parse a `"table.column"` string. Both halves must be non-empty and
    /// contain no further `.`; this is a syntactic check only — the parser
    /// never consults the schema.
    pub fn parse(s: &str) -> Result<Self, ColumnRefParseError> {
        let mut parts = s.split('.');
        let table = parts.next().filter(|p| !p.is_empty());
        let column = parts.next().filter(|p| !p.is_empty());
        if parts.next().is_some() || table.is_none() || column.is_none() {
            return Err(ColumnRefParseError(s.to_string()));
        }
        Ok(ColumnRef::new(table.unwrap(), column.unwrap()))
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// A literal value, inlined as a bound parameter — never interpolated into
/// the SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CmpOp {
    pub fn sql_symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Neq => "<>",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
        }
    }
}

/// `LIKE` / `ILIKE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LikeOp {
    Like,
    ILike,
}

/// Right-hand side of `IN` / `NOT IN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InRhs {
    List(Vec<Operand>),
    Subquery(Box<QueryPlan>),
}

/// A boolean expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Predicate {
    Cmp {
        op: CmpOp,
        left: Operand,
        right: Operand,
    },
    IsNull(Operand),
    IsNotNull(Operand),
    Like {
        op: LikeOp,
        left: Operand,
        right: Operand,
    },
    In {
        left: Operand,
        rhs: InRhs,
        negated: bool,
    },
    Between {
        expr: Operand,
        low: Operand,
        high: Operand,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Exists {
        subquery: Box<QueryPlan>,
        negated: bool,
    },
    /// An operator registered in the `OperatorRegistry` that isn't one of
    /// the built-ins above.
    Extension { op: String, args: Vec<Operand> },
}
