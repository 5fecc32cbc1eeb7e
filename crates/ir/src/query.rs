// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query plan
//!
//! [`QueryPlan`] is the typed tree mirroring a single SELECT statement,
//! including optional CTEs and a set-operation tail. It is produced by
//! `planguard-parser`, optionally mutated once by `planguard-policy`
//! (predicate injection, LIMIT defaulting), and consumed by
//! `planguard-compiler`. It is never retained past a single
//! `validate_and_compile` call.
//!
//! Every domain query used by the validator and policy engine (referenced
//! tables, referenced columns) is implemented here so both crates share one
//! definition of "what does this plan touch".

use serde::{Deserialize, Serialize};

use crate::expr::{Operand, Predicate};

/// A single SELECT statement plus optional CTEs and a set-operation tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QueryPlan {
    #[serde(rename = "WITH", default, skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<CteDef>,
    #[serde(rename = "SELECT")]
    pub select: SelectClause,
    #[serde(rename = "FROM")]
    pub from: FromClause,
    #[serde(rename = "JOIN", default, skip_serializing_if = "Vec::is_empty")]
    pub join: Vec<JoinClause>,
    #[serde(rename = "WHERE", default, skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Predicate>,
    #[serde(rename = "GROUP_BY", default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<Operand>,
    #[serde(rename = "HAVING", default, skip_serializing_if = "Option::is_none")]
    pub having: Option<Predicate>,
    #[serde(rename = "WINDOW", default, skip_serializing_if = "Vec::is_empty")]
    pub window: Vec<WindowSpec>,
    #[serde(rename = "ORDER_BY", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderByItem>,
    #[serde(rename = "LIMIT", default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<LimitValue>,
    #[serde(rename = "OFFSET", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<LimitValue>,
    #[serde(rename = "SET_OP", default, skip_serializing_if = "Option::is_none")]
    pub set_op: Option<SetOpClause>,
}

impl QueryPlan {
    /// Tables this plan's FROM/JOIN clauses introduce, in the order they
    /// come into scope. Does not descend into subqueries.
    pub fn own_table_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let FromClause::Table { table } = &self.from {
            names.push(table.as_str());
        }
        names
    }

    /// `true` if this plan is the right-hand side of a set operation or is
    /// itself never top-level (used by the policy engine to decide whether
    /// LIMIT defaulting applies).
    pub fn is_select_wildcard(&self) -> bool {
        matches!(self.select, SelectClause::Wildcard)
    }
}

/// Shape of the SELECT clause: either the bare `"*"` wildcard or a
/// non-empty list of projected items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectClause {
    Wildcard,
    Items(Vec<SelectItem>),
}

impl Default for SelectClause {
    fn default() -> Self {
        SelectClause::Items(Vec::new())
    }
}

/// One projected expression, with an optional alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub expr: Operand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// The FROM clause: either a base table or an aliased derived table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FromClause {
    Table { table: String },
    Subquery {
        subquery: Box<QueryPlan>,
        alias: String,
    },
}

impl Default for FromClause {
    fn default() -> Self {
        FromClause::Table {
            table: String::new(),
        }
    }
}

/// A single JOIN, expressed in terms of a declared schema relationship
/// rather than an explicit ON expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub rel: String,
    #[serde(rename = "type")]
    pub join_type: JoinType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    #[serde(rename = "INNER")]
    Inner,
    #[serde(rename = "LEFT")]
    Left,
    #[serde(rename = "RIGHT")]
    Right,
    #[serde(rename = "FULL")]
    Full,
}

/// A named CTE, pushed into scope before the main body is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CteDef {
    pub name: String,
    pub plan: Box<QueryPlan>,
    #[serde(default)]
    pub recursive: bool,
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expr: Operand,
    pub dir: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// A LIMIT/OFFSET value: either a literal non-negative integer or a
/// runtime parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitValue {
    Value(i64),
    Param(String),
}

/// A named window definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_by: Vec<Operand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderByItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFrame {
    pub units: WindowFrameUnits,
    pub start: WindowFrameBound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<WindowFrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFrameUnits {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WindowFrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    Preceding(Operand),
    Following(Operand),
}

/// A set-operation tail: `UNION [ALL] | INTERSECT | EXCEPT <right>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOpClause {
    pub op: SetOpKind,
    pub right: Box<QueryPlan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOpKind {
    #[serde(rename = "UNION")]
    Union,
    #[serde(rename = "UNION_ALL")]
    UnionAll,
    #[serde(rename = "INTERSECT")]
    Intersect,
    #[serde(rename = "EXCEPT")]
    Except,
}

impl QueryPlan {
    /// Number of columns this plan projects, when it can be determined
    /// without schema access (i.e. not a `"*"` wildcard).
    pub fn projection_arity(&self) -> Option<usize> {
        match &self.select {
            SelectClause::Wildcard => None,
            SelectClause::Items(items) => Some(items.len()),
        }
    }
}
