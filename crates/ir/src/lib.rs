// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # PlanGuard — typed plan model
//!
//! This crate defines the grammar a `QueryPlan` JSON document must conform
//! to: [`query::QueryPlan`] and its clauses, the [`expr::Operand`] /
//! [`expr::Predicate`] scalar language, [`dialect::DialectProfile`], and the
//! raw [`schema::Table`] / [`schema::Column`] / [`schema::Relationship`]
//! data types. It has no parsing, validation, or compilation logic of its
//! own — those live in `planguard-parser`, `planguard-semantic`,
//! `planguard-policy`, and `planguard-compiler` respectively.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod schema;

pub use dialect::{Capability, DialectProfile, DialectProfileBuilder, ProfileConfigError};
pub use expr::{
    CmpOp, ColumnRef, ColumnRefParseError, InRhs, LikeOp, Literal, Operand, Predicate, WhenClause,
};
pub use query::{
    CteDef, FromClause, JoinClause, JoinType, LimitValue, OrderByItem, QueryPlan, SelectClause,
    SelectItem, SetOpClause, SetOpKind, SortDirection, WindowFrame, WindowFrameBound,
    WindowFrameUnits, WindowSpec,
};
pub use schema::{Column, Relationship, RelationshipEndpoint, Table};
