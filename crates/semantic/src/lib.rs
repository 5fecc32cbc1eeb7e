// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # PlanGuard — plan validation
//!
//! Checks a parsed [`planguard_ir::QueryPlan`] against a [`planguard_catalog::SchemaSnapshot`]
//! and a [`planguard_ir::DialectProfile`] before it ever reaches the compiler: every
//! table and column reference must resolve, every clause must be backed by
//! an enabled dialect capability, and the scalar expression tree (operands
//! and predicates, including correlated subqueries) must be internally
//! consistent.
//!
//! ```
//! use planguard_catalog::SchemaSnapshot;
//! use planguard_function_registry::FunctionRegistry;
//! use planguard_ir::{Column, DialectProfile, Table};
//! use planguard_semantic::ValidationContext;
//!
//! let snapshot = SchemaSnapshot::builder()
//!     .table(Table::new("employees").with_columns(vec![Column::new("id", "INTEGER")]))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let dialect = DialectProfile::builder("postgres").build().unwrap();
//! let functions = FunctionRegistry::new();
//! let _ctx = ValidationContext::new(&snapshot, &dialect, &functions);
//! ```

pub mod error;
pub mod scope;
pub mod validator;

pub use error::{ValidationError, ValidationResult};
pub use scope::{ScopeBinding, ValidationContext};
pub use validator::{validate_operand, validate_plan, validate_predicate};
