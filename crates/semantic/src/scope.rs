// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Validation scope
//!
//! [`ValidationContext`] carries the immutable inputs (schema, dialect,
//! builtin functions) and a mutable stack of [`ScopeFrame`]s tracking which
//! tables/aliases/CTEs are visible at the current point in the tree. A
//! subquery pushes a new frame before it is validated and pops it on
//! return; because resolution walks the stack from innermost to outermost,
//! a pushed frame still sees everything the parent scope bound — this is
//! what lets a correlated column inside `EXISTS` resolve against the outer
//! query.

use std::collections::HashMap;

use planguard_catalog::SchemaSnapshot;
use planguard_function_registry::FunctionRegistry;
use planguard_ir::DialectProfile;

/// What a name in scope actually refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeBinding {
    /// A real schema table, referenced under this alias (or its own name).
    /// Column references against this binding are checked against the
    /// snapshot.
    Table(String),
    /// A CTE, derived table, or subquery result. Its projected columns
    /// aren't re-derived here — the inner plan was already validated in
    /// its own scope — so column references against it are accepted
    /// without further checking.
    Opaque,
}

#[derive(Debug, Default)]
pub struct ScopeFrame {
    bindings: HashMap<String, ScopeBinding>,
}

impl ScopeFrame {
    fn bind(&mut self, name: String, binding: ScopeBinding) {
        self.bindings.insert(name, binding);
    }
}

pub struct ValidationContext<'a> {
    pub snapshot: &'a SchemaSnapshot,
    pub dialect: &'a DialectProfile,
    pub functions: &'a FunctionRegistry,
    frames: Vec<ScopeFrame>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        snapshot: &'a SchemaSnapshot,
        dialect: &'a DialectProfile,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Self {
            snapshot,
            dialect,
            functions,
            frames: vec![ScopeFrame::default()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: ScopeBinding) {
        self.frames
            .last_mut()
            .expect("at least one scope frame is always present")
            .bind(name.into(), binding);
    }

    pub fn resolve(&self, name: &str) -> Option<&ScopeBinding> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planguard_ir::{Column, Table};

    fn context() -> (SchemaSnapshot, DialectProfile, FunctionRegistry) {
        let snapshot = SchemaSnapshot::builder()
            .table(Table::new("employees").with_columns(vec![Column::new("id", "INTEGER")]))
            .unwrap()
            .build()
            .unwrap();
        let dialect = DialectProfile::builder("postgres").build().unwrap();
        (snapshot, dialect, FunctionRegistry::new())
    }

    #[test]
    fn nested_frame_still_resolves_outer_binding() {
        let (snapshot, dialect, functions) = context();
        let mut ctx = ValidationContext::new(&snapshot, &dialect, &functions);
        ctx.bind("employees", ScopeBinding::Table("employees".to_string()));
        ctx.push_frame();
        assert!(ctx.resolve("employees").is_some());
        ctx.pop_frame();
        assert!(ctx.resolve("employees").is_some());
    }

    #[test]
    fn popped_frame_bindings_are_gone() {
        let (snapshot, dialect, functions) = context();
        let mut ctx = ValidationContext::new(&snapshot, &dialect, &functions);
        ctx.push_frame();
        ctx.bind("cte", ScopeBinding::Opaque);
        ctx.pop_frame();
        assert!(ctx.resolve("cte").is_none());
    }
}
