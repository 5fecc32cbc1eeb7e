// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Tracks which real table a `JOIN{rel}` introduces, by the same "which
//! endpoint is already in scope" rule `planguard-semantic` uses to validate
//! it. The compiler re-derives this rather than threading it through from
//! validation, since a plan and its schema are the only inputs it's given.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Table(String),
    Opaque,
}

#[derive(Debug, Default)]
pub struct IdentifierScope {
    frames: Vec<HashMap<String, Binding>>,
}

impl IdentifierScope {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.frames.last_mut().expect("at least one frame").insert(name.into(), binding);
    }

    pub fn resolve(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|f| f.get(name))
    }

    pub fn table_in_scope(&self, table: &str) -> bool {
        matches!(self.resolve(table), Some(Binding::Table(t)) if t == table)
    }
}
