// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Rendering hooks for `Predicate::Extension` operators — anything the
//! built-in comparison/pattern/set/range/boolean handlers in
//! [`crate::emit`] don't already cover. Operand arguments are rendered
//! first (parameters bound, identifiers quoted) and handed to the
//! registered closure as already-compiled SQL fragments.

use std::collections::HashMap;
use std::sync::Arc;

type Handler = Arc<dyn Fn(&str, &[String]) -> String + Send + Sync>;

#[derive(Clone, Default)]
pub struct OperatorRegistry {
    handlers: HashMap<String, Handler>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, op: impl Into<String>, handler: F)
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        self.handlers.insert(op.into(), Arc::new(handler));
    }

    pub fn render(&self, op: &str, args: &[String]) -> Option<String> {
        self.handlers.get(op).map(|f| f(op, args))
    }

    pub fn has(&self, op: &str) -> bool {
        self.handlers.contains_key(op)
    }
}
