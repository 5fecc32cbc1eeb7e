// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! [`CompilerFactory`] maps a dialect target name to its [`SQLCompiler`].
//! Built-ins are registered at construction; a deployment can overlay its
//! own via [`CompilerFactory::register`]. Treat the factory as read-only
//! after startup — it is shared across every concurrent compile call.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dialects::{mysql::MysqlCompiler, postgres::PostgresCompiler, sqlite::SqliteCompiler};
use crate::sql_compiler::SQLCompiler;

#[derive(Clone)]
pub struct CompilerFactory {
    compilers: HashMap<String, Arc<dyn SQLCompiler>>,
}

impl CompilerFactory {
    /// A factory pre-loaded with the `postgres`, `sqlite`, and `mysql`
    /// compilers.
    pub fn with_builtins() -> Self {
        let mut factory = Self {
            compilers: HashMap::new(),
        };
        factory.register("postgres", Arc::new(PostgresCompiler));
        factory.register("sqlite", Arc::new(SqliteCompiler));
        factory.register("mysql", Arc::new(MysqlCompiler));
        factory
    }

    pub fn register(&mut self, target: impl Into<String>, compiler: Arc<dyn SQLCompiler>) {
        self.compilers.insert(target.into(), compiler);
    }

    pub fn get(&self, target: &str) -> Option<Arc<dyn SQLCompiler>> {
        self.compilers.get(target).cloned()
    }
}

impl Default for CompilerFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}
