// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::HashMap;

use crate::{builtin, BuiltinFunction, FunctionKind};

/// Builtin function catalog, keyed by dialect target (`"postgres"`,
/// `"mysql"`, `"sqlite"`). The validator consults this to recognise
/// aggregate and window functions independently of a dialect's explicit
/// scalar-function allowlist — `SUM`/`ROW_NUMBER` don't need to be named in
/// `DialectProfile::allowed_functions` to be legal.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Vec<BuiltinFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut functions = HashMap::new();
        functions.insert("postgres".to_string(), builtin::postgres::all_functions());
        functions.insert("mysql".to_string(), builtin::mysql::all_functions());
        functions.insert("sqlite".to_string(), builtin::sqlite::all_functions());
        Self { functions }
    }

    pub fn get_functions(&self, target: &str) -> &[BuiltinFunction] {
        self.functions
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_function(&self, target: &str, name: &str) -> Option<&BuiltinFunction> {
        self.get_functions(target)
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn has_function(&self, target: &str, name: &str) -> bool {
        self.get_function(target, name).is_some()
    }

    pub fn is_aggregate(&self, target: &str, name: &str) -> bool {
        matches!(
            self.get_function(target, name).map(|f| f.kind),
            Some(FunctionKind::Aggregate)
        )
    }

    pub fn is_window(&self, target: &str, name: &str) -> bool {
        matches!(
            self.get_function(target, name).map(|f| f.kind),
            Some(FunctionKind::Window)
        )
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_loads_every_target() {
        let registry = FunctionRegistry::new();
        assert!(!registry.get_functions("postgres").is_empty());
        assert!(!registry.get_functions("mysql").is_empty());
        assert!(!registry.get_functions("sqlite").is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.has_function("postgres", "count"));
        assert!(registry.has_function("postgres", "COUNT"));
        assert!(registry.has_function("postgres", "Count"));
    }

    #[test]
    fn unknown_target_returns_empty() {
        let registry = FunctionRegistry::new();
        assert!(registry.get_functions("oracle").is_empty());
    }

    #[test]
    fn row_number_is_window_not_aggregate() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_window("postgres", "ROW_NUMBER"));
        assert!(!registry.is_aggregate("postgres", "ROW_NUMBER"));
    }
}
