// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::{HashMap, HashSet};

/// Per-table policy: columns the caller may never select or filter on, and
/// columns that must carry a bound tenant/ABAC predicate whenever the table
/// is in scope.
#[derive(Debug, Clone, Default)]
pub struct TablePolicy {
    pub param_bound_columns: HashMap<String, String>,
    pub denied_columns: HashSet<String>,
}

impl TablePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_param(mut self, column: impl Into<String>, param: impl Into<String>) -> Self {
        self.param_bound_columns.insert(column.into(), param.into());
        self
    }

    pub fn deny_column(mut self, column: impl Into<String>) -> Self {
        self.denied_columns.insert(column.into());
        self
    }
}

/// Tenant/ABAC enforcement configuration for a single deployment. Built
/// once, shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    pub inject_missing_params: bool,
    pub default_limit: Option<i64>,
    pub tables: HashMap<String, TablePolicy>,
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, name: impl Into<String>, policy: TablePolicy) -> Self {
        self.tables.insert(name.into(), policy);
        self
    }

    pub fn inject_missing_params(mut self, value: bool) -> Self {
        self.inject_missing_params = value;
        self
    }

    pub fn default_limit(mut self, value: i64) -> Self {
        self.default_limit = Some(value);
        self
    }
}
