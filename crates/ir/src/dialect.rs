// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Profiles
//!
//! A [`DialectProfile`] is an immutable, build-once description of what a
//! target SQL engine supports: a set of [`Capability`] flags, a maximum join
//! depth, a table whitelist, and a scalar-function allowlist. It is built
//! through [`DialectProfileBuilder`], whose `build()` enforces the
//! capability dependency graph (`ctes` needs `subqueries`, `window_functions`
//! needs `aggregations`) and fails closed with [`ProfileConfigError`]
//! otherwise.
//!
//! Profiles are constructed once at startup and shared read-only across
//! requests — there is no mutation after `build()`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A feature a [`DialectProfile`] may or may not enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Subqueries: derived tables in FROM, IN/EXISTS subqueries.
    Subqueries,
    /// WITH clauses (common table expressions).
    Ctes,
    /// GROUP BY / HAVING / aggregate function calls.
    Aggregations,
    /// OVER (...) window functions.
    WindowFunctions,
    /// JOIN clauses.
    Joins,
    /// UNION / UNION ALL / INTERSECT / EXCEPT.
    SetOperations,
    /// OFFSET without a preceding LIMIT.
    OffsetWithoutLimit,
}

impl Capability {
    /// The capability this one cannot be enabled without, if any.
    fn requires(self) -> Option<Capability> {
        match self {
            Capability::Ctes => Some(Capability::Subqueries),
            Capability::WindowFunctions => Some(Capability::Aggregations),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Capability::Subqueries => "subqueries",
            Capability::Ctes => "ctes",
            Capability::Aggregations => "aggregations",
            Capability::WindowFunctions => "window_functions",
            Capability::Joins => "joins",
            Capability::SetOperations => "set_operations",
            Capability::OffsetWithoutLimit => "offset_without_limit",
        }
    }
}

/// Raised by [`DialectProfileBuilder::build`] when an enabled capability's
/// dependency was never enabled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileConfigError {
    #[error("capability '{capability}' requires '{requires}' to also be enabled")]
    MissingDependency {
        capability: &'static str,
        requires: &'static str,
    },
}

/// Default maximum JOIN chain length when the builder doesn't override it.
pub const DEFAULT_MAX_JOIN_DEPTH: usize = 2;

/// Immutable, build-once feature-flag set for a SQL target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectProfile {
    target: String,
    capabilities: HashSet<Capability>,
    allowed_functions: HashSet<String>,
    max_join_depth: usize,
    table_whitelist: Option<HashSet<String>>,
}

impl DialectProfile {
    /// Start building a profile for the named target (`"postgres"`,
    /// `"sqlite"`, `"mysql"`, ...).
    pub fn builder(target: impl Into<String>) -> DialectProfileBuilder {
        DialectProfileBuilder::new(target)
    }

    /// Target identifier, e.g. `"postgres"`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether `cap` is enabled on this profile.
    pub fn supports(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    /// Maximum number of JOINs a single FROM clause may chain.
    pub fn max_join_depth(&self) -> usize {
        self.max_join_depth
    }

    /// Whether `table` may be referenced at all, independent of whether it
    /// exists in the schema. `None` whitelist means "no restriction beyond
    /// the schema".
    pub fn table_allowed(&self, table: &str) -> bool {
        match &self.table_whitelist {
            None => true,
            Some(set) => set.contains(table),
        }
    }

    /// Whether `name` is in the dialect's explicit scalar function
    /// allowlist (case-insensitive). Built-in aggregate/window functions
    /// are recognised separately by the function registry.
    pub fn is_function_allowed(&self, name: &str) -> bool {
        self.allowed_functions.contains(&name.to_ascii_uppercase())
    }
}

/// Fluent builder for [`DialectProfile`].
#[derive(Debug, Clone)]
pub struct DialectProfileBuilder {
    target: String,
    capabilities: HashSet<Capability>,
    allowed_functions: HashSet<String>,
    max_join_depth: usize,
    table_whitelist: Option<HashSet<String>>,
}

impl DialectProfileBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            capabilities: HashSet::new(),
            allowed_functions: HashSet::new(),
            max_join_depth: DEFAULT_MAX_JOIN_DEPTH,
            table_whitelist: None,
        }
    }

    fn with_capability(mut self, cap: Capability) -> Self {
        self.capabilities.insert(cap);
        self
    }

    pub fn subqueries(self) -> Self {
        self.with_capability(Capability::Subqueries)
    }

    pub fn ctes(self) -> Self {
        self.with_capability(Capability::Ctes)
    }

    pub fn aggregations(self) -> Self {
        self.with_capability(Capability::Aggregations)
    }

    pub fn window_functions(self) -> Self {
        self.with_capability(Capability::WindowFunctions)
    }

    pub fn joins(self) -> Self {
        self.with_capability(Capability::Joins)
    }

    pub fn set_operations(self) -> Self {
        self.with_capability(Capability::SetOperations)
    }

    pub fn offset_without_limit(self) -> Self {
        self.with_capability(Capability::OffsetWithoutLimit)
    }

    pub fn max_join_depth(mut self, depth: usize) -> Self {
        self.max_join_depth = depth;
        self
    }

    pub fn allow_function(mut self, name: impl AsRef<str>) -> Self {
        self.allowed_functions
            .insert(name.as_ref().to_ascii_uppercase());
        self
    }

    pub fn allow_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self = self.allow_function(name);
        }
        self
    }

    pub fn whitelist_table(mut self, name: impl Into<String>) -> Self {
        self.table_whitelist
            .get_or_insert_with(HashSet::new)
            .insert(name.into());
        self
    }

    /// Validate capability dependencies and produce an immutable profile.
    pub fn build(self) -> Result<DialectProfile, ProfileConfigError> {
        for cap in &self.capabilities {
            if let Some(dep) = cap.requires() {
                if !self.capabilities.contains(&dep) {
                    return Err(ProfileConfigError::MissingDependency {
                        capability: cap.label(),
                        requires: dep.label(),
                    });
                }
            }
        }
        Ok(DialectProfile {
            target: self.target,
            capabilities: self.capabilities,
            allowed_functions: self.allowed_functions,
            max_join_depth: self.max_join_depth,
            table_whitelist: self.table_whitelist,
        })
    }
}
