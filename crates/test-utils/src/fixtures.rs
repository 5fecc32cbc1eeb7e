// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Sample schema and dialect fixtures shared across crate test suites.
//!
//! Every fixture here builds the same `employees`/`departments` schema so a
//! scenario written against `planguard-semantic` reads the same way as one
//! written against `planguard-compiler` or `planguard-core`.

use planguard_catalog::SchemaSnapshot;
use planguard_function_registry::FunctionRegistry;
use planguard_ir::{Column, DialectProfile, Relationship, RelationshipEndpoint, Table};

/// `employees(id, name, email, department_id, salary)` joined to
/// `departments(id, name, budget)` via `employees_departments`.
pub fn employees_departments_schema() -> SchemaSnapshot {
    SchemaSnapshot::builder()
        .table(
            Table::new("employees").with_columns(vec![
                Column::new("id", "INTEGER"),
                Column::new("name", "TEXT"),
                Column::new("email", "TEXT"),
                Column::new("department_id", "INTEGER").nullable(true),
                Column::new("salary", "NUMERIC"),
            ]),
        )
        .unwrap()
        .table(
            Table::new("departments").with_columns(vec![
                Column::new("id", "INTEGER"),
                Column::new("name", "TEXT"),
                Column::new("budget", "NUMERIC"),
            ]),
        )
        .unwrap()
        .relationship(Relationship::new(
            "employees_departments",
            RelationshipEndpoint::new("employees", "department_id"),
            RelationshipEndpoint::new("departments", "id"),
        ))
        .unwrap()
        .build()
        .unwrap()
}

/// A permissive dialect profile with every capability enabled, for tests
/// that aren't exercising capability gating itself.
pub fn permissive_dialect(target: &str) -> DialectProfile {
    DialectProfile::builder(target)
        .subqueries()
        .ctes()
        .aggregations()
        .window_functions()
        .joins()
        .set_operations()
        .offset_without_limit()
        .allow_functions(["UPPER", "LOWER", "COALESCE", "CONCAT"])
        .build()
        .unwrap()
}

pub fn function_registry() -> FunctionRegistry {
    FunctionRegistry::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_resolves_the_join_relationship() {
        let snapshot = employees_departments_schema();
        assert!(snapshot.relationship("employees_departments").is_some());
        assert!(snapshot.column("employees", "department_id").is_some());
        assert!(snapshot.column("departments", "budget").is_some());
    }

    #[test]
    fn permissive_dialect_enables_every_capability() {
        let dialect = permissive_dialect("postgres");
        assert!(dialect.supports(planguard_ir::Capability::WindowFunctions));
        assert!(dialect.is_function_allowed("upper"));
    }
}
