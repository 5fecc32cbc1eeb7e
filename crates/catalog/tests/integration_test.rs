// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for schema snapshot construction

use planguard_catalog::{SchemaError, SchemaSnapshot};
use planguard_ir::{Column, Relationship, RelationshipEndpoint, Table};

fn sample_snapshot() -> SchemaSnapshot {
    SchemaSnapshot::builder()
        .table(
            Table::new("employees")
                .with_columns(vec![
                    Column::new("id", "INTEGER"),
                    Column::new("name", "TEXT"),
                    Column::new("department_id", "INTEGER").nullable(true),
                    Column::new("tenant_id", "INTEGER"),
                ])
                .described("Employee roster"),
        )
        .unwrap()
        .table(Table::new("departments").with_columns(vec![
            Column::new("id", "INTEGER"),
            Column::new("name", "TEXT"),
        ]))
        .unwrap()
        .relationship(Relationship::new(
            "employees__departments",
            RelationshipEndpoint::new("employees", "department_id"),
            RelationshipEndpoint::new("departments", "id"),
        ))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn snapshot_resolves_known_tables_and_columns() {
    let snapshot = sample_snapshot();
    assert!(snapshot.has_table("employees"));
    assert!(!snapshot.has_table("secrets"));
    assert_eq!(
        snapshot.column("employees", "tenant_id").unwrap().sql_type,
        "INTEGER"
    );
    assert!(snapshot.column("employees", "ghost").is_none());
}

#[test]
fn snapshot_resolves_relationships_from_either_table() {
    let snapshot = sample_snapshot();
    let rel = snapshot.relationship("employees__departments").unwrap();
    assert_eq!(rel.source.table, "employees");
    assert!(snapshot
        .relationships_for("departments")
        .any(|r| r.key == rel.key));
}

#[test]
fn builder_populates_table_relationship_sets() {
    let snapshot = sample_snapshot();
    let employees = snapshot.table("employees").unwrap();
    assert!(employees.relationships.contains("employees__departments"));
}

#[test]
fn duplicate_relationship_key_rejected() {
    let err = SchemaSnapshot::builder()
        .table(Table::new("employees").with_columns(vec![Column::new("id", "INTEGER")]))
        .unwrap()
        .table(Table::new("departments").with_columns(vec![Column::new("id", "INTEGER")]))
        .unwrap()
        .relationship(Relationship::new(
            "employees__departments",
            RelationshipEndpoint::new("employees", "id"),
            RelationshipEndpoint::new("departments", "id"),
        ))
        .unwrap()
        .relationship(Relationship::new(
            "employees__departments",
            RelationshipEndpoint::new("employees", "id"),
            RelationshipEndpoint::new("departments", "id"),
        ))
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateRelationship(_)));
}
