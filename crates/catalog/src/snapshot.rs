// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema snapshot
//!
//! [`SchemaSnapshot`] is an immutable, build-once view of a database:
//! tables, their columns, and the named relationships joining them. It is
//! constructed once at startup through [`SchemaSnapshotBuilder`] and shared
//! read-only across every `validate_and_compile` call — there is no mutation
//! or reflection against a live connection here, only the in-memory index
//! over data the caller already has.

use std::collections::HashMap;

use planguard_ir::{Column, Relationship, Table};

use crate::error::{SchemaError, SchemaResult};

/// Immutable, indexed schema. Column lookup by `(table, column)` and
/// relationship lookup by key are both O(1).
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    tables: HashMap<String, Table>,
    relationships: HashMap<String, Relationship>,
    column_index: HashMap<(String, String), Column>,
}

impl SchemaSnapshot {
    pub fn builder() -> SchemaSnapshotBuilder {
        SchemaSnapshotBuilder::new()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        self.column_index
            .get(&(table.to_string(), column.to_string()))
    }

    pub fn relationship(&self, key: &str) -> Option<&Relationship> {
        self.relationships.get(key)
    }

    /// Relationship keys declared on `table`, for resolving `JOIN { rel }`
    /// against the tables already in scope.
    pub fn relationships_for(&self, table: &str) -> impl Iterator<Item = &Relationship> {
        self.tables
            .get(table)
            .into_iter()
            .flat_map(|t| t.relationships.iter())
            .filter_map(move |key| self.relationships.get(key))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

/// Fluent builder enforcing the snapshot's invariants at construction time:
/// unique table names, unique relationship keys, and relationship endpoints
/// that resolve to declared columns.
#[derive(Debug, Default)]
pub struct SchemaSnapshotBuilder {
    tables: HashMap<String, Table>,
    relationships: HashMap<String, Relationship>,
}

impl SchemaSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: Table) -> SchemaResult<Self> {
        if self.tables.contains_key(&table.name) {
            return Err(SchemaError::DuplicateTable(table.name));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(self)
    }

    pub fn relationship(mut self, relationship: Relationship) -> SchemaResult<Self> {
        if self.relationships.contains_key(&relationship.key) {
            return Err(SchemaError::DuplicateRelationship(relationship.key));
        }
        self.relationships
            .insert(relationship.key.clone(), relationship);
        Ok(self)
    }

    pub fn build(mut self) -> SchemaResult<SchemaSnapshot> {
        let mut column_index = HashMap::new();
        for table in self.tables.values() {
            for column in &table.columns {
                column_index.insert((table.name.clone(), column.name.clone()), column.clone());
            }
        }

        for rel in self.relationships.values() {
            for endpoint in [&rel.source, &rel.target] {
                let table = self.tables.get(&endpoint.table).ok_or_else(|| {
                    SchemaError::RelationshipUnknownTable {
                        key: rel.key.clone(),
                        table: endpoint.table.clone(),
                    }
                })?;
                if table.column(&endpoint.column).is_none() {
                    return Err(SchemaError::RelationshipUnknownColumn {
                        key: rel.key.clone(),
                        table: endpoint.table.clone(),
                        column: endpoint.column.clone(),
                    });
                }
            }
        }

        for (table_name, table) in self.tables.iter_mut() {
            table.relationships = self
                .relationships
                .values()
                .filter(|rel| rel.source.table == *table_name || rel.target.table == *table_name)
                .map(|rel| rel.key.clone())
                .collect();
        }

        tracing::debug!(
            tables = self.tables.len(),
            relationships = self.relationships.len(),
            "indexed schema snapshot"
        );

        Ok(SchemaSnapshot {
            tables: self.tables,
            relationships: self.relationships,
            column_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planguard_ir::RelationshipEndpoint;

    fn employees_departments() -> SchemaResult<SchemaSnapshot> {
        SchemaSnapshot::builder()
            .table(Table::new("employees").with_columns(vec![
                Column::new("id", "INTEGER"),
                Column::new("department_id", "INTEGER").nullable(true),
            ]))?
            .table(Table::new("departments").with_columns(vec![Column::new("id", "INTEGER")]))?
            .relationship(Relationship::new(
                "employees__departments",
                RelationshipEndpoint::new("employees", "department_id"),
                RelationshipEndpoint::new("departments", "id"),
            ))?
            .build()
    }

    #[test]
    fn column_lookup_is_indexed() {
        let snapshot = employees_departments().unwrap();
        assert_eq!(
            snapshot.column("employees", "department_id").unwrap().name,
            "department_id"
        );
        assert!(snapshot.column("employees", "missing").is_none());
    }

    #[test]
    fn relationship_lookup_by_key() {
        let snapshot = employees_departments().unwrap();
        assert!(snapshot.relationship("employees__departments").is_some());
        assert!(snapshot
            .relationships_for("employees")
            .any(|r| r.key == "employees__departments"));
    }

    #[test]
    fn duplicate_table_rejected() {
        let err = SchemaSnapshot::builder()
            .table(Table::new("employees"))
            .unwrap()
            .table(Table::new("employees"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTable(name) if name == "employees"));
    }

    #[test]
    fn relationship_to_unknown_table_rejected() {
        let err = SchemaSnapshot::builder()
            .table(Table::new("employees").with_columns(vec![Column::new("id", "INTEGER")]))
            .unwrap()
            .relationship(Relationship::new(
                "employees__ghost",
                RelationshipEndpoint::new("employees", "id"),
                RelationshipEndpoint::new("ghost", "id"),
            ))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::RelationshipUnknownTable { .. }));
    }

    #[test]
    fn relationship_to_unknown_column_rejected() {
        let err = SchemaSnapshot::builder()
            .table(Table::new("employees").with_columns(vec![Column::new("id", "INTEGER")]))
            .unwrap()
            .table(Table::new("departments").with_columns(vec![Column::new("id", "INTEGER")]))
            .unwrap()
            .relationship(Relationship::new(
                "employees__departments",
                RelationshipEndpoint::new("employees", "department_id"),
                RelationshipEndpoint::new("departments", "id"),
            ))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RelationshipUnknownColumn { .. }
        ));
    }
}
