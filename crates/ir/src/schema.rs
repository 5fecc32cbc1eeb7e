// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema data types
//!
//! Plain data types describing a database schema: [`Table`], [`Column`], and
//! [`Relationship`]. These are the unit of construction for
//! `planguard-catalog`'s `SchemaSnapshot`, which adds the O(1) lookup
//! indexes over them. Kept here, rather than in `catalog`, because
//! `DialectProfile` and the compiler's identifier quoting both need to name
//! columns and tables without depending on the indexed snapshot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A declared database column. `sql_type` is an opaque string (e.g.
/// `"INTEGER"`, `"TEXT"`) — the core never interprets it beyond passing it
/// through to error messages and schema prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: false,
            description: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A declared database table: a unique name, its ordered columns, and the
/// set of relationship keys it participates in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub relationships: HashSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            relationships: HashSet::new(),
            description: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// One endpoint of a [`Relationship`]: a table+column pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEndpoint {
    pub table: String,
    pub column: String,
}

impl RelationshipEndpoint {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A named, directional join path between two declared columns. The key is
/// conventionally `"<source table>__<target table>"` but is an opaque label
/// to the data model — the compiler's join builder may traverse it in
/// either direction when resolving `JOIN { rel: key }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub key: String,
    pub source: RelationshipEndpoint,
    pub target: RelationshipEndpoint,
}

impl Relationship {
    pub fn new(
        key: impl Into<String>,
        source: RelationshipEndpoint,
        target: RelationshipEndpoint,
    ) -> Self {
        Self {
            key: key.into(),
            source,
            target,
        }
    }

    /// The endpoint on the other side of `from_table`, if this relationship
    /// touches it at all.
    pub fn other_end(&self, from_table: &str) -> Option<&RelationshipEndpoint> {
        if self.source.table == from_table {
            Some(&self.target)
        } else if self.target.table == from_table {
            Some(&self.source)
        } else {
            None
        }
    }
}
