// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Errors for schema snapshot construction

use serde::Serialize;
use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Raised while assembling a [`crate::SchemaSnapshot`] from declared tables
/// and relationships. Never raised once a snapshot exists — it is immutable
/// after `build()`.
#[derive(Debug, Error, Clone, Serialize)]
pub enum SchemaError {
    #[error("duplicate table '{0}'")]
    DuplicateTable(String),

    #[error("duplicate relationship key '{0}'")]
    DuplicateRelationship(String),

    #[error("relationship '{key}' references undeclared table '{table}'")]
    RelationshipUnknownTable { key: String, table: String },

    #[error("relationship '{key}' references undeclared column '{table}.{column}'")]
    RelationshipUnknownColumn {
        key: String,
        table: String,
        column: String,
    },
}
