// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # PlanGuard — schema snapshot
//!
//! This crate builds an immutable, indexed [`SchemaSnapshot`] out of the
//! plain [`planguard_ir::Table`] / [`planguard_ir::Column`] /
//! [`planguard_ir::Relationship`] data types. It has no connection to a live
//! database; the snapshot is assembled once from caller-supplied schema
//! data and shared read-only across every validation.

pub mod error;
pub mod snapshot;

pub use error::{SchemaError, SchemaResult};
pub use snapshot::{SchemaSnapshot, SchemaSnapshotBuilder};
