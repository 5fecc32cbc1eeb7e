// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shared fixtures and assertions for PlanGuard's crate test suites.

pub mod assertions;
pub mod fixtures;

pub use fixtures::{employees_departments_schema, function_registry, permissive_dialect};
