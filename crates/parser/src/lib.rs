// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Turns an LLM-emitted JSON query plan into a [`planguard_ir::QueryPlan`].
//!
//! This is purely structural — it checks shapes, tags, and arities, and
//! tracks a jq-style path to every value it touches so a caller can feed a
//! failure straight back to whatever produced the plan. It never consults a
//! schema, a dialect, or the function registry; that's `planguard-semantic`'s
//! job, run after a plan parses successfully.

pub mod error;
pub mod operand;
pub mod path;
pub mod plan;
pub mod predicate;
pub mod support;

pub use error::{ParseError, ParseResult};
pub use path::Path;

use planguard_ir::QueryPlan;
use support::MAX_INPUT_BYTES;

/// Parses an already-decoded JSON value into a [`QueryPlan`].
pub fn parse_plan(value: &serde_json::Value) -> ParseResult<QueryPlan> {
    plan::parse_query_plan(value, &Path::root(), 0)
}

/// Parses raw bytes into a [`QueryPlan`], enforcing the input size bound
/// before handing the payload to `serde_json`.
pub fn parse_plan_bytes(bytes: &[u8]) -> ParseResult<QueryPlan> {
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(ParseError::InputTooLarge {
            bytes: bytes.len(),
            max: MAX_INPUT_BYTES,
        });
    }
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| ParseError::InvalidJson {
        message: e.to_string(),
    })?;
    parse_plan(&value)
}
