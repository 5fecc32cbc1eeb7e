// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parse-time errors. Every variant carries a jq-style `path` into the
//! offending JSON value so a caller can hand the failure back to whatever
//! produced the plan (typically an LLM) as a structured repair hint.

use serde_json::{json, Value};
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: String },

    #[error("{path}: expected {expected}, found {got}")]
    WrongType {
        path: String,
        expected: &'static str,
        got: String,
    },

    #[error("{path}: unrecognized tag '{tag}', expected one of {expected:?}")]
    UnknownTag {
        path: String,
        tag: String,
        expected: &'static [&'static str],
    },

    #[error("{path}: operator '{op}' expects {expected}, found {found}")]
    WrongArity {
        path: String,
        op: String,
        expected: String,
        found: usize,
    },

    #[error("{path}: '{value}' is not a valid IDENT.IDENT column reference")]
    InvalidColumnRef { path: String, value: String },

    #[error("{path}: expected a single-key tagged object, found {keys} keys")]
    NotSingleKeyObject { path: String, keys: usize },

    #[error("input is {bytes} bytes, exceeding the {max} byte limit")]
    InputTooLarge { bytes: usize, max: usize },

    #[error("{path}: nesting depth {depth} exceeds the limit of {max}")]
    RecursionLimitExceeded {
        path: String,
        depth: usize,
        max: usize,
    },

    #[error("input is not valid JSON: {message}")]
    InvalidJson { message: String },
}

impl ParseError {
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::MissingField { .. } => "parse.missing_field",
            ParseError::WrongType { .. } => "parse.wrong_type",
            ParseError::UnknownTag { .. } => "parse.unknown_tag",
            ParseError::WrongArity { .. } => "parse.wrong_arity",
            ParseError::InvalidColumnRef { .. } => "parse.invalid_column_ref",
            ParseError::NotSingleKeyObject { .. } => "parse.not_single_key_object",
            ParseError::InputTooLarge { .. } => "parse.input_too_large",
            ParseError::RecursionLimitExceeded { .. } => "parse.recursion_limit_exceeded",
            ParseError::InvalidJson { .. } => "parse.invalid_json",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            ParseError::MissingField { path, field } => {
                json!({ "path": path, "expected": field })
            }
            ParseError::WrongType { path, expected, got } => {
                json!({ "path": path, "expected": expected, "got": got })
            }
            ParseError::UnknownTag { path, tag, expected } => {
                json!({ "path": path, "got": tag, "expected": expected })
            }
            ParseError::WrongArity {
                path,
                op,
                expected,
                found,
            } => json!({ "path": path, "op": op, "expected": expected, "got": found }),
            ParseError::InvalidColumnRef { path, value } => {
                json!({ "path": path, "got": value, "expected": "IDENT.IDENT" })
            }
            ParseError::NotSingleKeyObject { path, keys } => {
                json!({ "path": path, "got": keys, "expected": 1 })
            }
            ParseError::InputTooLarge { bytes, max } => json!({ "got": bytes, "expected": max }),
            ParseError::RecursionLimitExceeded { path, depth, max } => {
                json!({ "path": path, "got": depth, "expected": max })
            }
            ParseError::InvalidJson { message } => json!({ "message": message }),
        }
    }
}
