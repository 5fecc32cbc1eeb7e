// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Small `serde_json::Value` shape-checking helpers shared by the operand,
//! predicate, and plan parsers.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::path::Path;

pub const MAX_DEPTH: usize = 64;
pub const MAX_INPUT_BYTES: usize = 1_000_000;

pub fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

pub fn wrong_type(path: &Path, expected: &'static str, got: &Value) -> ParseError {
    ParseError::WrongType {
        path: path.to_jq(),
        expected,
        got: type_name(got),
    }
}

pub fn missing_field(path: &Path, field: &str) -> ParseError {
    ParseError::MissingField {
        path: path.to_jq(),
        field: field.to_string(),
    }
}

pub fn check_depth(depth: usize, path: &Path) -> Result<(), ParseError> {
    if depth > MAX_DEPTH {
        Err(ParseError::RecursionLimitExceeded {
            path: path.to_jq(),
            depth,
            max: MAX_DEPTH,
        })
    } else {
        Ok(())
    }
}

pub fn expect_object<'a>(value: &'a Value, path: &Path) -> Result<&'a Map<String, Value>, ParseError> {
    value.as_object().ok_or_else(|| wrong_type(path, "object", value))
}

pub fn expect_array<'a>(value: &'a Value, path: &Path) -> Result<&'a Vec<Value>, ParseError> {
    value.as_array().ok_or_else(|| wrong_type(path, "array", value))
}

pub fn expect_str<'a>(value: &'a Value, path: &Path) -> Result<&'a str, ParseError> {
    value.as_str().ok_or_else(|| wrong_type(path, "string", value))
}

pub fn get_field<'a>(obj: &'a Map<String, Value>, path: &Path, field: &str) -> Result<&'a Value, ParseError> {
    obj.get(field).ok_or_else(|| missing_field(path, field))
}

/// Split a single-entry tagged object `{tag: payload}` into its tag and
/// payload, failing if the object doesn't have exactly one key.
pub fn single_key<'a>(obj: &'a Map<String, Value>, path: &Path) -> Result<(&'a str, &'a Value), ParseError> {
    if obj.len() != 1 {
        return Err(ParseError::NotSingleKeyObject {
            path: path.to_jq(),
            keys: obj.len(),
        });
    }
    let (k, v) = obj.iter().next().expect("checked len == 1 above");
    Ok((k.as_str(), v))
}

/// Rejects any key in `obj` that isn't in `allowed`. The JSON grammar has no
/// room for extra fields — an unrecognized key is almost always a caller
/// passing a field under the wrong name, which is far more useful to report
/// than to silently ignore.
pub fn check_known_keys(obj: &Map<String, Value>, path: &Path, allowed: &'static [&'static str]) -> Result<(), ParseError> {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ParseError::UnknownTag {
                path: path.child(key).to_jq(),
                tag: key.clone(),
                expected: allowed,
            });
        }
    }
    Ok(())
}

pub fn expect_array_of_len<'a>(
    value: &'a Value,
    path: &Path,
    op: &str,
    len: usize,
) -> Result<&'a Vec<Value>, ParseError> {
    let arr = expect_array(value, path)?;
    if arr.len() != len {
        return Err(ParseError::WrongArity {
            path: path.to_jq(),
            op: op.to_string(),
            expected: len.to_string(),
            found: arr.len(),
        });
    }
    Ok(arr)
}
