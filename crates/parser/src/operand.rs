// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parses the `Operand` tagged union: `col` / `value` / `param` / `func` /
//! `case`. This is a closed tag set — unlike `Predicate`, `Operand` has no
//! extension mechanism, so an unrecognized tag is always a [`ParseError`].

use serde_json::Value;

use planguard_ir::{ColumnRef, Literal, Operand, WhenClause};

use crate::error::ParseError;
use crate::path::Path;
use crate::predicate::parse_predicate;
use crate::support::{
    check_depth, check_known_keys, expect_array, expect_object, expect_str, get_field, single_key, wrong_type,
};

const OPERAND_TAGS: &[&str] = &["col", "value", "param", "func", "case"];
const FUNC_KEYS: &[&str] = &["func", "args"];
const CASE_KEYS: &[&str] = &["when", "else"];
const WHEN_KEYS: &[&str] = &["cond", "then"];

pub fn parse_operand(value: &Value, path: &Path, depth: usize) -> Result<Operand, ParseError> {
    check_depth(depth, path)?;
    let obj = expect_object(value, path)?;
    let (tag, payload) = single_key(obj, path)?;

    match tag {
        "col" => {
            let s = expect_str(payload, &path.child("col"))?;
            ColumnRef::parse(s)
                .map(Operand::Col)
                .map_err(|_| ParseError::InvalidColumnRef {
                    path: path.child("col").to_jq(),
                    value: s.to_string(),
                })
        }
        "value" => parse_literal(payload, &path.child("value")).map(Operand::Value),
        "param" => {
            let s = expect_str(payload, &path.child("param"))?;
            Ok(Operand::Param(s.to_string()))
        }
        "func" => {
            let fpath = path.child("func");
            let fobj = expect_object(payload, &fpath)?;
            check_known_keys(fobj, &fpath, FUNC_KEYS)?;
            let name = expect_str(get_field(fobj, &fpath, "func")?, &fpath.child("func"))?;
            let args_val = get_field(fobj, &fpath, "args")?;
            let args_arr = expect_array(args_val, &fpath.child("args"))?;
            let args = args_arr
                .iter()
                .enumerate()
                .map(|(i, a)| parse_operand(a, &fpath.child("args").index(i), depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Operand::Func {
                name: name.to_string(),
                args,
            })
        }
        "case" => parse_case(payload, &path.child("case"), depth),
        other => Err(ParseError::UnknownTag {
            path: path.to_jq(),
            tag: other.to_string(),
            expected: OPERAND_TAGS,
        }),
    }
}

fn parse_case(payload: &Value, path: &Path, depth: usize) -> Result<Operand, ParseError> {
    let obj = expect_object(payload, path)?;
    check_known_keys(obj, path, CASE_KEYS)?;
    let when_arr = expect_array(get_field(obj, path, "when")?, &path.child("when"))?;
    let when = when_arr
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let wpath = path.child("when").index(i);
            let wobj = expect_object(w, &wpath)?;
            check_known_keys(wobj, &wpath, WHEN_KEYS)?;
            let cond = parse_predicate(get_field(wobj, &wpath, "cond")?, &wpath.child("cond"), depth + 1)?;
            let then = parse_operand(get_field(wobj, &wpath, "then")?, &wpath.child("then"), depth + 1)?;
            Ok(WhenClause { cond, then })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    let r#else = match obj.get("else") {
        Some(v) => Some(Box::new(parse_operand(v, &path.child("else"), depth + 1)?)),
        None => None,
    };

    Ok(Operand::Case { when, r#else })
}

fn parse_literal(value: &Value, path: &Path) -> Result<Literal, ParseError> {
    match value {
        Value::Null => Ok(Literal::Null),
        Value::Bool(b) => Ok(Literal::Boolean(*b)),
        Value::String(s) => Ok(Literal::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Literal::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Literal::Float(f))
            } else {
                Err(wrong_type(path, "integer or float", value))
            }
        }
        Value::Array(_) | Value::Object(_) => Err(wrong_type(path, "scalar literal", value)),
    }
}
