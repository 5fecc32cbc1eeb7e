// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parses the `Predicate` tagged union. Unlike `Operand`, the tag set is
//! open: an operator name this parser doesn't recognize becomes
//! [`planguard_ir::Predicate::Extension`] rather than a [`ParseError`] — the
//! `OperatorRegistry` that knows whether it's actually registered lives in
//! the compiler, and the parser never consults it.

use serde_json::Value;

use planguard_ir::{CmpOp, InRhs, LikeOp, Predicate};

use crate::error::ParseError;
use crate::operand::parse_operand;
use crate::path::Path;
use crate::plan::parse_query_plan;
use crate::support::{
    check_depth, check_known_keys, expect_array, expect_array_of_len, expect_object, get_field, single_key,
    wrong_type,
};

const IN_KEYS: &[&str] = &["left", "list", "subquery"];

pub fn parse_predicate(value: &Value, path: &Path, depth: usize) -> Result<Predicate, ParseError> {
    check_depth(depth, path)?;
    let obj = expect_object(value, path)?;
    let (tag, payload) = single_key(obj, path)?;
    let tag_path = path.child(tag);

    match tag {
        "EQ" | "NEQ" | "LT" | "LTE" | "GT" | "GTE" => {
            let op = match tag {
                "EQ" => CmpOp::Eq,
                "NEQ" => CmpOp::Neq,
                "LT" => CmpOp::Lt,
                "LTE" => CmpOp::Lte,
                "GT" => CmpOp::Gt,
                _ => CmpOp::Gte,
            };
            let arr = expect_array_of_len(payload, &tag_path, tag, 2)?;
            let left = parse_operand(&arr[0], &tag_path.index(0), depth + 1)?;
            let right = parse_operand(&arr[1], &tag_path.index(1), depth + 1)?;
            Ok(Predicate::Cmp { op, left, right })
        }
        "IS_NULL" => Ok(Predicate::IsNull(parse_operand(payload, &tag_path, depth + 1)?)),
        "IS_NOT_NULL" => Ok(Predicate::IsNotNull(parse_operand(payload, &tag_path, depth + 1)?)),
        "LIKE" | "ILIKE" => {
            let op = if tag == "LIKE" { LikeOp::Like } else { LikeOp::ILike };
            let arr = expect_array_of_len(payload, &tag_path, tag, 2)?;
            let left = parse_operand(&arr[0], &tag_path.index(0), depth + 1)?;
            let right = parse_operand(&arr[1], &tag_path.index(1), depth + 1)?;
            Ok(Predicate::Like { op, left, right })
        }
        "IN" | "NOT_IN" => parse_in(payload, &tag_path, tag == "NOT_IN", depth),
        "BETWEEN" => {
            let arr = expect_array_of_len(payload, &tag_path, tag, 3)?;
            let expr = parse_operand(&arr[0], &tag_path.index(0), depth + 1)?;
            let low = parse_operand(&arr[1], &tag_path.index(1), depth + 1)?;
            let high = parse_operand(&arr[2], &tag_path.index(2), depth + 1)?;
            Ok(Predicate::Between { expr, low, high })
        }
        "AND" | "OR" => {
            let arr = expect_array(payload, &tag_path)?;
            if arr.len() < 2 {
                return Err(ParseError::WrongArity {
                    path: tag_path.to_jq(),
                    op: tag.to_string(),
                    expected: ">= 2 predicates".to_string(),
                    found: arr.len(),
                });
            }
            let items = arr
                .iter()
                .enumerate()
                .map(|(i, p)| parse_predicate(p, &tag_path.index(i), depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if tag == "AND" {
                Predicate::And(items)
            } else {
                Predicate::Or(items)
            })
        }
        "NOT" => Ok(Predicate::Not(Box::new(parse_predicate(
            payload,
            &tag_path,
            depth + 1,
        )?))),
        "EXISTS" | "NOT_EXISTS" => {
            let negated = tag == "NOT_EXISTS";
            let subquery = Box::new(parse_query_plan(payload, &tag_path, depth + 1)?);
            Ok(Predicate::Exists { subquery, negated })
        }
        extension => {
            let arr = expect_array(payload, &tag_path).map_err(|_| {
                wrong_type(&tag_path, "array of operands", payload)
            })?;
            let args = arr
                .iter()
                .enumerate()
                .map(|(i, a)| parse_operand(a, &tag_path.index(i), depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::Extension {
                op: extension.to_string(),
                args,
            })
        }
    }
}

fn parse_in(payload: &Value, path: &Path, negated: bool, depth: usize) -> Result<Predicate, ParseError> {
    let obj = expect_object(payload, path)?;
    check_known_keys(obj, path, IN_KEYS)?;
    let left = parse_operand(get_field(obj, path, "left")?, &path.child("left"), depth + 1)?;

    let rhs = if let Some(list_val) = obj.get("list") {
        let list_path = path.child("list");
        let arr = expect_array(list_val, &list_path)?;
        if arr.is_empty() {
            return Err(ParseError::WrongArity {
                path: path.to_jq(),
                op: "IN".to_string(),
                expected: "non-empty list or subquery".to_string(),
                found: 0,
            });
        }
        let items = arr
            .iter()
            .enumerate()
            .map(|(i, v)| parse_operand(v, &list_path.index(i), depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        InRhs::List(items)
    } else if let Some(sub_val) = obj.get("subquery") {
        InRhs::Subquery(Box::new(parse_query_plan(
            sub_val,
            &path.child("subquery"),
            depth + 1,
        )?))
    } else {
        return Err(crate::support::missing_field(path, "list or subquery"));
    };

    Ok(Predicate::In { left, rhs, negated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_binary_comparison() {
        let v = json!({"EQ": [{"col": "employees.id"}, {"value": 1}]});
        let pred = parse_predicate(&v, &Path::root(), 0).unwrap();
        assert!(matches!(pred, Predicate::Cmp { op: CmpOp::Eq, .. }));
    }

    #[test]
    fn comparison_with_wrong_arity_is_rejected() {
        let v = json!({"EQ": [{"col": "employees.id"}]});
        let err = parse_predicate(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.wrong_arity");
    }

    #[test]
    fn empty_in_list_is_rejected() {
        let v = json!({"IN": {"left": {"col": "employees.id"}, "list": []}});
        let err = parse_predicate(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.wrong_arity");
    }

    #[test]
    fn unrecognized_operator_becomes_extension() {
        let v = json!({"FULLTEXT_MATCH": [{"col": "employees.name"}, {"value": "eng"}]});
        let pred = parse_predicate(&v, &Path::root(), 0).unwrap();
        match pred {
            Predicate::Extension { op, args } => {
                assert_eq!(op, "FULLTEXT_MATCH");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected Extension"),
        }
    }

    #[test]
    fn and_with_one_branch_is_rejected() {
        let v = json!({"AND": [{"IS_NULL": {"col": "employees.name"}}]});
        let err = parse_predicate(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.wrong_arity");
    }
}
