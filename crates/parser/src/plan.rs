// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parses a [`QueryPlan`] and its clauses. Does not consult a schema or
//! dialect — purely structural: every clause is mapped to its typed form
//! regardless of whether the capability it requires is later found to be
//! disabled (that's `planguard-semantic`'s job).

use serde_json::Value;

use planguard_ir::{
    CteDef, FromClause, JoinClause, JoinType, LimitValue, OrderByItem, QueryPlan, SelectClause,
    SelectItem, SetOpClause, SetOpKind, SortDirection, WindowFrame, WindowFrameBound,
    WindowFrameUnits, WindowSpec,
};

use crate::error::ParseError;
use crate::operand::parse_operand;
use crate::path::Path;
use crate::predicate::parse_predicate;
use crate::support::{
    check_depth, check_known_keys, expect_array, expect_object, expect_str, get_field, wrong_type,
};

const PLAN_KEYS: &[&str] = &[
    "WITH", "SELECT", "FROM", "JOIN", "WHERE", "GROUP_BY", "HAVING", "WINDOW", "ORDER_BY",
    "LIMIT", "OFFSET", "SET_OP",
];
const CTE_KEYS: &[&str] = &["name", "plan", "recursive"];
const SELECT_ITEM_KEYS: &[&str] = &["expr", "alias"];
const FROM_TABLE_KEYS: &[&str] = &["table"];
const FROM_SUBQUERY_KEYS: &[&str] = &["subquery", "alias"];
const JOIN_KEYS: &[&str] = &["rel", "type", "alias"];
const WINDOW_KEYS: &[&str] = &["name", "partition_by", "order_by", "frame"];
const WINDOW_FRAME_KEYS: &[&str] = &["units", "start", "end"];
const ORDER_BY_KEYS: &[&str] = &["expr", "dir"];
const LIMIT_VALUE_KEYS: &[&str] = &["value", "param"];
const SET_OP_KEYS: &[&str] = &["op", "right"];

pub fn parse_query_plan(value: &Value, path: &Path, depth: usize) -> Result<QueryPlan, ParseError> {
    check_depth(depth, path)?;
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, PLAN_KEYS)?;

    let with = match obj.get("WITH") {
        Some(v) => {
            let wpath = path.child("WITH");
            expect_array(v, &wpath)?
                .iter()
                .enumerate()
                .map(|(i, c)| parse_cte(c, &wpath.index(i), depth))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let select = parse_select_clause(get_field(obj, path, "SELECT")?, &path.child("SELECT"), depth)?;
    let from = parse_from_clause(get_field(obj, path, "FROM")?, &path.child("FROM"), depth)?;

    let join = match obj.get("JOIN") {
        Some(v) => {
            let jpath = path.child("JOIN");
            expect_array(v, &jpath)?
                .iter()
                .enumerate()
                .map(|(i, j)| parse_join_clause(j, &jpath.index(i)))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let r#where = obj
        .get("WHERE")
        .map(|v| parse_predicate(v, &path.child("WHERE"), depth + 1))
        .transpose()?;

    let group_by = match obj.get("GROUP_BY") {
        Some(v) => {
            let gpath = path.child("GROUP_BY");
            expect_array(v, &gpath)?
                .iter()
                .enumerate()
                .map(|(i, o)| parse_operand(o, &gpath.index(i), depth + 1))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let having = obj
        .get("HAVING")
        .map(|v| parse_predicate(v, &path.child("HAVING"), depth + 1))
        .transpose()?;

    let window = match obj.get("WINDOW") {
        Some(v) => {
            let wpath = path.child("WINDOW");
            expect_array(v, &wpath)?
                .iter()
                .enumerate()
                .map(|(i, w)| parse_window_spec(w, &wpath.index(i), depth))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let order_by = match obj.get("ORDER_BY") {
        Some(v) => {
            let opath = path.child("ORDER_BY");
            expect_array(v, &opath)?
                .iter()
                .enumerate()
                .map(|(i, o)| parse_order_by_item(o, &opath.index(i), depth))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let limit = obj
        .get("LIMIT")
        .map(|v| parse_limit_value(v, &path.child("LIMIT")))
        .transpose()?;
    let offset = obj
        .get("OFFSET")
        .map(|v| parse_limit_value(v, &path.child("OFFSET")))
        .transpose()?;

    let set_op = obj
        .get("SET_OP")
        .map(|v| parse_set_op(v, &path.child("SET_OP"), depth))
        .transpose()?;

    Ok(QueryPlan {
        with,
        select,
        from,
        join,
        r#where,
        group_by,
        having,
        window,
        order_by,
        limit,
        offset,
        set_op,
    })
}

fn parse_cte(value: &Value, path: &Path, depth: usize) -> Result<CteDef, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, CTE_KEYS)?;
    let name = expect_str(get_field(obj, path, "name")?, &path.child("name"))?.to_string();
    let plan = Box::new(parse_query_plan(
        get_field(obj, path, "plan")?,
        &path.child("plan"),
        depth + 1,
    )?);
    let recursive = match obj.get("recursive") {
        Some(v) => v.as_bool().ok_or_else(|| wrong_type(&path.child("recursive"), "boolean", v))?,
        None => false,
    };
    Ok(CteDef { name, plan, recursive })
}

fn parse_select_clause(value: &Value, path: &Path, depth: usize) -> Result<SelectClause, ParseError> {
    if let Some(s) = value.as_str() {
        if s == "*" {
            return Ok(SelectClause::Wildcard);
        }
        return Err(wrong_type(path, "\"*\" or a list of select items", value));
    }
    let arr = expect_array(value, path)?;
    if arr.is_empty() {
        return Err(ParseError::WrongArity {
            path: path.to_jq(),
            op: "SELECT".to_string(),
            expected: "non-empty list or \"*\"".to_string(),
            found: 0,
        });
    }
    let items = arr
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let ipath = path.index(i);
            let iobj = expect_object(item, &ipath)?;
            check_known_keys(iobj, &ipath, SELECT_ITEM_KEYS)?;
            let expr = parse_operand(get_field(iobj, &ipath, "expr")?, &ipath.child("expr"), depth + 1)?;
            let alias = match iobj.get("alias") {
                Some(v) => Some(expect_str(v, &ipath.child("alias"))?.to_string()),
                None => None,
            };
            Ok(SelectItem { expr, alias })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    Ok(SelectClause::Items(items))
}

fn parse_from_clause(value: &Value, path: &Path, depth: usize) -> Result<FromClause, ParseError> {
    let obj = expect_object(value, path)?;
    if let Some(table_val) = obj.get("table") {
        check_known_keys(obj, path, FROM_TABLE_KEYS)?;
        let table = expect_str(table_val, &path.child("table"))?.to_string();
        return Ok(FromClause::Table { table });
    }
    if let Some(sub_val) = obj.get("subquery") {
        check_known_keys(obj, path, FROM_SUBQUERY_KEYS)?;
        let subquery = Box::new(parse_query_plan(sub_val, &path.child("subquery"), depth + 1)?);
        let alias = expect_str(get_field(obj, path, "alias")?, &path.child("alias"))?.to_string();
        return Ok(FromClause::Subquery { subquery, alias });
    }
    Err(crate::support::missing_field(path, "table or subquery"))
}

fn parse_join_clause(value: &Value, path: &Path) -> Result<JoinClause, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, JOIN_KEYS)?;
    let rel = expect_str(get_field(obj, path, "rel")?, &path.child("rel"))?.to_string();
    let type_str = expect_str(get_field(obj, path, "type")?, &path.child("type"))?;
    let join_type = match type_str {
        "INNER" => JoinType::Inner,
        "LEFT" => JoinType::Left,
        "RIGHT" => JoinType::Right,
        "FULL" => JoinType::Full,
        other => {
            return Err(ParseError::UnknownTag {
                path: path.child("type").to_jq(),
                tag: other.to_string(),
                expected: &["INNER", "LEFT", "RIGHT", "FULL"],
            })
        }
    };
    let alias = match obj.get("alias") {
        Some(v) => Some(expect_str(v, &path.child("alias"))?.to_string()),
        None => None,
    };
    Ok(JoinClause { rel, join_type, alias })
}

fn parse_window_spec(value: &Value, path: &Path, depth: usize) -> Result<WindowSpec, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, WINDOW_KEYS)?;
    let name = expect_str(get_field(obj, path, "name")?, &path.child("name"))?.to_string();

    let partition_by = match obj.get("partition_by") {
        Some(v) => {
            let ppath = path.child("partition_by");
            expect_array(v, &ppath)?
                .iter()
                .enumerate()
                .map(|(i, o)| parse_operand(o, &ppath.index(i), depth + 1))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let order_by = match obj.get("order_by") {
        Some(v) => {
            let opath = path.child("order_by");
            expect_array(v, &opath)?
                .iter()
                .enumerate()
                .map(|(i, o)| parse_order_by_item(o, &opath.index(i), depth))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    let frame = obj
        .get("frame")
        .map(|v| parse_window_frame(v, &path.child("frame"), depth))
        .transpose()?;

    Ok(WindowSpec {
        name,
        partition_by,
        order_by,
        frame,
    })
}

fn parse_window_frame(value: &Value, path: &Path, depth: usize) -> Result<WindowFrame, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, WINDOW_FRAME_KEYS)?;
    let units_str = expect_str(get_field(obj, path, "units")?, &path.child("units"))?;
    let units = match units_str {
        "ROWS" => WindowFrameUnits::Rows,
        "RANGE" => WindowFrameUnits::Range,
        other => {
            return Err(ParseError::UnknownTag {
                path: path.child("units").to_jq(),
                tag: other.to_string(),
                expected: &["ROWS", "RANGE"],
            })
        }
    };
    let start = parse_frame_bound(get_field(obj, path, "start")?, &path.child("start"), depth)?;
    let end = obj
        .get("end")
        .map(|v| parse_frame_bound(v, &path.child("end"), depth))
        .transpose()?;
    Ok(WindowFrame { units, start, end })
}

fn parse_frame_bound(value: &Value, path: &Path, depth: usize) -> Result<WindowFrameBound, ParseError> {
    let obj = expect_object(value, path)?;
    let (tag, payload) = crate::support::single_key(obj, path)?;
    match tag {
        "UNBOUNDED_PRECEDING" => Ok(WindowFrameBound::UnboundedPreceding),
        "UNBOUNDED_FOLLOWING" => Ok(WindowFrameBound::UnboundedFollowing),
        "CURRENT_ROW" => Ok(WindowFrameBound::CurrentRow),
        "PRECEDING" => Ok(WindowFrameBound::Preceding(parse_operand(
            payload,
            &path.child("PRECEDING"),
            depth + 1,
        )?)),
        "FOLLOWING" => Ok(WindowFrameBound::Following(parse_operand(
            payload,
            &path.child("FOLLOWING"),
            depth + 1,
        )?)),
        other => Err(ParseError::UnknownTag {
            path: path.to_jq(),
            tag: other.to_string(),
            expected: &[
                "UNBOUNDED_PRECEDING",
                "UNBOUNDED_FOLLOWING",
                "CURRENT_ROW",
                "PRECEDING",
                "FOLLOWING",
            ],
        }),
    }
}

fn parse_order_by_item(value: &Value, path: &Path, depth: usize) -> Result<OrderByItem, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, ORDER_BY_KEYS)?;
    let expr = parse_operand(get_field(obj, path, "expr")?, &path.child("expr"), depth + 1)?;
    let dir_str = expect_str(get_field(obj, path, "dir")?, &path.child("dir"))?;
    let dir = match dir_str {
        "ASC" => SortDirection::Asc,
        "DESC" => SortDirection::Desc,
        other => {
            return Err(ParseError::UnknownTag {
                path: path.child("dir").to_jq(),
                tag: other.to_string(),
                expected: &["ASC", "DESC"],
            })
        }
    };
    Ok(OrderByItem { expr, dir })
}

fn parse_limit_value(value: &Value, path: &Path) -> Result<LimitValue, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, LIMIT_VALUE_KEYS)?;
    if let Some(v) = obj.get("value") {
        let n = v
            .as_i64()
            .ok_or_else(|| wrong_type(&path.child("value"), "integer", v))?;
        return Ok(LimitValue::Value(n));
    }
    if let Some(p) = obj.get("param") {
        let name = expect_str(p, &path.child("param"))?;
        return Ok(LimitValue::Param(name.to_string()));
    }
    Err(crate::support::missing_field(path, "value or param"))
}

fn parse_set_op(value: &Value, path: &Path, depth: usize) -> Result<SetOpClause, ParseError> {
    let obj = expect_object(value, path)?;
    check_known_keys(obj, path, SET_OP_KEYS)?;
    let op_str = expect_str(get_field(obj, path, "op")?, &path.child("op"))?;
    let op = match op_str {
        "UNION" => SetOpKind::Union,
        "UNION_ALL" => SetOpKind::UnionAll,
        "INTERSECT" => SetOpKind::Intersect,
        "EXCEPT" => SetOpKind::Except,
        other => {
            return Err(ParseError::UnknownTag {
                path: path.child("op").to_jq(),
                tag: other.to_string(),
                expected: &["UNION", "UNION_ALL", "INTERSECT", "EXCEPT"],
            })
        }
    };
    let right = Box::new(parse_query_plan(
        get_field(obj, path, "right")?,
        &path.child("right"),
        depth + 1,
    )?);
    Ok(SetOpClause { op, right })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan() -> Value {
        json!({
            "SELECT": [{"expr": {"col": "employees.name"}}],
            "FROM": {"table": "employees"},
            "WHERE": {"EQ": [{"col": "employees.department_id"}, {"param": "dept"}]},
            "LIMIT": {"value": 50},
        })
    }

    #[test]
    fn parses_a_minimal_plan() {
        let parsed = parse_query_plan(&plan(), &Path::root(), 0).unwrap();
        assert_eq!(parsed.from, FromClause::Table { table: "employees".to_string() });
        assert_eq!(parsed.limit, Some(LimitValue::Value(50)));
    }

    #[test]
    fn wildcard_select_parses() {
        let mut v = plan();
        v["SELECT"] = json!("*");
        let parsed = parse_query_plan(&v, &Path::root(), 0).unwrap();
        assert_eq!(parsed.select, SelectClause::Wildcard);
    }

    #[test]
    fn empty_select_list_is_rejected() {
        let mut v = plan();
        v["SELECT"] = json!([]);
        let err = parse_query_plan(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.wrong_arity");
    }

    #[test]
    fn missing_from_is_rejected() {
        let mut v = plan();
        v.as_object_mut().unwrap().remove("FROM");
        let err = parse_query_plan(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.missing_field");
    }

    #[test]
    fn bad_join_type_is_rejected() {
        let mut v = plan();
        v["JOIN"] = json!([{"rel": "employees_departments", "type": "CROSS"}]);
        let err = parse_query_plan(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.unknown_tag");
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let mut v = plan();
        v["GROUP_BYS"] = json!([]);
        let err = parse_query_plan(&v, &Path::root(), 0).unwrap_err();
        assert_eq!(err.code(), "parse.unknown_tag");
    }
}
