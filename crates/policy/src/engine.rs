// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Policy enforcement
//!
//! [`enforce`] runs after `planguard-semantic` validation and before
//! compilation. It denies references to columns the policy blocks,
//! conjoins mandatory tenant/ABAC predicates into the owning WHERE clause,
//! rejects plans where a required predicate could be bypassed through an
//! `OR`, and defaults `LIMIT` on the top-level plan when the caller omitted
//! one.
//!
//! Required-binding checking and injection is scoped per `QueryPlan` node:
//! a table introduced by a CTE body, a FROM-subquery, an `IN` subquery, or
//! an `EXISTS` subquery is only in scope at that nested level, so its
//! required predicate is checked against (and injected into) that level's
//! own WHERE clause, never the enclosing query's. A guard that happens to
//! sit inside a sibling `EXISTS` body is not treated as satisfying an
//! outer-level requirement — `EXISTS` only asserts the subquery *can*
//! match some row, not that every outer row does, so borrowing its
//! predicate to satisfy an unrelated scope would be unsound.
//!
//! The plan is never mutated in place: each level is rebuilt immutably
//! (including every nested CTE/subquery/set-op branch) and the rebuilt
//! tree is returned, so a caller holding the pre-enforcement plan (for
//! logging, say) still sees the original.

use std::collections::HashSet;

use planguard_catalog::SchemaSnapshot;
use planguard_ir::{
    CmpOp, ColumnRef, CteDef, FromClause, InRhs, JoinClause, LimitValue, Operand, Predicate,
    QueryPlan, SetOpClause,
};

use crate::config::PolicyConfig;
use crate::error::{PolicyError, PolicyResult};
use crate::scan::{references_table, scan_plan};

#[derive(Debug)]
pub struct PolicyOutcome {
    pub plan: QueryPlan,
    pub required_params: HashSet<String>,
}

struct RequiredBinding {
    table: String,
    column: String,
    param: String,
}

pub fn enforce(plan: QueryPlan, snapshot: &SchemaSnapshot, config: &PolicyConfig) -> PolicyResult<PolicyOutcome> {
    let scan = scan_plan(&plan, snapshot);

    for (table, column) in &scan.refs {
        if config.tables.get(table).is_some_and(|tp| tp.denied_columns.contains(column)) {
            tracing::warn!(%table, %column, "policy denied column reference");
            return Err(PolicyError::ColumnDenied {
                table: table.clone(),
                column: column.clone(),
            });
        }
    }

    let mut required_params = HashSet::new();
    let mut out_plan = enforce_tree(plan, snapshot, config, &mut required_params)?;

    if out_plan.limit.is_none() {
        if let Some(default) = config.default_limit {
            out_plan.limit = Some(LimitValue::Value(default));
        }
    }

    Ok(PolicyOutcome {
        plan: out_plan,
        required_params,
    })
}

/// Rebuilds `plan`, recursing into every nested `QueryPlan` it owns (CTE
/// bodies, a FROM-subquery, `IN`/`EXISTS` subqueries inside its own WHERE,
/// and its SET_OP right branch) before checking and injecting this level's
/// own required bindings into its own WHERE. LIMIT defaulting is left to
/// the caller — it only ever applies to the outermost plan.
fn enforce_tree(
    plan: QueryPlan,
    snapshot: &SchemaSnapshot,
    config: &PolicyConfig,
    required_params: &mut HashSet<String>,
) -> PolicyResult<QueryPlan> {
    let with = plan
        .with
        .into_iter()
        .map(|cte| {
            let inner = enforce_tree(*cte.plan, snapshot, config, required_params)?;
            Ok(CteDef {
                name: cte.name,
                plan: Box::new(inner),
                recursive: cte.recursive,
            })
        })
        .collect::<PolicyResult<Vec<_>>>()?;

    let from = match plan.from {
        FromClause::Table { table } => FromClause::Table { table },
        FromClause::Subquery { subquery, alias } => {
            let inner = enforce_tree(*subquery, snapshot, config, required_params)?;
            FromClause::Subquery {
                subquery: Box::new(inner),
                alias,
            }
        }
    };

    let where_pred = plan
        .r#where
        .map(|p| enforce_nested_subqueries(p, snapshot, config, required_params))
        .transpose()?;

    let set_op = match plan.set_op {
        Some(set_op) => {
            let right = enforce_tree(*set_op.right, snapshot, config, required_params)?;
            Some(SetOpClause {
                op: set_op.op,
                right: Box::new(right),
            })
        }
        None => None,
    };

    let own_tables = own_scope_tables(&from, &plan.join, snapshot);
    let required = required_bindings(&own_tables, config);

    let mut where_pred = where_pred;
    for binding in &required {
        required_params.insert(binding.param.clone());
        let satisfied = where_pred
            .as_ref()
            .is_some_and(|p| contains_required_conjunct(p, &binding.table, &binding.column, &binding.param));
        if satisfied {
            continue;
        }
        if config.inject_missing_params {
            let injected = Predicate::Cmp {
                op: CmpOp::Eq,
                left: Operand::Col(ColumnRef::new(binding.table.clone(), binding.column.clone())),
                right: Operand::Param(binding.param.clone()),
            };
            where_pred = Some(conjoin(where_pred, injected));
        } else {
            return Err(PolicyError::MissingRequiredParam {
                table: binding.table.clone(),
                column: binding.column.clone(),
                param: binding.param.clone(),
            });
        }
    }

    if let Some(pred) = &where_pred {
        check_or_bypass(pred, &required)?;
    }

    Ok(QueryPlan {
        with,
        select: plan.select,
        from,
        join: plan.join,
        r#where: where_pred,
        group_by: plan.group_by,
        having: plan.having,
        window: plan.window,
        order_by: plan.order_by,
        limit: plan.limit,
        offset: plan.offset,
        set_op,
    })
}

/// Rebuilds a predicate tree, recursing into any `IN`/`EXISTS` subquery it
/// holds (each enforced at its own scope) without otherwise touching the
/// predicate's shape. The required-conjunct injection for *this* level
/// happens one layer up, in [`enforce_tree`], once the whole WHERE tree
/// (subqueries included) has been rebuilt.
fn enforce_nested_subqueries(
    predicate: Predicate,
    snapshot: &SchemaSnapshot,
    config: &PolicyConfig,
    required_params: &mut HashSet<String>,
) -> PolicyResult<Predicate> {
    Ok(match predicate {
        Predicate::In { left, rhs, negated } => {
            let rhs = match rhs {
                InRhs::List(items) => InRhs::List(items),
                InRhs::Subquery(subquery) => {
                    InRhs::Subquery(Box::new(enforce_tree(*subquery, snapshot, config, required_params)?))
                }
            };
            Predicate::In { left, rhs, negated }
        }
        Predicate::Exists { subquery, negated } => {
            let inner = enforce_tree(*subquery, snapshot, config, required_params)?;
            Predicate::Exists {
                subquery: Box::new(inner),
                negated,
            }
        }
        Predicate::And(list) => Predicate::And(
            list.into_iter()
                .map(|p| enforce_nested_subqueries(p, snapshot, config, required_params))
                .collect::<PolicyResult<Vec<_>>>()?,
        ),
        Predicate::Or(list) => Predicate::Or(
            list.into_iter()
                .map(|p| enforce_nested_subqueries(p, snapshot, config, required_params))
                .collect::<PolicyResult<Vec<_>>>()?,
        ),
        Predicate::Not(inner) => Predicate::Not(Box::new(enforce_nested_subqueries(
            *inner,
            snapshot,
            config,
            required_params,
        )?)),
        other => other,
    })
}

/// Real schema tables this plan level's own FROM/JOIN introduce — not the
/// tables its nested CTEs/subqueries introduce, which are their own scope
/// and are resolved by their own `enforce_tree` call.
fn own_scope_tables(from: &FromClause, joins: &[JoinClause], snapshot: &SchemaSnapshot) -> HashSet<String> {
    let mut tables = HashSet::new();
    if let FromClause::Table { table } = from {
        if snapshot.has_table(table) {
            tables.insert(table.clone());
        }
    }
    for join in joins {
        if let Some(rel) = snapshot.relationship(&join.rel) {
            let introduced = if tables.contains(&rel.source.table) {
                &rel.target
            } else {
                &rel.source
            };
            tables.insert(introduced.table.clone());
        }
    }
    tables
}

fn required_bindings(tables: &HashSet<String>, config: &PolicyConfig) -> Vec<RequiredBinding> {
    let mut table_names: Vec<&String> = tables.iter().collect();
    table_names.sort();
    let mut required = Vec::new();
    for table in table_names {
        if let Some(table_policy) = config.tables.get(table) {
            let mut columns: Vec<(&String, &String)> = table_policy.param_bound_columns.iter().collect();
            columns.sort();
            for (column, param) in columns {
                required.push(RequiredBinding {
                    table: table.clone(),
                    column: column.clone(),
                    param: param.clone(),
                });
            }
        }
    }
    required
}

fn conjoin(existing: Option<Predicate>, addition: Predicate) -> Predicate {
    match existing {
        None => addition,
        Some(Predicate::And(mut conjuncts)) => {
            conjuncts.push(addition);
            Predicate::And(conjuncts)
        }
        Some(other) => Predicate::And(vec![other, addition]),
    }
}

fn contains_required_conjunct(predicate: &Predicate, table: &str, column: &str, param: &str) -> bool {
    match predicate {
        Predicate::Cmp { op: CmpOp::Eq, left, right } => {
            (is_bound_column(left, table, column) && is_bound_param(right, param))
                || (is_bound_column(right, table, column) && is_bound_param(left, param))
        }
        Predicate::And(conjuncts) => conjuncts.iter().any(|p| contains_required_conjunct(p, table, column, param)),
        Predicate::Or(branches) => {
            !branches.is_empty() && branches.iter().all(|p| contains_required_conjunct(p, table, column, param))
        }
        _ => false,
    }
}

fn is_bound_column(operand: &Operand, table: &str, column: &str) -> bool {
    matches!(operand, Operand::Col(c) if c.table == table && c.column == column)
}

fn is_bound_param(operand: &Operand, param: &str) -> bool {
    matches!(operand, Operand::Param(p) if p == param)
}

/// Walks the WHERE tree looking for an `OR` node where a required predicate
/// guards only some of the branches that actually touch the table it
/// protects — the tell-tale shape of a policy bypass (`tenant_id = :t OR
/// 1=1`). Only inspects `required`, the bindings scoped to this level —
/// a nested subquery's own bypass check runs separately, at its own level.
fn check_or_bypass(predicate: &Predicate, required: &[RequiredBinding]) -> PolicyResult<()> {
    match predicate {
        Predicate::Or(branches) => {
            for binding in required {
                let relevant: Vec<&Predicate> =
                    branches.iter().filter(|b| references_table(b, &binding.table)).collect();
                if relevant.is_empty() {
                    continue;
                }
                let all_guarded = relevant
                    .iter()
                    .all(|b| contains_required_conjunct(b, &binding.table, &binding.column, &binding.param));
                if !all_guarded {
                    return Err(PolicyError::OrBypass {
                        table: binding.table.clone(),
                        column: binding.column.clone(),
                        param: binding.param.clone(),
                    });
                }
            }
            branches.iter().try_for_each(|b| check_or_bypass(b, required))
        }
        Predicate::And(list) => list.iter().try_for_each(|p| check_or_bypass(p, required)),
        Predicate::Not(inner) => check_or_bypass(inner, required),
        _ => Ok(()),
    }
}
