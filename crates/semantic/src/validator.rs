// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Plan validation
//!
//! [`validate_plan`] walks a [`QueryPlan`] clause by clause, checking dialect
//! capabilities, schema references, and cross-clause semantic rules (group-by
//! coverage, HAVING without GROUP BY, set-operation arity). It delegates to
//! the mutually recursive [`validate_operand`] / [`validate_predicate`] pair
//! for the scalar expression language, which in turn call back into
//! `validate_plan` for `IN (subquery)` / `EXISTS` / derived tables — each
//! descent happens in a fresh, stacked scope frame so correlated references
//! to the enclosing query still resolve.

use planguard_ir::{
    Capability, ColumnRef, FromClause, InRhs, JoinClause, LimitValue, Operand, Predicate,
    QueryPlan, SelectClause, WindowFrameBound,
};

use crate::error::{ValidationError, ValidationResult};
use crate::scope::{ScopeBinding, ValidationContext};

const LIMIT_OFFSET_MAX: i64 = 1 << 31;

pub fn validate_plan(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    let span = tracing::debug_span!("validate_plan", target = ctx.dialect.target());
    let _enter = span.enter();
    validate_ctes(ctx, plan)?;
    validate_from(ctx, plan)?;
    validate_joins(ctx, plan)?;
    validate_select(ctx, plan)?;

    if let Some(where_pred) = &plan.r#where {
        validate_predicate(ctx, where_pred)?;
    }

    validate_group_by(ctx, plan)?;
    validate_having(ctx, plan)?;
    validate_group_by_coverage(ctx, plan)?;
    validate_windows(ctx, plan)?;
    validate_order_by(ctx, plan)?;
    validate_limit_offset(ctx, plan)?;
    validate_set_op(ctx, plan)?;

    Ok(())
}

fn require(ctx: &ValidationContext, cap: Capability, label: &str) -> ValidationResult<()> {
    if ctx.dialect.supports(cap) {
        Ok(())
    } else {
        Err(ValidationError::DialectDisabled {
            target: ctx.dialect.target().to_string(),
            capability: label.to_string(),
        })
    }
}

fn validate_ctes(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    for cte in &plan.with {
        require(ctx, Capability::Ctes, "ctes")?;
        if cte.recursive {
            require(ctx, Capability::Subqueries, "subqueries")
                .map_err(|_| ValidationError::RecursionNotEnabled)?;
        }
        // Bind before descending so a recursive CTE can reference itself.
        ctx.bind(cte.name.clone(), ScopeBinding::Opaque);
        ctx.push_frame();
        let result = validate_plan(ctx, &cte.plan);
        ctx.pop_frame();
        result?;
    }
    Ok(())
}

fn validate_from(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    match &plan.from {
        FromClause::Table { table } => {
            if matches!(ctx.resolve(table), Some(ScopeBinding::Opaque)) {
                ctx.bind(table.clone(), ScopeBinding::Opaque);
            } else if ctx.snapshot.has_table(table) {
                if !ctx.dialect.table_allowed(table) {
                    return Err(ValidationError::UnknownTable {
                        table: table.clone(),
                    });
                }
                ctx.bind(table.clone(), ScopeBinding::Table(table.clone()));
            } else {
                return Err(ValidationError::UnknownTable {
                    table: table.clone(),
                });
            }
        }
        FromClause::Subquery { subquery, alias } => {
            require(ctx, Capability::Subqueries, "subqueries")?;
            ctx.push_frame();
            let result = validate_plan(ctx, subquery);
            ctx.pop_frame();
            result?;
            ctx.bind(alias.clone(), ScopeBinding::Opaque);
        }
    }
    Ok(())
}

fn validate_joins(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    if plan.join.is_empty() {
        return Ok(());
    }
    require(ctx, Capability::Joins, "joins")?;
    if plan.join.len() > ctx.dialect.max_join_depth() {
        return Err(ValidationError::JoinDepthExceeded {
            len: plan.join.len(),
            max: ctx.dialect.max_join_depth(),
        });
    }
    for join in &plan.join {
        bind_join(ctx, join)?;
    }
    Ok(())
}

fn bind_join(ctx: &mut ValidationContext, join: &JoinClause) -> ValidationResult<()> {
    let rel = ctx
        .snapshot
        .relationship(&join.rel)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownRelationship {
            key: join.rel.clone(),
        })?;

    let source_in_scope = matches!(
        ctx.resolve(&rel.source.table),
        Some(ScopeBinding::Table(t)) if t == &rel.source.table
    );
    let target_in_scope = matches!(
        ctx.resolve(&rel.target.table),
        Some(ScopeBinding::Table(t)) if t == &rel.target.table
    );

    let introduced = if source_in_scope {
        &rel.target
    } else if target_in_scope {
        &rel.source
    } else {
        return Err(ValidationError::JoinNotConnected {
            key: join.rel.clone(),
        });
    };

    let alias = join.alias.clone().unwrap_or_else(|| introduced.table.clone());
    ctx.bind(alias, ScopeBinding::Table(introduced.table.clone()));
    Ok(())
}

fn validate_select(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    let SelectClause::Items(items) = &plan.select else {
        return Ok(());
    };
    let mut seen_aliases = std::collections::HashSet::new();
    for item in items {
        validate_operand(ctx, &item.expr)?;
        if let Some(alias) = &item.alias {
            if !seen_aliases.insert(alias.clone()) {
                return Err(ValidationError::DuplicateAlias(alias.clone()));
            }
        }
    }
    Ok(())
}

fn validate_group_by(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    if plan.group_by.is_empty() {
        return Ok(());
    }
    require(ctx, Capability::Aggregations, "aggregations")?;
    for op in &plan.group_by {
        validate_operand(ctx, op)?;
    }
    Ok(())
}

fn validate_having(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    let Some(having) = &plan.having else {
        return Ok(());
    };
    if plan.group_by.is_empty() {
        return Err(ValidationError::HavingWithoutGroupBy);
    }
    require(ctx, Capability::Aggregations, "aggregations")?;
    validate_predicate(ctx, having)
}

fn is_aggregate_operand(ctx: &ValidationContext, operand: &Operand) -> bool {
    matches!(
        operand,
        Operand::Func { name, .. } if ctx.functions.is_aggregate(ctx.dialect.target(), name)
    )
}

fn validate_group_by_coverage(
    ctx: &mut ValidationContext,
    plan: &QueryPlan,
) -> ValidationResult<()> {
    if plan.group_by.is_empty() {
        return Ok(());
    }
    if let SelectClause::Items(items) = &plan.select {
        for item in items {
            if !is_aggregate_operand(ctx, &item.expr) && !plan.group_by.contains(&item.expr) {
                return Err(ValidationError::NonAggregateNotInGroupBy { clause: "select" });
            }
        }
    }
    for item in &plan.order_by {
        if !is_aggregate_operand(ctx, &item.expr) && !plan.group_by.contains(&item.expr) {
            return Err(ValidationError::NonAggregateNotInGroupBy { clause: "order_by" });
        }
    }
    Ok(())
}

fn validate_windows(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    if plan.window.is_empty() {
        return Ok(());
    }
    require(ctx, Capability::WindowFunctions, "window_functions")?;
    for window in &plan.window {
        for op in &window.partition_by {
            validate_operand(ctx, op)?;
        }
        for item in &window.order_by {
            validate_operand(ctx, &item.expr)?;
        }
        if let Some(frame) = &window.frame {
            validate_frame_bound(ctx, &frame.start)?;
            if let Some(end) = &frame.end {
                validate_frame_bound(ctx, end)?;
            }
        }
    }
    Ok(())
}

fn validate_frame_bound(ctx: &mut ValidationContext, bound: &WindowFrameBound) -> ValidationResult<()> {
    match bound {
        WindowFrameBound::Preceding(op) | WindowFrameBound::Following(op) => {
            validate_operand(ctx, op)
        }
        _ => Ok(()),
    }
}

fn validate_order_by(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    if plan.order_by.is_empty() {
        return Ok(());
    }
    require(ctx, Capability::Joins, "joins")?;
    for item in &plan.order_by {
        validate_operand(ctx, &item.expr)?;
    }
    Ok(())
}

fn check_range(clause: &'static str, value: &LimitValue) -> ValidationResult<()> {
    if let LimitValue::Value(v) = value {
        if *v < 0 || *v >= LIMIT_OFFSET_MAX {
            return Err(ValidationError::ValueOutOfRange {
                clause,
                value: *v,
                max: LIMIT_OFFSET_MAX,
            });
        }
    }
    Ok(())
}

fn validate_limit_offset(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    if let Some(limit) = &plan.limit {
        check_range("limit", limit)?;
    }
    if let Some(offset) = &plan.offset {
        require(ctx, Capability::Joins, "joins")?;
        check_range("offset", offset)?;
        if plan.limit.is_none() && !ctx.dialect.supports(Capability::OffsetWithoutLimit) {
            return Err(ValidationError::OffsetWithoutLimit {
                target: ctx.dialect.target().to_string(),
            });
        }
    }
    Ok(())
}

fn validate_set_op(ctx: &mut ValidationContext, plan: &QueryPlan) -> ValidationResult<()> {
    let Some(set_op) = &plan.set_op else {
        return Ok(());
    };
    require(ctx, Capability::SetOperations, "set_operations")?;
    if let (Some(left), Some(right)) = (plan.projection_arity(), set_op.right.projection_arity()) {
        if left != right {
            return Err(ValidationError::SetOpColumnMismatch { left, right });
        }
    }
    // The right branch is a structurally independent SELECT; it does not
    // inherit this plan's FROM/JOIN scope.
    let mut right_ctx = ValidationContext::new(ctx.snapshot, ctx.dialect, ctx.functions);
    validate_plan(&mut right_ctx, &set_op.right)
}

fn resolve_column(ctx: &ValidationContext, table: &str, column: &str) -> ValidationResult<()> {
    match ctx.resolve(table) {
        None => Err(ValidationError::UnknownTable {
            table: table.to_string(),
        }),
        Some(ScopeBinding::Opaque) => Ok(()),
        Some(ScopeBinding::Table(real)) => {
            if ctx.snapshot.column(real, column).is_some() {
                Ok(())
            } else {
                Err(ValidationError::UnknownColumn {
                    table: table.to_string(),
                    column: column.to_string(),
                })
            }
        }
    }
}

fn validate_column_ref(ctx: &ValidationContext, col: &ColumnRef) -> ValidationResult<()> {
    resolve_column(ctx, &col.table, &col.column)
}

pub fn validate_operand(ctx: &mut ValidationContext, operand: &Operand) -> ValidationResult<()> {
    match operand {
        Operand::Col(col) => validate_column_ref(ctx, col),
        Operand::Value(_) => Ok(()),
        Operand::Param(_) => Ok(()),
        Operand::Func { name, args } => {
            let allowed = ctx.dialect.is_function_allowed(name)
                || ctx.functions.has_function(ctx.dialect.target(), name);
            if !allowed {
                return Err(ValidationError::BadFunction {
                    name: name.clone(),
                    target: ctx.dialect.target().to_string(),
                });
            }
            for arg in args {
                validate_operand(ctx, arg)?;
            }
            Ok(())
        }
        Operand::Case { when, r#else } => {
            for clause in when {
                validate_predicate(ctx, &clause.cond)?;
                validate_operand(ctx, &clause.then)?;
            }
            if let Some(e) = r#else {
                validate_operand(ctx, e)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn validate_predicate(ctx: &mut ValidationContext, predicate: &Predicate) -> ValidationResult<()> {
    match predicate {
        Predicate::Cmp { left, right, .. } => {
            validate_operand(ctx, left)?;
            validate_operand(ctx, right)
        }
        Predicate::IsNull(op) | Predicate::IsNotNull(op) => validate_operand(ctx, op),
        Predicate::Like { left, right, .. } => {
            validate_operand(ctx, left)?;
            validate_operand(ctx, right)
        }
        Predicate::In { left, rhs, .. } => {
            validate_operand(ctx, left)?;
            match rhs {
                InRhs::List(items) => {
                    if items.is_empty() {
                        return Err(ValidationError::ArityMismatch {
                            op: "IN",
                            expected: "non-empty list or subquery",
                            found: 0,
                        });
                    }
                    for item in items {
                        validate_operand(ctx, item)?;
                    }
                    Ok(())
                }
                InRhs::Subquery(subquery) => {
                    require(ctx, Capability::Subqueries, "subqueries")?;
                    ctx.push_frame();
                    let result = validate_plan(ctx, subquery);
                    ctx.pop_frame();
                    result
                }
            }
        }
        Predicate::Between { expr, low, high } => {
            validate_operand(ctx, expr)?;
            validate_operand(ctx, low)?;
            validate_operand(ctx, high)
        }
        Predicate::And(list) => {
            if list.len() < 2 {
                return Err(ValidationError::ArityMismatch {
                    op: "AND",
                    expected: ">= 2 predicates",
                    found: list.len(),
                });
            }
            list.iter().try_for_each(|p| validate_predicate(ctx, p))
        }
        Predicate::Or(list) => {
            if list.len() < 2 {
                return Err(ValidationError::ArityMismatch {
                    op: "OR",
                    expected: ">= 2 predicates",
                    found: list.len(),
                });
            }
            list.iter().try_for_each(|p| validate_predicate(ctx, p))
        }
        Predicate::Not(inner) => validate_predicate(ctx, inner),
        Predicate::Exists { subquery, .. } => {
            require(ctx, Capability::Subqueries, "subqueries")?;
            ctx.push_frame();
            let result = validate_plan(ctx, subquery);
            ctx.pop_frame();
            result
        }
        Predicate::Extension { args, .. } => args.iter().try_for_each(|a| validate_operand(ctx, a)),
        _ => Ok(()),
    }
}
