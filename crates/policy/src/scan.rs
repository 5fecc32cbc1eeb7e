// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Walks a [`QueryPlan`] to answer two questions the policy engine needs:
//! which real schema tables are in scope anywhere in the tree, and which
//! `(table, column)` pairs are actually referenced. This assumes the plan
//! already passed semantic validation — an unknown table or relationship is
//! silently treated as opaque rather than reported, since reporting parse
//! or schema errors is `planguard-semantic`'s job, not this one's.

use std::collections::{HashMap, HashSet};

use planguard_catalog::SchemaSnapshot;
use planguard_ir::{
    FromClause, InRhs, Operand, Predicate, QueryPlan, SelectClause, WindowFrameBound,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Table(String),
    Opaque,
}

#[derive(Default)]
struct Scope {
    frames: Vec<HashMap<String, Binding>>,
}

impl Scope {
    fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn bind(&mut self, name: String, binding: Binding) {
        self.frames.last_mut().expect("at least one frame").insert(name, binding);
    }

    fn resolve(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|f| f.get(name))
    }
}

#[derive(Debug, Default)]
pub struct ScanResult {
    /// Real schema table names touched anywhere in the plan tree.
    pub tables: HashSet<String>,
    /// `(real table, column)` pairs referenced anywhere in the plan tree,
    /// with aliases already resolved to their underlying table.
    pub refs: Vec<(String, String)>,
}

pub fn scan_plan(plan: &QueryPlan, snapshot: &SchemaSnapshot) -> ScanResult {
    let mut result = ScanResult::default();
    let mut scope = Scope::new();
    walk_plan(plan, snapshot, &mut scope, &mut result);
    result
}

fn walk_plan(plan: &QueryPlan, snapshot: &SchemaSnapshot, scope: &mut Scope, out: &mut ScanResult) {
    for cte in &plan.with {
        scope.bind(cte.name.clone(), Binding::Opaque);
        scope.push();
        walk_plan(&cte.plan, snapshot, scope, out);
        scope.pop();
    }

    match &plan.from {
        FromClause::Table { table } => {
            if snapshot.has_table(table) {
                out.tables.insert(table.clone());
                scope.bind(table.clone(), Binding::Table(table.clone()));
            } else {
                scope.bind(table.clone(), Binding::Opaque);
            }
        }
        FromClause::Subquery { subquery, alias } => {
            scope.push();
            walk_plan(subquery, snapshot, scope, out);
            scope.pop();
            scope.bind(alias.clone(), Binding::Opaque);
        }
    }

    for join in &plan.join {
        if let Some(rel) = snapshot.relationship(&join.rel) {
            let source_in_scope = matches!(
                scope.resolve(&rel.source.table),
                Some(Binding::Table(t)) if t == &rel.source.table
            );
            let introduced = if source_in_scope { &rel.target } else { &rel.source };
            out.tables.insert(introduced.table.clone());
            let alias = join.alias.clone().unwrap_or_else(|| introduced.table.clone());
            scope.bind(alias, Binding::Table(introduced.table.clone()));
        }
    }

    if let SelectClause::Items(items) = &plan.select {
        for item in items {
            walk_operand(&item.expr, snapshot, scope, out);
        }
    }
    if let Some(where_pred) = &plan.r#where {
        walk_predicate(where_pred, snapshot, scope, out);
    }
    for op in &plan.group_by {
        walk_operand(op, snapshot, scope, out);
    }
    if let Some(having) = &plan.having {
        walk_predicate(having, snapshot, scope, out);
    }
    for window in &plan.window {
        for op in &window.partition_by {
            walk_operand(op, snapshot, scope, out);
        }
        for item in &window.order_by {
            walk_operand(&item.expr, snapshot, scope, out);
        }
        if let Some(frame) = &window.frame {
            walk_frame_bound(&frame.start, snapshot, scope, out);
            if let Some(end) = &frame.end {
                walk_frame_bound(end, snapshot, scope, out);
            }
        }
    }
    for item in &plan.order_by {
        walk_operand(&item.expr, snapshot, scope, out);
    }
    if let Some(set_op) = &plan.set_op {
        let mut right_scope = Scope::new();
        walk_plan(&set_op.right, snapshot, &mut right_scope, out);
    }
}

fn walk_frame_bound(bound: &WindowFrameBound, snapshot: &SchemaSnapshot, scope: &mut Scope, out: &mut ScanResult) {
    if let WindowFrameBound::Preceding(op) | WindowFrameBound::Following(op) = bound {
        walk_operand(op, snapshot, scope, out);
    }
}

fn walk_operand(operand: &Operand, snapshot: &SchemaSnapshot, scope: &mut Scope, out: &mut ScanResult) {
    match operand {
        Operand::Col(col) => {
            if let Some(Binding::Table(real)) = scope.resolve(&col.table) {
                out.refs.push((real.clone(), col.column.clone()));
            }
        }
        Operand::Value(_) | Operand::Param(_) => {}
        Operand::Func { args, .. } => {
            for arg in args {
                walk_operand(arg, snapshot, scope, out);
            }
        }
        Operand::Case { when, r#else } => {
            for clause in when {
                walk_predicate(&clause.cond, snapshot, scope, out);
                walk_operand(&clause.then, snapshot, scope, out);
            }
            if let Some(e) = r#else {
                walk_operand(e, snapshot, scope, out);
            }
        }
        _ => {}
    }
}

fn walk_predicate(predicate: &Predicate, snapshot: &SchemaSnapshot, scope: &mut Scope, out: &mut ScanResult) {
    match predicate {
        Predicate::Cmp { left, right, .. } | Predicate::Like { left, right, .. } => {
            walk_operand(left, snapshot, scope, out);
            walk_operand(right, snapshot, scope, out);
        }
        Predicate::IsNull(op) | Predicate::IsNotNull(op) => walk_operand(op, snapshot, scope, out),
        Predicate::In { left, rhs, .. } => {
            walk_operand(left, snapshot, scope, out);
            match rhs {
                InRhs::List(items) => {
                    for item in items {
                        walk_operand(item, snapshot, scope, out);
                    }
                }
                InRhs::Subquery(subquery) => {
                    scope.push();
                    walk_plan(subquery, snapshot, scope, out);
                    scope.pop();
                }
            }
        }
        Predicate::Between { expr, low, high } => {
            walk_operand(expr, snapshot, scope, out);
            walk_operand(low, snapshot, scope, out);
            walk_operand(high, snapshot, scope, out);
        }
        Predicate::And(list) | Predicate::Or(list) => {
            for p in list {
                walk_predicate(p, snapshot, scope, out);
            }
        }
        Predicate::Not(inner) => walk_predicate(inner, snapshot, scope, out),
        Predicate::Exists { subquery, .. } => {
            scope.push();
            walk_plan(subquery, snapshot, scope, out);
            scope.pop();
        }
        Predicate::Extension { args, .. } => {
            for arg in args {
                walk_operand(arg, snapshot, scope, out);
            }
        }
        _ => {}
    }
}

/// Returns `true` if `predicate` references `table` anywhere in its operand
/// tree, without descending into subqueries (which are their own scope).
pub fn references_table(predicate: &Predicate, table: &str) -> bool {
    match predicate {
        Predicate::Cmp { left, right, .. } | Predicate::Like { left, right, .. } => {
            operand_references(left, table) || operand_references(right, table)
        }
        Predicate::IsNull(op) | Predicate::IsNotNull(op) => operand_references(op, table),
        Predicate::In { left, rhs, .. } => {
            operand_references(left, table)
                || matches!(rhs, InRhs::List(items) if items.iter().any(|i| operand_references(i, table)))
        }
        Predicate::Between { expr, low, high } => {
            operand_references(expr, table) || operand_references(low, table) || operand_references(high, table)
        }
        Predicate::And(list) | Predicate::Or(list) => list.iter().any(|p| references_table(p, table)),
        Predicate::Not(inner) => references_table(inner, table),
        Predicate::Exists { .. } => false,
        Predicate::Extension { args, .. } => args.iter().any(|a| operand_references(a, table)),
        _ => false,
    }
}

fn operand_references(operand: &Operand, table: &str) -> bool {
    match operand {
        Operand::Col(col) => col.table == table,
        Operand::Func { args, .. } => args.iter().any(|a| operand_references(a, table)),
        Operand::Case { when, r#else } => {
            when.iter().any(|w| references_table(&w.cond, table) || operand_references(&w.then, table))
                || r#else.as_ref().is_some_and(|e| operand_references(e, table))
        }
        _ => false,
    }
}
