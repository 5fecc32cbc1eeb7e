// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! The compilation visitor: walks a validated, policy-enforced
//! [`QueryPlan`] and emits SQL text plus a parameter map. Dialect-specific
//! syntax is delegated to [`SQLCompiler`]; clause order, parameter binding,
//! and join-direction resolution are shared across every target here.

use serde_json::{json, Value};

use planguard_catalog::SchemaSnapshot;
use planguard_function_registry::FunctionRegistry;
use planguard_ir::{
    CmpOp, ColumnRef, FromClause, InRhs, JoinClause, JoinType, Literal, Operand, OrderByItem,
    Predicate, QueryPlan, SelectClause, SelectItem, SetOpKind, SortDirection, WindowFrame,
    WindowFrameBound, WindowSpec,
};

use crate::error::{CompilationError, CompileResult};
use crate::operator_registry::OperatorRegistry;
use crate::scope::{Binding, IdentifierScope};
use crate::sql_compiler::SQLCompiler;
use crate::state::CompileState;

pub struct Emitter<'a> {
    pub snapshot: &'a SchemaSnapshot,
    pub functions: &'a FunctionRegistry,
    pub compiler: &'a dyn SQLCompiler,
    pub registry: &'a OperatorRegistry,
}

impl<'a> Emitter<'a> {
    fn quote(&self, name: &str) -> String {
        self.compiler.quote_identifier(name)
    }

    /// Renders one SELECT statement, including its CTEs and set-operation
    /// tail. `scope` carries whatever bindings are already in effect from an
    /// enclosing query (a correlated subquery, a CTE body); a fresh frame is
    /// pushed and popped around this level's own FROM/JOIN bindings so they
    /// don't leak back out.
    pub fn compile_query(&self, plan: &QueryPlan, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        scope.push();
        let result = self.compile_query_inner(plan, state, scope);
        scope.pop();
        result
    }

    fn compile_query_inner(&self, plan: &QueryPlan, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        let mut sql = String::new();

        if !plan.with.is_empty() {
            let mut rendered = Vec::with_capacity(plan.with.len());
            let mut any_recursive = false;
            for cte in &plan.with {
                if cte.recursive {
                    any_recursive = true;
                    scope.bind(cte.name.clone(), Binding::Table(cte.name.clone()));
                }
                // A recursive CTE's anchor and step are just the first and
                // second SET_OP branches of its own plan; compile_query
                // already renders "<left> UNION ALL <right>" for that shape,
                // so nothing dialect-specific is needed beyond the keyword.
                let body = self.compile_query(&cte.plan, state, scope)?;
                if !cte.recursive {
                    scope.bind(cte.name.clone(), Binding::Table(cte.name.clone()));
                }
                rendered.push(format!("{} AS ({})", self.quote(&cte.name), body));
            }
            sql.push_str(if any_recursive { "WITH RECURSIVE " } else { "WITH " });
            sql.push_str(&rendered.join(", "));
            sql.push(' ');
        }

        let from_sql = self.compile_from(&plan.from, state, scope)?;
        let mut join_sql = String::new();
        for join in &plan.join {
            join_sql.push(' ');
            join_sql.push_str(&self.compile_join(join, scope)?);
        }

        let select_sql = self.compile_select(&plan.select, state, scope, &plan.window)?;
        sql.push_str("SELECT ");
        sql.push_str(&select_sql);
        sql.push_str(" FROM ");
        sql.push_str(&from_sql);
        sql.push_str(&join_sql);

        if let Some(where_pred) = &plan.r#where {
            sql.push_str(" WHERE ");
            sql.push_str(&self.compile_predicate(where_pred, state, scope)?);
        }

        if !plan.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.compile_operand_list(&plan.group_by, state, scope, &plan.window)?);
        }

        if let Some(having) = &plan.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.compile_predicate(having, state, scope)?);
        }

        if !plan.window.is_empty() {
            sql.push_str(" WINDOW ");
            let mut rendered = Vec::with_capacity(plan.window.len());
            for w in &plan.window {
                rendered.push(self.compile_window_def(w, state, scope)?);
            }
            sql.push_str(&rendered.join(", "));
        }

        if let Some(set_op) = &plan.set_op {
            sql.push(' ');
            sql.push_str(match set_op.op {
                SetOpKind::Union => "UNION",
                SetOpKind::UnionAll => "UNION ALL",
                SetOpKind::Intersect => "INTERSECT",
                SetOpKind::Except => "EXCEPT",
            });
            sql.push(' ');
            let mut right_scope = IdentifierScope::new();
            sql.push_str(&self.compile_query(&set_op.right, state, &mut right_scope)?);
        }

        if !plan.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let mut rendered = Vec::with_capacity(plan.order_by.len());
            for item in &plan.order_by {
                rendered.push(self.compile_order_by_item(item, state, scope, &plan.window)?);
            }
            sql.push_str(&rendered.join(", "));
        }

        if let Some(limit) = &plan.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&self.compile_limit_value(limit, state));
        }
        if let Some(offset) = &plan.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&self.compile_limit_value(offset, state));
        }

        Ok(sql)
    }

    fn compile_from(&self, from: &FromClause, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        match from {
            FromClause::Table { table } => {
                scope.bind(table.clone(), Binding::Table(table.clone()));
                Ok(self.quote(table))
            }
            FromClause::Subquery { subquery, alias } => {
                let mut inner = IdentifierScope::new();
                let body = self.compile_query(subquery, state, &mut inner)?;
                scope.bind(alias.clone(), Binding::Table(alias.clone()));
                Ok(format!("({}) AS {}", body, self.quote(alias)))
            }
        }
    }

    fn compile_join(&self, join: &JoinClause, scope: &mut IdentifierScope) -> CompileResult<String> {
        let rel = self.snapshot.relationship(&join.rel).ok_or_else(|| CompilationError::Internal {
            message: format!("relationship '{}' is not declared in the schema", join.rel),
        })?;

        let (anchor, introduced) = if scope.table_in_scope(&rel.source.table) {
            (&rel.source, &rel.target)
        } else {
            (&rel.target, &rel.source)
        };

        let alias = join.alias.clone().unwrap_or_else(|| introduced.table.clone());
        scope.bind(alias.clone(), Binding::Table(introduced.table.clone()));

        let keyword = match join.join_type {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        };

        let table_sql = if alias == introduced.table {
            self.quote(&introduced.table)
        } else {
            format!("{} AS {}", self.quote(&introduced.table), self.quote(&alias))
        };

        let on_sql = format!(
            "{}.{} = {}.{}",
            self.quote(&anchor.table),
            self.quote(&anchor.column),
            self.quote(&alias),
            self.quote(&introduced.column)
        );

        Ok(format!("{} {} ON {}", keyword, table_sql, on_sql))
    }

    fn compile_select(
        &self,
        select: &SelectClause,
        state: &mut CompileState,
        scope: &mut IdentifierScope,
        windows: &[WindowSpec],
    ) -> CompileResult<String> {
        match select {
            SelectClause::Wildcard => Ok("*".to_string()),
            SelectClause::Items(items) => {
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    rendered.push(self.compile_select_item(item, state, scope, windows)?);
                }
                Ok(rendered.join(", "))
            }
        }
    }

    fn compile_select_item(
        &self,
        item: &SelectItem,
        state: &mut CompileState,
        scope: &mut IdentifierScope,
        windows: &[WindowSpec],
    ) -> CompileResult<String> {
        let expr_sql = self.compile_operand(&item.expr, state, scope, windows)?;
        match &item.alias {
            Some(alias) => Ok(format!("{} AS {}", expr_sql, self.quote(alias))),
            None => Ok(expr_sql),
        }
    }

    fn compile_operand_list(
        &self,
        operands: &[Operand],
        state: &mut CompileState,
        scope: &mut IdentifierScope,
        windows: &[WindowSpec],
    ) -> CompileResult<String> {
        let mut rendered = Vec::with_capacity(operands.len());
        for op in operands {
            rendered.push(self.compile_operand(op, state, scope, windows)?);
        }
        Ok(rendered.join(", "))
    }

    fn compile_operand(
        &self,
        operand: &Operand,
        state: &mut CompileState,
        scope: &mut IdentifierScope,
        windows: &[WindowSpec],
    ) -> CompileResult<String> {
        match operand {
            Operand::Col(col) => Ok(self.compile_column_ref(col)),
            Operand::Value(lit) => {
                let name = state.bind_value(literal_to_json(lit));
                Ok(self.compiler.param_placeholder(&name))
            }
            Operand::Param(name) => Ok(self.compiler.param_placeholder(name)),
            Operand::Func { name, args } => {
                let mut build_arg = |a: &Operand| self.compile_operand(a, state, scope, windows);
                let call = self.compiler.build_func_call(name, args, &mut build_arg)?;
                if self.functions.is_window(self.compiler.dialect_name(), name) {
                    let over = match windows.len() {
                        0 => "()".to_string(),
                        1 => self.quote(&windows[0].name),
                        _ => {
                            return Err(CompilationError::Unsupported {
                                target: self.compiler.dialect_name().to_string(),
                                feature: format!("resolving which WINDOW clause '{}' refers to among {} candidates", name, windows.len()),
                            })
                        }
                    };
                    Ok(format!("{} OVER {}", call, over))
                } else {
                    Ok(call)
                }
            }
            Operand::Case { when, r#else } => {
                let mut parts = vec!["CASE".to_string()];
                for clause in when {
                    let cond = self.compile_predicate(&clause.cond, state, scope)?;
                    let then = self.compile_operand(&clause.then, state, scope, windows)?;
                    parts.push(format!("WHEN {} THEN {}", cond, then));
                }
                if let Some(else_expr) = r#else {
                    parts.push(format!("ELSE {}", self.compile_operand(else_expr, state, scope, windows)?));
                }
                parts.push("END".to_string());
                Ok(parts.join(" "))
            }
            _ => Err(CompilationError::Internal {
                message: "encountered an operand variant this compiler doesn't know how to render".to_string(),
            }),
        }
    }

    fn compile_column_ref(&self, col: &ColumnRef) -> String {
        format!("{}.{}", self.quote(&col.table), self.quote(&col.column))
    }

    fn compile_predicate(&self, predicate: &Predicate, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        match predicate {
            Predicate::Cmp { op, left, right } => {
                let left_sql = self.compile_operand(left, state, scope, &[])?;
                let right_sql = self.compile_operand(right, state, scope, &[])?;
                Ok(format!("{} {} {}", left_sql, op.sql_symbol(), right_sql))
            }
            Predicate::IsNull(op) => Ok(format!("{} IS NULL", self.compile_operand(op, state, scope, &[])?)),
            Predicate::IsNotNull(op) => Ok(format!("{} IS NOT NULL", self.compile_operand(op, state, scope, &[])?)),
            Predicate::Like { op, left, right } => {
                let left_sql = self.compile_operand(left, state, scope, &[])?;
                let right_sql = self.compile_operand(right, state, scope, &[])?;
                Ok(format!("{} {} {}", left_sql, self.compiler.like_operator(*op), right_sql))
            }
            Predicate::In { left, rhs, negated } => {
                let left_sql = self.compile_operand(left, state, scope, &[])?;
                let keyword = if *negated { "NOT IN" } else { "IN" };
                match rhs {
                    InRhs::List(items) => {
                        let rendered = self.compile_operand_list(items, state, scope, &[])?;
                        Ok(format!("{} {} ({})", left_sql, keyword, rendered))
                    }
                    InRhs::Subquery(subquery) => {
                        scope.push();
                        let body = self.compile_query_inner(subquery, state, scope);
                        scope.pop();
                        Ok(format!("{} {} ({})", left_sql, keyword, body?))
                    }
                }
            }
            Predicate::Between { expr, low, high } => {
                let expr_sql = self.compile_operand(expr, state, scope, &[])?;
                let low_sql = self.compile_operand(low, state, scope, &[])?;
                let high_sql = self.compile_operand(high, state, scope, &[])?;
                Ok(format!("{} BETWEEN {} AND {}", expr_sql, low_sql, high_sql))
            }
            Predicate::And(list) => self.compile_connective(list, "AND", state, scope),
            Predicate::Or(list) => self.compile_connective(list, "OR", state, scope),
            Predicate::Not(inner) => {
                let rendered = self.compile_predicate_parenthesized(inner, state, scope)?;
                Ok(format!("NOT {}", rendered))
            }
            Predicate::Exists { subquery, negated } => {
                scope.push();
                let body = self.compile_query_inner(subquery, state, scope);
                scope.pop();
                let keyword = if *negated { "NOT EXISTS" } else { "EXISTS" };
                Ok(format!("{} ({})", keyword, body?))
            }
            Predicate::Extension { op, args } => {
                let rendered = args
                    .iter()
                    .map(|a| self.compile_operand(a, state, scope, &[]))
                    .collect::<CompileResult<Vec<_>>>()?;
                self.registry.render(op, &rendered).ok_or_else(|| CompilationError::Unsupported {
                    target: self.compiler.dialect_name().to_string(),
                    feature: format!("operator '{}'", op),
                })
            }
            _ => Err(CompilationError::Internal {
                message: "encountered a predicate variant this compiler doesn't know how to render".to_string(),
            }),
        }
    }

    fn compile_connective(&self, list: &[Predicate], keyword: &str, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        if list.is_empty() {
            return Ok(if keyword == "AND" { "TRUE".to_string() } else { "FALSE".to_string() });
        }
        let mut rendered = Vec::with_capacity(list.len());
        for p in list {
            rendered.push(self.compile_predicate_parenthesized(p, state, scope)?);
        }
        Ok(rendered.join(&format!(" {} ", keyword)))
    }

    fn compile_predicate_parenthesized(&self, predicate: &Predicate, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        let rendered = self.compile_predicate(predicate, state, scope)?;
        Ok(match predicate {
            Predicate::And(_) | Predicate::Or(_) => format!("({})", rendered),
            _ => rendered,
        })
    }

    fn compile_order_by_item(
        &self,
        item: &OrderByItem,
        state: &mut CompileState,
        scope: &mut IdentifierScope,
        windows: &[WindowSpec],
    ) -> CompileResult<String> {
        let expr_sql = self.compile_operand(&item.expr, state, scope, windows)?;
        let dir = match item.dir {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        Ok(format!("{} {}", expr_sql, dir))
    }

    fn compile_limit_value(&self, limit: &planguard_ir::LimitValue, state: &mut CompileState) -> String {
        match limit {
            planguard_ir::LimitValue::Value(n) => {
                let name = state.bind_value(json!(n));
                self.compiler.param_placeholder(&name)
            }
            planguard_ir::LimitValue::Param(name) => self.compiler.param_placeholder(name),
        }
    }

    fn compile_window_def(&self, window: &WindowSpec, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        let body = self.compile_window_body(window, state, scope)?;
        Ok(format!("{} AS ({})", self.quote(&window.name), body))
    }

    fn compile_window_body(&self, window: &WindowSpec, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        let mut parts = Vec::new();
        if !window.partition_by.is_empty() {
            parts.push(format!("PARTITION BY {}", self.compile_operand_list(&window.partition_by, state, scope, &[])?));
        }
        if !window.order_by.is_empty() {
            let mut rendered = Vec::with_capacity(window.order_by.len());
            for item in &window.order_by {
                rendered.push(self.compile_order_by_item(item, state, scope, &[])?);
            }
            parts.push(format!("ORDER BY {}", rendered.join(", ")));
        }
        if let Some(frame) = &window.frame {
            parts.push(self.compile_window_frame(frame, state, scope)?);
        }
        Ok(parts.join(" "))
    }

    fn compile_window_frame(&self, frame: &WindowFrame, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        let units = match frame.units {
            planguard_ir::WindowFrameUnits::Rows => "ROWS",
            planguard_ir::WindowFrameUnits::Range => "RANGE",
        };
        let start = self.compile_frame_bound(&frame.start, state, scope)?;
        match &frame.end {
            Some(end) => {
                let end_sql = self.compile_frame_bound(end, state, scope)?;
                Ok(format!("{} BETWEEN {} AND {}", units, start, end_sql))
            }
            None => Ok(format!("{} {}", units, start)),
        }
    }

    fn compile_frame_bound(&self, bound: &WindowFrameBound, state: &mut CompileState, scope: &mut IdentifierScope) -> CompileResult<String> {
        match bound {
            WindowFrameBound::UnboundedPreceding => Ok("UNBOUNDED PRECEDING".to_string()),
            WindowFrameBound::UnboundedFollowing => Ok("UNBOUNDED FOLLOWING".to_string()),
            WindowFrameBound::CurrentRow => Ok("CURRENT ROW".to_string()),
            WindowFrameBound::Preceding(op) => Ok(format!("{} PRECEDING", self.compile_operand(op, state, scope, &[])?)),
            WindowFrameBound::Following(op) => Ok(format!("{} FOLLOWING", self.compile_operand(op, state, scope, &[])?)),
        }
    }
}

fn literal_to_json(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => json!(b),
        Literal::Integer(i) => json!(i),
        Literal::Float(f) => json!(f),
        Literal::String(s) => json!(s),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planguard_ir::{CteDef, LimitValue};
    use planguard_test_utils::employees_departments_schema;

    use crate::dialects::mysql::MysqlCompiler;
    use crate::dialects::postgres::PostgresCompiler;
    use crate::dialects::sqlite::SqliteCompiler;

    fn col(table: &str, column: &str) -> Operand {
        Operand::Col(ColumnRef::new(table, column))
    }

    fn emitter<'a>(snapshot: &'a SchemaSnapshot, functions: &'a FunctionRegistry, compiler: &'a dyn SQLCompiler, registry: &'a OperatorRegistry) -> Emitter<'a> {
        Emitter { snapshot, functions, compiler, registry }
    }

    #[test]
    fn compiles_a_minimal_select_with_a_bound_literal() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("employees", "name"), alias: None }]),
            from: FromClause::Table { table: "employees".to_string() },
            r#where: Some(Predicate::Cmp { op: CmpOp::Eq, left: col("employees", "id"), right: Operand::Value(Literal::Integer(7)) }),
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();

        assert_eq!(sql, "SELECT \"employees\".\"name\" FROM \"employees\" WHERE \"employees\".\"id\" = %(param_0)s");
        assert_eq!(state.params.get("param_0").unwrap(), &json!(7));
    }

    #[test]
    fn join_resolves_against_whichever_endpoint_is_already_in_scope() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("departments", "name"), alias: None }]),
            from: FromClause::Table { table: "employees".to_string() },
            join: vec![JoinClause { rel: "employees_departments".to_string(), join_type: JoinType::Left, alias: None }],
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();

        assert!(sql.contains("LEFT JOIN \"departments\" ON \"employees\".\"department_id\" = \"departments\".\"id\""));
    }

    #[test]
    fn ilike_downgrades_on_sqlite() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = SqliteCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Wildcard,
            from: FromClause::Table { table: "employees".to_string() },
            r#where: Some(Predicate::Like {
                op: planguard_ir::LikeOp::ILike,
                left: col("employees", "name"),
                right: Operand::Param("q".to_string()),
            }),
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();
        assert!(sql.contains(" LIKE "));
        assert!(sql.contains(":q"));
    }

    #[test]
    fn limit_param_uses_dialect_placeholder() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Wildcard,
            from: FromClause::Table { table: "employees".to_string() },
            limit: Some(LimitValue::Param("page_size".to_string())),
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();
        assert!(sql.ends_with("LIMIT %(page_size)s"));
    }

    #[test]
    fn cte_body_compiles_before_the_main_query_references_it() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let inner = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("employees", "id"), alias: None }]),
            from: FromClause::Table { table: "employees".to_string() },
            ..Default::default()
        };
        let plan = QueryPlan {
            with: vec![CteDef { name: "active".to_string(), plan: Box::new(inner), recursive: false }],
            select: SelectClause::Items(vec![SelectItem { expr: col("active", "id"), alias: None }]),
            from: FromClause::Table { table: "active".to_string() },
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();
        assert!(sql.starts_with("WITH \"active\" AS (SELECT \"employees\".\"id\" FROM \"employees\") SELECT"));
    }

    #[test]
    fn recursive_cte_renders_with_recursive_and_the_union_all_tail() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let step = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("employees", "id"), alias: None }]),
            from: FromClause::Table { table: "chain".to_string() },
            ..Default::default()
        };
        let anchor = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("employees", "id"), alias: None }]),
            from: FromClause::Table { table: "employees".to_string() },
            set_op: Some(planguard_ir::SetOpClause { op: SetOpKind::UnionAll, right: Box::new(step) }),
            ..Default::default()
        };
        let plan = QueryPlan {
            with: vec![CteDef { name: "chain".to_string(), plan: Box::new(anchor), recursive: true }],
            select: SelectClause::Items(vec![SelectItem { expr: col("chain", "id"), alias: None }]),
            from: FromClause::Table { table: "chain".to_string() },
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();
        assert!(sql.starts_with(
            "WITH RECURSIVE \"chain\" AS (SELECT \"employees\".\"id\" FROM \"employees\" UNION ALL SELECT \"employees\".\"id\" FROM \"chain\")"
        ));
    }

    #[test]
    fn window_function_references_the_sole_named_window() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem {
                expr: Operand::Func { name: "ROW_NUMBER".to_string(), args: vec![] },
                alias: Some("rn".to_string()),
            }]),
            from: FromClause::Table { table: "employees".to_string() },
            window: vec![WindowSpec {
                name: "w".to_string(),
                partition_by: vec![col("employees", "department_id")],
                order_by: vec![],
                frame: None,
            }],
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();
        assert!(sql.contains("ROW_NUMBER() OVER \"w\""));
        assert!(sql.contains("WINDOW \"w\" AS (PARTITION BY \"employees\".\"department_id\")"));
    }

    #[test]
    fn ambiguous_window_reference_is_unsupported() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem {
                expr: Operand::Func { name: "RANK".to_string(), args: vec![] },
                alias: None,
            }]),
            from: FromClause::Table { table: "employees".to_string() },
            window: vec![
                WindowSpec { name: "w1".to_string(), partition_by: vec![], order_by: vec![], frame: None },
                WindowSpec { name: "w2".to_string(), partition_by: vec![], order_by: vec![], frame: None },
            ],
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let err = e.compile_query(&plan, &mut state, &mut scope).unwrap_err();
        assert!(matches!(err, CompilationError::Unsupported { .. }));
    }

    #[test]
    fn or_branches_are_parenthesized_inside_an_and() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let pred = Predicate::And(vec![
            Predicate::Cmp { op: CmpOp::Eq, left: col("employees", "id"), right: Operand::Value(Literal::Integer(1)) },
            Predicate::Or(vec![
                Predicate::Cmp { op: CmpOp::Eq, left: col("employees", "department_id"), right: Operand::Value(Literal::Integer(2)) },
                Predicate::IsNull(col("employees", "department_id")),
            ]),
        ]);

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_predicate(&pred, &mut state, &mut scope).unwrap();
        assert!(sql.contains(") AND ("));
    }

    #[test]
    fn mysql_date_part_year_rewrites_through_the_real_emitter() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = MysqlCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem {
                expr: Operand::Func {
                    name: "DATE_PART".to_string(),
                    args: vec![Operand::Value(Literal::String("YEAR".to_string())), col("employees", "hired_at")],
                },
                alias: None,
            }]),
            from: FromClause::Table { table: "employees".to_string() },
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();

        assert_eq!(sql, "SELECT YEAR(`employees`.`hired_at`) FROM `employees`");
        assert!(state.params.is_empty());
    }

    #[test]
    fn mysql_date_part_month_falls_back_to_extract_through_the_real_emitter() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = MysqlCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem {
                expr: Operand::Func {
                    name: "DATE_PART".to_string(),
                    args: vec![Operand::Value(Literal::String("month".to_string())), col("employees", "hired_at")],
                },
                alias: None,
            }]),
            from: FromClause::Table { table: "employees".to_string() },
            ..Default::default()
        };

        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let sql = e.compile_query(&plan, &mut state, &mut scope).unwrap();

        assert_eq!(sql, "SELECT EXTRACT(month FROM `employees`.`hired_at`) FROM `employees`");
    }

    #[test]
    fn unknown_extension_operator_is_unsupported() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();
        let e = emitter(&snapshot, &functions, &compiler, &registry);

        let pred = Predicate::Extension { op: "FULLTEXT_MATCH".to_string(), args: vec![col("employees", "name")] };
        let mut state = CompileState::new();
        let mut scope = IdentifierScope::new();
        let err = e.compile_predicate(&pred, &mut state, &mut scope).unwrap_err();
        assert!(matches!(err, CompilationError::Unsupported { .. }));
    }
}
