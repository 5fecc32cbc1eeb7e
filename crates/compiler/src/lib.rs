// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # planguard-compiler
//!
//! Renders a validated, policy-enforced [`QueryPlan`] to parameterized SQL
//! for a target dialect. This crate never re-checks validation or policy
//! invariants — a malformed or unenforced plan reaching [`compile_plan`] is
//! a bug upstream of it.

pub mod dialects;
pub mod emit;
pub mod error;
pub mod factory;
pub mod operator_registry;
pub mod scope;
pub mod sql_compiler;
pub mod state;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use planguard_catalog::SchemaSnapshot;
use planguard_function_registry::FunctionRegistry;
use planguard_ir::QueryPlan;

pub use error::{CompilationError, CompileResult};
pub use factory::CompilerFactory;
pub use operator_registry::OperatorRegistry;
pub use sql_compiler::SQLCompiler;

use emit::Emitter;
use scope::IdentifierScope;
use state::CompileState;

/// The result of a single compile: the rendered SQL text, the
/// compiler-bound parameter values, and the set of logical parameter names
/// the policy engine requires the caller to supply at execution time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSQL {
    pub sql: String,
    pub params: HashMap<String, Value>,
    pub required_params: HashSet<String>,
}

impl CompiledSQL {
    /// Merges compiler-bound parameters with caller-supplied runtime values,
    /// failing if a required parameter is missing or a runtime key collides
    /// with one the compiler already bound.
    pub fn merge_runtime_params(&self, runtime: HashMap<String, Value>) -> CompileResult<HashMap<String, Value>> {
        for name in &self.required_params {
            if !runtime.contains_key(name) {
                return Err(CompilationError::MissingRuntimeParam { name: name.clone() });
            }
        }
        let mut merged = self.params.clone();
        for (name, value) in runtime {
            if merged.contains_key(&name) {
                return Err(CompilationError::RuntimeParamCollision { name });
            }
            merged.insert(name, value);
        }
        Ok(merged)
    }
}

/// Compiles `plan` to SQL for `compiler`'s dialect. `required_params` comes
/// from the policy engine's [`planguard_policy::PolicyOutcome`] and is
/// carried through unchanged so [`CompiledSQL::merge_runtime_params`] can
/// enforce it at execution time.
pub fn compile_plan(
    plan: &QueryPlan,
    snapshot: &SchemaSnapshot,
    functions: &FunctionRegistry,
    compiler: &dyn SQLCompiler,
    registry: &OperatorRegistry,
    required_params: HashSet<String>,
) -> CompileResult<CompiledSQL> {
    let span = tracing::debug_span!("compile_plan", target = compiler.dialect_name());
    let _enter = span.enter();

    let emitter = Emitter { snapshot, functions, compiler, registry };
    let mut state = CompileState::new();
    let mut scope = IdentifierScope::new();
    let sql = emitter.compile_query(plan, &mut state, &mut scope)?;
    tracing::debug!(params = state.params.len(), "compiled plan to SQL");
    Ok(CompiledSQL {
        sql,
        params: state.params,
        required_params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use planguard_ir::{CmpOp, ColumnRef, FromClause, Literal, Operand, Predicate, SelectClause, SelectItem};
    use planguard_test_utils::employees_departments_schema;
    use serde_json::json;

    use crate::dialects::postgres::PostgresCompiler;

    #[test]
    fn compiles_and_merges_a_required_tenant_param() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem {
                expr: Operand::Col(ColumnRef::new("employees", "name")),
                alias: None,
            }]),
            from: FromClause::Table { table: "employees".to_string() },
            r#where: Some(Predicate::Cmp {
                op: CmpOp::Eq,
                left: Operand::Col(ColumnRef::new("employees", "tenant_id")),
                right: Operand::Param("tenant_id".to_string()),
            }),
            ..Default::default()
        };

        let mut required = HashSet::new();
        required.insert("tenant_id".to_string());

        let compiled = compile_plan(&plan, &snapshot, &functions, &compiler, &registry, required).unwrap();
        assert!(compiled.sql.contains("%(tenant_id)s"));

        let err = compiled.merge_runtime_params(HashMap::new()).unwrap_err();
        assert!(matches!(err, CompilationError::MissingRuntimeParam { .. }));

        let mut runtime = HashMap::new();
        runtime.insert("tenant_id".to_string(), json!("acme"));
        let merged = compiled.merge_runtime_params(runtime).unwrap();
        assert_eq!(merged.get("tenant_id").unwrap(), &json!("acme"));
    }

    #[test]
    fn runtime_param_colliding_with_a_compiled_literal_is_rejected() {
        let snapshot = employees_departments_schema();
        let functions = FunctionRegistry::new();
        let compiler = PostgresCompiler;
        let registry = OperatorRegistry::new();

        let plan = QueryPlan {
            select: SelectClause::Wildcard,
            from: FromClause::Table { table: "employees".to_string() },
            r#where: Some(Predicate::Cmp {
                op: CmpOp::Eq,
                left: Operand::Col(ColumnRef::new("employees", "id")),
                right: Operand::Value(Literal::Integer(1)),
            }),
            ..Default::default()
        };

        let compiled = compile_plan(&plan, &snapshot, &functions, &compiler, &registry, HashSet::new()).unwrap();
        let mut runtime = HashMap::new();
        runtime.insert("param_0".to_string(), json!(999));
        let err = compiled.merge_runtime_params(runtime).unwrap_err();
        assert!(matches!(err, CompilationError::RuntimeParamCollision { .. }));
    }
}
