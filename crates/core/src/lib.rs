// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # planguard-core
//!
//! The facade a caller actually embeds: [`QueryCore::validate_and_compile`]
//! runs parse → validate → policy → compile as one pipeline over an
//! LLM-emitted plan, and [`prompt::get_prompt_components`] assembles the
//! strings that planner sees before it emits one. [`error::QueryCoreError`]
//! unifies every leaf failure behind a single `{code, message, details}`
//! triple for a repair loop to act on.
//!
//! Nothing here is mutated after construction: a [`QueryCore`] bundles the
//! three process-wide registries (dialect compilers, scalar operators,
//! scalar/aggregate/window functions) that every concurrent call shares
//! read-only.

pub mod error;
pub mod prompt;

use std::collections::HashSet;

use planguard_catalog::SchemaSnapshot;
use planguard_compiler::{CompilationError, CompiledSQL, CompilerFactory, OperatorRegistry, SQLCompiler};
use planguard_function_registry::FunctionRegistry;
use planguard_ir::DialectProfile;
use planguard_policy::PolicyConfig;
use planguard_semantic::ValidationContext;

pub use error::{ErrorResponse, QueryCoreError, QueryCoreResult};
pub use prompt::{get_prompt_components, PromptComponents};

/// The build-once, shared-read-only entry point. Construct one per process
/// (or per tenant, if dialects/operators differ by tenant) and reuse it
/// across every request.
pub struct QueryCore {
    compilers: CompilerFactory,
    operators: OperatorRegistry,
    functions: FunctionRegistry,
}

impl QueryCore {
    /// Builds a core with the built-in `postgres`/`sqlite`/`mysql`
    /// compilers, the built-in operator set, and the built-in function
    /// registry. Use [`QueryCore::register_compiler`] to overlay a custom
    /// target before serving traffic.
    pub fn new() -> Self {
        Self {
            compilers: CompilerFactory::with_builtins(),
            operators: OperatorRegistry::new(),
            functions: FunctionRegistry::new(),
        }
    }

    pub fn register_compiler(&mut self, target: impl Into<String>, compiler: std::sync::Arc<dyn SQLCompiler>) {
        self.compilers.register(target, compiler);
    }

    /// Runs the full pipeline: parses `plan_json`, validates it against
    /// `snapshot`/`dialect`, enforces `policy` (column denial, tenant
    /// predicate injection, OR-bypass rejection, LIMIT defaulting), then
    /// compiles the resulting plan to parameterized SQL for `dialect`'s
    /// target. Each stage's failure surfaces as the matching
    /// [`QueryCoreError`] variant.
    pub fn validate_and_compile(
        &self,
        plan_json: &[u8],
        snapshot: &SchemaSnapshot,
        dialect: &DialectProfile,
        policy: &PolicyConfig,
    ) -> QueryCoreResult<CompiledSQL> {
        let span = tracing::debug_span!("validate_and_compile", target = dialect.target());
        let _enter = span.enter();

        let plan = planguard_parser::parse_plan_bytes(plan_json)?;

        let mut ctx = ValidationContext::new(snapshot, dialect, &self.functions);
        planguard_semantic::validate_plan(&mut ctx, &plan)?;

        let outcome = planguard_policy::enforce(plan, snapshot, policy)?;

        let compiler = self.compilers.get(dialect.target()).ok_or_else(|| {
            QueryCoreError::from(CompilationError::UnknownTarget {
                target: dialect.target().to_string(),
            })
        })?;

        let compiled = planguard_compiler::compile_plan(
            &outcome.plan,
            snapshot,
            &self.functions,
            compiler.as_ref(),
            &self.operators,
            outcome.required_params,
        )?;

        tracing::debug!("validate_and_compile succeeded");
        Ok(compiled)
    }

    pub fn get_prompt_components(
        &self,
        snapshot: &SchemaSnapshot,
        dialect: &DialectProfile,
        question: &str,
        policy_summary: &str,
    ) -> PromptComponents {
        prompt::get_prompt_components(snapshot, dialect, question, policy_summary)
    }
}

impl Default for QueryCore {
    fn default() -> Self {
        Self::new()
    }
}

/// A schema/dialect/policy/plan fixture used only by this crate's
/// end-to-end tests; kept separate from `planguard-test-utils`'s fixtures
/// because the scenarios here need a `tenant_id` column the shared schema
/// doesn't carry.
#[cfg(test)]
mod e2e {
    use super::*;
    use planguard_ir::{
        CmpOp, Column, ColumnRef, FromClause, JoinClause, JoinType, Literal, Operand, Predicate,
        QueryPlan, Relationship, RelationshipEndpoint, SelectClause, SelectItem, Table,
    };
    use planguard_policy::{PolicyConfig, TablePolicy};
    use planguard_test_utils::permissive_dialect;
    use serde_json::json;

    fn employees_schema() -> SchemaSnapshot {
        SchemaSnapshot::builder()
            .table(
                Table::new("employees").with_columns(vec![
                    Column::new("employee_id", "INTEGER"),
                    Column::new("tenant_id", "TEXT"),
                    Column::new("first_name", "TEXT"),
                    Column::new("salary", "NUMERIC"),
                ]),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    fn employees_departments_with_tenant() -> SchemaSnapshot {
        SchemaSnapshot::builder()
            .table(
                Table::new("employees").with_columns(vec![
                    Column::new("employee_id", "INTEGER"),
                    Column::new("tenant_id", "TEXT"),
                    Column::new("first_name", "TEXT"),
                    Column::new("department_id", "INTEGER").nullable(true),
                ]),
            )
            .unwrap()
            .table(
                Table::new("departments").with_columns(vec![
                    Column::new("department_id", "INTEGER"),
                    Column::new("tenant_id", "TEXT"),
                    Column::new("name", "TEXT"),
                ]),
            )
            .unwrap()
            .relationship(Relationship::new(
                "departments__employees",
                RelationshipEndpoint::new("employees", "department_id"),
                RelationshipEndpoint::new("departments", "department_id"),
            ))
            .unwrap()
            .build()
            .unwrap()
    }

    fn col(table: &str, column: &str) -> Operand {
        Operand::Col(ColumnRef::new(table, column))
    }

    #[test]
    fn tenant_inject() {
        let snapshot = employees_schema();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new()
            .inject_missing_params(true)
            .default_limit(100)
            .table("employees", TablePolicy::new().require_param("tenant_id", "TENANT"));

        let plan_json = json!({
            "SELECT": [{"expr": {"col": "employees.first_name"}}],
            "FROM": {"table": "employees"},
        })
        .to_string();

        let core = QueryCore::new();
        let compiled = core
            .validate_and_compile(plan_json.as_bytes(), &snapshot, &dialect, &policy)
            .unwrap();

        assert_eq!(
            compiled.sql,
            r#"SELECT "employees"."first_name" FROM "employees" WHERE "employees"."tenant_id" = %(TENANT)s LIMIT %(param_0)s"#
        );
        assert_eq!(compiled.params.get("param_0"), Some(&json!(100)));
        assert!(compiled.required_params.contains("TENANT"));
    }

    #[test]
    fn deny_list() {
        let snapshot = employees_schema();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new().table("employees", TablePolicy::new().deny_column("salary"));

        let plan = QueryPlan {
            select: SelectClause::Items(vec![
                SelectItem { expr: col("employees", "first_name"), alias: None },
                SelectItem { expr: col("employees", "salary"), alias: None },
            ]),
            from: FromClause::Table { table: "employees".to_string() },
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let err = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap_err();
        let response = err.to_error_response();
        assert_eq!(response.code, "policy.column_denied");
        assert_eq!(response.details["table"], "employees");
        assert_eq!(response.details["column"], "salary");
    }

    #[test]
    fn join_via_relationship_injects_tenant_on_both_tables() {
        let snapshot = employees_departments_with_tenant();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new()
            .inject_missing_params(true)
            .table("employees", TablePolicy::new().require_param("tenant_id", "TENANT"))
            .table("departments", TablePolicy::new().require_param("tenant_id", "TENANT"));

        let plan = QueryPlan {
            select: SelectClause::Items(vec![
                SelectItem { expr: col("employees", "first_name"), alias: None },
                SelectItem { expr: col("departments", "name"), alias: None },
            ]),
            from: FromClause::Table { table: "employees".to_string() },
            join: vec![JoinClause {
                rel: "departments__employees".to_string(),
                join_type: JoinType::Left,
                alias: None,
            }],
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let compiled = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap();

        assert!(compiled.sql.contains(
            r#"FROM "employees" LEFT JOIN "departments" ON "employees"."department_id" = "departments"."department_id""#
        ));
        assert!(compiled.sql.contains(r#""employees"."tenant_id" = %(TENANT)s"#));
        assert!(compiled.sql.contains(r#""departments"."tenant_id" = %(TENANT)s"#));
    }

    #[test]
    fn or_bypass_is_rejected() {
        let snapshot = employees_schema();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new()
            .inject_missing_params(true)
            .table("employees", TablePolicy::new().require_param("tenant_id", "TENANT"));

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("employees", "first_name"), alias: None }]),
            from: FromClause::Table { table: "employees".to_string() },
            r#where: Some(Predicate::Or(vec![
                Predicate::Cmp { op: CmpOp::Eq, left: col("employees", "tenant_id"), right: Operand::Param("TENANT".to_string()) },
                Predicate::Cmp { op: CmpOp::Eq, left: col("employees", "employee_id"), right: Operand::Value(Literal::Integer(1)) },
            ])),
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let err = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap_err();
        assert_eq!(err.code(), "policy.or_bypass");
    }

    #[test]
    fn unknown_relationship_fails_validation() {
        let snapshot = employees_departments_with_tenant();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new();

        let plan = QueryPlan {
            select: SelectClause::Wildcard,
            from: FromClause::Table { table: "employees".to_string() },
            join: vec![JoinClause { rel: "ghost".to_string(), join_type: JoinType::Inner, alias: None }],
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let err = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap_err();
        let response = err.to_error_response();
        assert_eq!(response.code, "validate.unknown_relationship");
        assert_eq!(response.details["key"], "ghost");
    }

    #[test]
    fn dialect_ctes_without_subqueries_fails_to_build() {
        let err = DialectProfile::builder("postgres").ctes().build().unwrap_err();
        assert_eq!(err, planguard_ir::ProfileConfigError::MissingDependency { capability: "ctes", requires: "subqueries" });
    }

    #[test]
    fn limit_absent_and_no_default_emits_no_limit_clause() {
        let snapshot = employees_schema();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new();

        let plan = QueryPlan {
            select: SelectClause::Items(vec![SelectItem { expr: col("employees", "first_name"), alias: None }]),
            from: FromClause::Table { table: "employees".to_string() },
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let compiled = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap();
        assert!(!compiled.sql.contains("LIMIT"));
    }

    #[test]
    fn join_chain_over_max_depth_fails_validation() {
        let snapshot = employees_departments_with_tenant();
        let dialect = DialectProfile::builder("postgres")
            .joins()
            .max_join_depth(1)
            .build()
            .unwrap();
        let policy = PolicyConfig::new();

        let plan = QueryPlan {
            select: SelectClause::Wildcard,
            from: FromClause::Table { table: "employees".to_string() },
            join: vec![
                JoinClause { rel: "departments__employees".to_string(), join_type: JoinType::Inner, alias: None },
                JoinClause { rel: "departments__employees".to_string(), join_type: JoinType::Inner, alias: None },
            ],
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let err = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap_err();
        assert_eq!(err.code(), "validate.join_depth_exceeded");
    }

    #[test]
    fn having_without_group_by_fails_validation() {
        let snapshot = employees_schema();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new();

        let plan = QueryPlan {
            select: SelectClause::Wildcard,
            from: FromClause::Table { table: "employees".to_string() },
            having: Some(Predicate::Cmp {
                op: CmpOp::Eq,
                left: col("employees", "employee_id"),
                right: Operand::Value(Literal::Integer(1)),
            }),
            ..Default::default()
        };
        let plan_json = serde_json::to_vec(&plan).unwrap();

        let core = QueryCore::new();
        let err = core
            .validate_and_compile(&plan_json, &snapshot, &dialect, &policy)
            .unwrap_err();
        assert_eq!(err.code(), "validate.having_without_group_by");
    }

    #[test]
    fn compiling_the_same_plan_twice_is_byte_identical() {
        let snapshot = employees_schema();
        let dialect = permissive_dialect("postgres");
        let policy = PolicyConfig::new()
            .inject_missing_params(true)
            .table("employees", TablePolicy::new().require_param("tenant_id", "TENANT"));

        let plan_json = json!({
            "SELECT": [{"expr": {"col": "employees.first_name"}}],
            "FROM": {"table": "employees"},
        })
        .to_string();

        let core = QueryCore::new();
        let first = core
            .validate_and_compile(plan_json.as_bytes(), &snapshot, &dialect, &policy)
            .unwrap();
        let second = core
            .validate_and_compile(plan_json.as_bytes(), &snapshot, &dialect, &policy)
            .unwrap();
        assert_eq!(first, second);
    }
}
