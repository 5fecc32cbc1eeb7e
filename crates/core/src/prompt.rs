// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Pure string templating over an already-built [`SchemaSnapshot`] and
//! [`DialectProfile`], for callers assembling the prompt an LLM planner
//! sees before it emits a `QueryPlan`. This module does not call out to any
//! model, does not cache, and does not interpret `question`/`policy_summary`
//! beyond embedding them verbatim — assembly "beyond pure templating" is
//! the caller's concern, not this crate's.

use planguard_catalog::SchemaSnapshot;
use planguard_ir::{Capability, DialectProfile};

/// The two strings a caller hands its LLM planner: a system prompt
/// describing the schema/dialect it must plan against, and a user prompt
/// carrying the caller's question plus a human-readable policy summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptComponents {
    pub system_prompt: String,
    pub user_prompt: String,
}

pub fn get_prompt_components(
    snapshot: &SchemaSnapshot,
    dialect: &DialectProfile,
    question: &str,
    policy_summary: &str,
) -> PromptComponents {
    PromptComponents {
        system_prompt: render_system_prompt(snapshot, dialect),
        user_prompt: render_user_prompt(question, policy_summary),
    }
}

fn render_system_prompt(snapshot: &SchemaSnapshot, dialect: &DialectProfile) -> String {
    let mut lines = vec![
        format!("You plan SQL queries as QueryPlan JSON for the '{}' dialect.", dialect.target()),
        "Tables:".to_string(),
    ];

    let mut tables: Vec<_> = snapshot.tables().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    for table in tables {
        let mut columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| {
                let nullability = if c.nullable { "nullable" } else { "not null" };
                format!("{} {} ({})", c.name, c.sql_type, nullability)
            })
            .collect();
        columns.sort();
        lines.push(format!("- {}({})", table.name, columns.join(", ")));
    }

    let capabilities = [
        (Capability::Subqueries, "subqueries"),
        (Capability::Ctes, "ctes"),
        (Capability::Aggregations, "aggregations"),
        (Capability::WindowFunctions, "window_functions"),
        (Capability::Joins, "joins"),
        (Capability::SetOperations, "set_operations"),
        (Capability::OffsetWithoutLimit, "offset_without_limit"),
    ];
    let enabled: Vec<&str> = capabilities
        .iter()
        .filter(|(cap, _)| dialect.supports(*cap))
        .map(|(_, label)| *label)
        .collect();
    lines.push(format!("Enabled capabilities: {}", enabled.join(", ")));
    lines.push(format!("Maximum JOIN chain length: {}", dialect.max_join_depth()));

    lines.join("\n")
}

fn render_user_prompt(question: &str, policy_summary: &str) -> String {
    if policy_summary.is_empty() {
        question.to_string()
    } else {
        format!("{}\n\nPolicy constraints in effect: {}", question, policy_summary)
    }
}
