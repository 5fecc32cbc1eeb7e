// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Small helpers for asserting on compiled SQL text and JSON error shapes.

/// Collapse runs of whitespace to a single space and trim. Compiler tests
/// compare against this instead of an exact byte-for-byte string so clause
/// emission can insert or drop a space without breaking every assertion.
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn assert_sql_eq(actual: &str, expected: &str) {
    assert_eq!(
        normalize_sql(actual),
        normalize_sql(expected),
        "\n  actual:   {actual}\n  expected: {expected}"
    );
}

/// Assert a `{code, message, details}`-shaped JSON error response carries
/// the expected dotted code.
pub fn assert_error_code(response: &serde_json::Value, expected_code: &str) {
    assert_eq!(
        response.get("code").and_then(|v| v.as_str()),
        Some(expected_code),
        "unexpected error response: {response}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_sql("SELECT  *\nFROM   t"), "SELECT * FROM t");
    }

    #[test]
    fn assert_error_code_matches_code_field() {
        assert_error_code(&json!({"code": "validate.unknown_table"}), "validate.unknown_table");
    }
}
