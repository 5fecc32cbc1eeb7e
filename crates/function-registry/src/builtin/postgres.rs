// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! PostgreSQL builtin aggregate/window functions.

use crate::{BuiltinFunction, FunctionKind};

pub fn all_functions() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction::new("COUNT", FunctionKind::Aggregate),
        BuiltinFunction::new("SUM", FunctionKind::Aggregate),
        BuiltinFunction::new("AVG", FunctionKind::Aggregate),
        BuiltinFunction::new("MIN", FunctionKind::Aggregate),
        BuiltinFunction::new("MAX", FunctionKind::Aggregate),
        BuiltinFunction::new("STRING_AGG", FunctionKind::Aggregate),
        BuiltinFunction::new("ARRAY_AGG", FunctionKind::Aggregate),
        BuiltinFunction::new("JSON_AGG", FunctionKind::Aggregate),
        BuiltinFunction::new("JSONB_AGG", FunctionKind::Aggregate),
        BuiltinFunction::new("ROW_NUMBER", FunctionKind::Window),
        BuiltinFunction::new("RANK", FunctionKind::Window),
        BuiltinFunction::new("DENSE_RANK", FunctionKind::Window),
        BuiltinFunction::new("NTILE", FunctionKind::Window),
        BuiltinFunction::new("LAG", FunctionKind::Window),
        BuiltinFunction::new("LEAD", FunctionKind::Window),
        BuiltinFunction::new("FIRST_VALUE", FunctionKind::Window),
        BuiltinFunction::new("LAST_VALUE", FunctionKind::Window),
        BuiltinFunction::new("NTH_VALUE", FunctionKind::Window),
    ]
}
